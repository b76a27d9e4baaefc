use crate::agents::Agent;
use crate::analysis::Timeframe;
use crate::constants::chat::DEFAULT_CONTEXT;

const SEARCH_ADDENDUM: &str = "Use Google Search to find real-time data for the requested pair.";

const CHAT_ADDENDUM: &str = "Continue the conversation with the user as their professional analyst. Be critical and objective. If no image is provided, rely on search grounding for current market data.";

pub struct NakedForexAnalyst;

impl Agent for NakedForexAnalyst {
    fn name(&self) -> &str {
        "NakedForex-Analyst"
    }

    fn system_prompt(&self) -> &str {
        r#"You are a Senior Quantitative Analyst specializing in "Naked Forex" methodology.
Your approach is strictly focused on:
1. Support and Resistance ZONES (not single lines).
2. Pure Price Action and Candlestick Analysis (Big Shadows, Kangaroo Tails, Last Kiss, Trend Belts).
3. Trend assessment without lagging indicators.

RULES:
- Be extremely strict and professional.
- Do not provide financial advice, but offer a definitive "PROCEED", "ABSTAIN", or "WAIT" recommendation based on the technical setup.
- Identify the Expected Outcome (e.g., "Reversal at major zone" or "Trend continuation").
- Determine the Position Type: "LONG" if buying, "SHORT" if selling, or "N/A" if abstaining.
- Use available data to identify structures.
- Always define a clear Stop Loss and Take Profit level.
- Provide a Risk Score from 1 (Safe) to 10 (Extremely Risky)."#
    }
}

impl NakedForexAnalyst {
    pub fn image_prompt(&self) -> &'static str {
        "Analyze this chart using Naked Forex principles. Provide the analysis in JSON format."
    }

    /// The pair text goes in verbatim
    pub fn pair_prompt(&self, pair: &str, timeframe: Timeframe) -> String {
        format!(
            "Search for the current price and recent price action (last 30-100 candles) of the trading pair {} on the {} timeframe. Perform a detailed Naked Forex analysis based on the found data. Return the findings in JSON format.",
            pair, timeframe
        )
    }

    pub fn search_system_prompt(&self) -> String {
        self.system_prompt_with(SEARCH_ADDENDUM)
    }

    pub fn chat_system_prompt(&self) -> String {
        self.system_prompt_with(CHAT_ADDENDUM)
    }

    /// Chat turn prompt: context digest, serialized history, then the new message
    pub fn chat_prompt(&self, context: Option<&str>, history: &str, user_message: &str) -> String {
        format!(
            "Context: {}\n\nConversation history:\n{}\n\nUser: {}\nAssistant:",
            context.unwrap_or(DEFAULT_CONTEXT),
            history,
            user_message
        )
    }
}
