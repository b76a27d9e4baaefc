use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionType {
    #[serde(rename = "LONG")]
    Long,
    #[serde(rename = "SHORT")]
    Short,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl PositionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionType::Long => "LONG",
            PositionType::Short => "SHORT",
            PositionType::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Neutral => "Neutral",
            Trend::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// The model's top-level recommendation gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Proceed,
    Abstain,
    Wait,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Proceed => "PROCEED",
            Verdict::Abstain => "ABSTAIN",
            Verdict::Wait => "WAIT",
        };
        f.write_str(s)
    }
}

/// Support/resistance zones. Ranges, not single lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zones {
    pub resistance_zone: String,
    pub support_zone: String,
}

/// Structured analysis as returned by the external model.
///
/// Every field is required; deserialization fails on a missing or null
/// field, which is how the response schema is enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub asset_name: String,
    pub timeframe: String,
    pub current_price: String,
    pub position_type: PositionType,
    pub trend: Trend,
    pub sentiment: String,
    pub zones: Zones,
    /// Ordered as emitted by the model
    pub naked_forex_patterns: Vec<String>,
    pub expected_outcome: String,
    pub investment_verdict: Verdict,
    /// Intended range 1-10, not enforced
    pub risk_score: f64,
    pub summary: String,
    pub trading_recommendation: String,
    pub stop_loss: String,
    pub take_profit: String,
}

impl AnalysisResult {
    /// One-line digest handed to the chat orchestrator
    pub fn context_digest(&self) -> String {
        format!(
            "Asset: {}, Verdict: {}",
            self.asset_name, self.investment_verdict
        )
    }
}

/// Chart timeframes offered for pair analysis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    Daily,
    Weekly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::Daily,
        Timeframe::Weekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == trimmed)
            .ok_or_else(|| format!("unknown timeframe: {}", s))
    }
}
