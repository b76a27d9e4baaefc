//! Plain-text decision report export.
//!
//! Rendering is pure: same analysis and transcript in, same bytes out. Saving
//! the document is the caller's concern.

use chrono::{DateTime, Local};

use crate::analysis::{derived_position, AnalysisResult};
use crate::constants::app::{REPORT_FOOTER, REPORT_RULE};
use crate::services::chat::ChatMessage;

/// Report for `result` and the transcript `messages`, without a date line
pub fn render_report(app_name: &str, result: &AnalysisResult, messages: &[ChatMessage]) -> String {
    render(app_name, result, messages, None)
}

/// Same as [`render_report`] with a `Date:` line after the header
pub fn render_dated_report(
    app_name: &str,
    result: &AnalysisResult,
    messages: &[ChatMessage],
    generated_at: DateTime<Local>,
) -> String {
    let date = generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
    render(app_name, result, messages, Some(&date))
}

/// `<AppName>_<assetName>_Report.txt`, with path separators, quotes and
/// control characters made safe.
///
/// The asset name comes from the model and ends up in a `Content-Disposition`
/// header, which cannot carry control characters.
pub fn report_filename(app_name: &str, asset_name: &str) -> String {
    let safe_asset: String = asset_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' => '_',
            c if c.is_control() => '_',
            other => other,
        })
        .collect();
    format!("{}_{}_Report.txt", app_name, safe_asset)
}

fn render(app_name: &str, result: &AnalysisResult, messages: &[ChatMessage], date: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("{} NAKED FOREX DECISION REPORT", app_name.to_uppercase()));
    lines.push(REPORT_RULE.to_string());
    if let Some(date) = date {
        lines.push(format!("Date: {}", date));
    }
    lines.push(format!("Asset: {} ({})", result.asset_name, result.timeframe));
    lines.push(format!("Current Price: {}", result.current_price));
    lines.push(String::new());

    lines.push(format!("INVESTMENT VERDICT: {}", result.investment_verdict));
    lines.push(format!("Risk Score: {}/10", result.risk_score));
    lines.push(format!("Trend: {}", result.trend));
    lines.push(format!("Expected Outcome: {}", result.expected_outcome));
    lines.push(format!("Sentiment: {}", result.sentiment));
    lines.push(String::new());

    lines.push("TECHNICAL ZONES:".to_string());
    lines.push(format!("- Resistance: {}", result.zones.resistance_zone));
    lines.push(format!("- Support: {}", result.zones.support_zone));
    lines.push(format!("- Patterns: {}", result.naked_forex_patterns.join(", ")));
    lines.push(String::new());

    lines.push("TRADING PLAN:".to_string());
    lines.push(format!("- Position: {}", derived_position(result)));
    lines.push(format!("- Stop Loss: {}", result.stop_loss));
    lines.push(format!("- Take Profit: {}", result.take_profit));
    lines.push(format!("- Recommendation: {}", result.trading_recommendation));
    lines.push(String::new());

    lines.push("SUMMARY:".to_string());
    lines.push(result.summary.clone());
    lines.push(String::new());

    lines.push("CONVERSATION LOG:".to_string());
    for message in messages {
        lines.push(format!(
            "[{}] {}: {}",
            message.timestamp,
            message.role.as_str().to_uppercase(),
            message.content
        ));
    }
    lines.push(REPORT_RULE.to_string());
    lines.push(REPORT_FOOTER.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
