pub mod position;
pub mod schema;
pub mod types;

pub use position::{derive_position, derived_position, parse_price, RiskBand};
pub use types::{AnalysisResult, PositionType, Timeframe, Trend, Verdict, Zones};

use crate::error::SessionError;

/// Validate a raw model reply against the analysis schema.
///
/// `None` or a blank reply is `AnalysisUnavailable`; anything that does not
/// deserialize into [`AnalysisResult`] is `MalformedResponse`.
pub fn parse_analysis(reply: Option<&str>) -> Result<AnalysisResult, SessionError> {
    let text = match reply.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(SessionError::AnalysisUnavailable),
    };

    // Try to extract JSON
    let json_str = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    serde_json::from_str::<AnalysisResult>(json_str)
        .map_err(|e| SessionError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod position_tests;
