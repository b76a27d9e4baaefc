//! Display-side heuristics layered on top of untrusted model output.
//!
//! The position shown to the user is derived from the price fields whenever
//! both of them can be read as positive numbers; the model's own
//! `positionType` is only a fallback.

use serde::{Deserialize, Serialize};

use super::types::{AnalysisResult, PositionType};

/// Best-effort price parse for strings like `"$1.2345"` or `"0.02603 USDT"`.
///
/// Every character that is not an ASCII digit or `.` is dropped, then the
/// longest leading decimal literal is read. Returns `None` unless the value
/// is strictly positive.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (idx, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        } else {
            seen_digit = true;
        }
        end = idx + 1;
    }

    if !seen_digit {
        return None;
    }

    cleaned[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| *value > 0.0)
}

/// Position implied by the stop loss relative to the current price.
///
/// `LONG` when the stop sits below the price, `SHORT` otherwise. Falls back
/// to `provided` when either field does not parse as a positive number.
pub fn derive_position(current_price: &str, stop_loss: &str, provided: PositionType) -> PositionType {
    match (parse_price(current_price), parse_price(stop_loss)) {
        (Some(entry), Some(stop)) => {
            if stop < entry {
                PositionType::Long
            } else {
                PositionType::Short
            }
        }
        _ => provided,
    }
}

/// Derived position for a full analysis result
pub fn derived_position(result: &AnalysisResult) -> PositionType {
    derive_position(&result.current_price, &result.stop_loss, result.position_type)
}

/// Coarse classification of the 1-10 risk score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            RiskBand::Low
        } else if score <= 7.0 {
            RiskBand::Moderate
        } else {
            // NaN lands here too
            RiskBand::High
        }
    }
}
