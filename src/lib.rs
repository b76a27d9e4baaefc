//! QuantVision - chart and trading-pair analysis sessions
//!
//! This library provides the session orchestration around a hosted
//! generative model: input capture, schema-validated analysis requests,
//! follow-up chat and report export.

pub mod agents;
pub mod analysis;
pub mod api;
pub mod bus;
pub mod capture;
pub mod config;
pub mod constants;
pub mod error;
pub mod llm;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use analysis::{AnalysisResult, PositionType, Timeframe, Trend, Verdict, Zones};
pub use bus::{PasteBus, PasteEvent};
pub use capture::{CaptureSource, ImagePayload, InputMode};
pub use config::AppConfig;
pub use error::SessionError;
pub use services::chat::{ChatMessage, ChatRole};
pub use session::{AnalysisOutcome, ChatOutcome, Session, SessionPhase, SessionSnapshot};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod config_tests;
