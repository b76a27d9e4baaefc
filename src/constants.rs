//! Application-wide constants
//!
//! Centralizes the fixed texts and limits shared by the session, the model
//! backends and the report exporter.

/// Branding and report constants
pub mod app {
    /// Default application name, used in report headers and file names
    pub const DEFAULT_APP_NAME: &str = "QuantVision";

    /// Horizontal rule used by the exported report
    pub const REPORT_RULE: &str = "---------------------------------------";

    /// Fixed last line of every exported report
    pub const REPORT_FOOTER: &str = "CONFIDENTIAL ANALYSIS DOCUMENT";
}

/// Input capture constants
pub mod capture {
    /// Every accepted capture must declare a MIME type with this prefix
    pub const IMAGE_MIME_PREFIX: &str = "image/";

    /// Default upload cap for the HTTP surface (20 MiB)
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

    /// Capacity of the clipboard paste broadcast channel
    pub const PASTE_BUS_CAPACITY: usize = 16;
}

/// Chat constants
pub mod chat {
    /// Digest used when no analysis exists yet
    pub const DEFAULT_CONTEXT: &str = "Current chart analysis session";

    /// Reply recorded when the model answers with an empty body
    pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't analyze that request.";

    /// Wall-clock format for chat message timestamps
    pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";
}

/// Model backend constants
pub mod llm {
    pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Schema name sent with OpenAI structured-output requests
    pub const SCHEMA_NAME: &str = "analysis_result";
}

/// Logging event names for structured logging
pub mod events {
    pub const IMAGE_CAPTURED: &str = "image_captured";
    pub const CAPTURE_REJECTED: &str = "capture_rejected";
    pub const ANALYSIS_STARTED: &str = "analysis_started";
    pub const ANALYSIS_COMPLETED: &str = "analysis_completed";
    pub const ANALYSIS_FAILED: &str = "analysis_failed";
    pub const CHAT_TURN_COMPLETED: &str = "chat_turn_completed";
    pub const CHAT_TURN_FAILED: &str = "chat_turn_failed";
    pub const STALE_RESPONSE_DISCARDED: &str = "stale_response_discarded";
    pub const SESSION_RESET: &str = "session_reset";
}
