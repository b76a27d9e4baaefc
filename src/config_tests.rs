//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use crate::analysis::Timeframe;
    use crate::config::*;
    use crate::error::ConfigError;
    use std::io::Write;

    // ============= Defaults Tests =============

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.app_name, "QuantVision");
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.model, "gemini-3-flash-preview");
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.session.default_timeframe, Timeframe::Daily);
        assert_eq!(config.session.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.app_name, "QuantVision");
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
    }

    // ============= Parsing Tests =============

    #[test]
    fn test_full_config_deserialize() {
        let yaml = r#"
app_name: "ChartDesk"
server:
  bind_addr: "0.0.0.0:8080"
llm:
  provider: openai
  api_key: "sk-test"
  base_url: "http://localhost:11434/v1"
  model: "gpt-4o-mini"
  timeout_secs: 30
session:
  default_timeframe: "4h"
  max_upload_bytes: 1048576
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.app_name, "ChartDesk");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.session.default_timeframe, Timeframe::FourHours);
        assert_eq!(config.session.max_upload_bytes, 1_048_576);
    }

    #[test]
    fn test_partial_llm_section_keeps_defaults() {
        // Missing optional fields should use defaults
        let yaml = r#"
llm:
  api_key: "abc"
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.model, "gemini-3-flash-preview");
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn test_strips_bom() {
        let yaml = "\u{feff}app_name: \"Bommed\"\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.app_name, "Bommed");
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let yaml = "llm:\n  provider: anthropic\n";
        assert!(matches!(AppConfig::from_yaml_str(yaml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_timeframe_is_parse_error() {
        let yaml = "session:\n  default_timeframe: \"2h\"\n";
        assert!(matches!(AppConfig::from_yaml_str(yaml), Err(ConfigError::Parse(_))));
    }

    // ============= Validation Tests =============

    #[test]
    fn test_rejects_blank_app_name() {
        let err = AppConfig::from_yaml_str("app_name: \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("app_name")));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = AppConfig::from_yaml_str("llm:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("timeout_secs")));
    }

    #[test]
    fn test_rejects_zero_upload_cap() {
        let err = AppConfig::from_yaml_str("session:\n  max_upload_bytes: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_blank_model() {
        let err = AppConfig::from_yaml_str("llm:\n  model: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("llm.model")));
    }

    // ============= File loading Tests =============

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("quantvision-config-{}.yaml", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "app_name: \"FromFile\"").unwrap();
        }

        let config = AppConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.app_name, "FromFile");
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("quantvision-missing-{}.yaml", uuid::Uuid::new_v4()));
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Io(_))));
    }

    // ============= API key Tests =============

    #[test]
    fn test_explicit_api_key_wins() {
        let llm = LlmConfig {
            api_key: Some("  from-config  ".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let llm = LlmConfig {
            api_key: Some("super-secret".to_string()),
            ..LlmConfig::default()
        };
        let printed = format!("{:?}", llm);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(LlmProvider::Gemini.as_str(), "gemini");
        assert_eq!(LlmProvider::OpenAi.as_str(), "openai");
        let provider: LlmProvider = serde_yaml::from_str("openai").unwrap();
        assert_eq!(provider, LlmProvider::OpenAi);
    }
}
