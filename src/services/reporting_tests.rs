//! Unit tests for the reporting module - decision report rendering.

#[cfg(test)]
mod reporting_tests {
    use crate::analysis::parse_analysis;
    use crate::analysis::AnalysisResult;
    use crate::services::chat::{ChatMessage, ChatRole};
    use crate::services::reporting::*;
    use crate::test_support::{analysis_json, sample_analysis_json};
    use chrono::{Local, TimeZone};

    fn sample() -> AnalysisResult {
        parse_analysis(Some(&sample_analysis_json("EUR/USD"))).unwrap()
    }

    fn message(role: ChatRole, content: &str, timestamp: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    // ============= Layout Tests =============

    #[test]
    fn test_report_full_layout() {
        let messages = vec![
            message(ChatRole::User, "Is support holding?", "10:15:00"),
            message(ChatRole::Assistant, "Yes, twice rejected.", "10:15:04"),
        ];

        let report = render_report("QuantVision", &sample(), &messages);

        let expected = "\
QUANTVISION NAKED FOREX DECISION REPORT
---------------------------------------
Asset: EUR/USD (4h)
Current Price: $1.2345

INVESTMENT VERDICT: PROCEED
Risk Score: 4/10
Trend: Bullish
Expected Outcome: Reversal at major zone
Sentiment: Cautiously optimistic

TECHNICAL ZONES:
- Resistance: 1.2500 - 1.2550
- Support: 1.2000 - 1.2050
- Patterns: Kangaroo Tail, Last Kiss

TRADING PLAN:
- Position: LONG
- Stop Loss: 1.2000
- Take Profit: 1.2540
- Recommendation: Enter on a break of the tail high.

SUMMARY:
Price rejected the support zone with a kangaroo tail.

CONVERSATION LOG:
[10:15:00] USER: Is support holding?
[10:15:04] ASSISTANT: Yes, twice rejected.
---------------------------------------
CONFIDENTIAL ANALYSIS DOCUMENT
";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_report_is_deterministic() {
        let result = sample();
        let messages = vec![message(ChatRole::User, "q", "09:00:00")];
        assert_eq!(
            render_report("QuantVision", &result, &messages),
            render_report("QuantVision", &result, &messages)
        );
    }

    #[test]
    fn test_report_without_chat_has_empty_log() {
        let report = render_report("QuantVision", &sample(), &[]);
        assert!(report.contains("CONVERSATION LOG:\n---------------------------------------\n"));
        assert!(report.ends_with("CONFIDENTIAL ANALYSIS DOCUMENT\n"));
    }

    #[test]
    fn test_report_fields_are_verbatim() {
        let result = parse_analysis(Some(&analysis_json("XAU/USD", "around 2,400 USD", "n/a"))).unwrap();
        let report = render_report("QuantVision", &result, &[]);

        assert!(report.contains("Current Price: around 2,400 USD\n"));
        assert!(report.contains("- Stop Loss: n/a\n"));
        // Unparseable stop falls back to the model's position
        assert!(report.contains("- Position: N/A\n"));
    }

    #[test]
    fn test_report_keeps_message_order() {
        let messages = vec![
            message(ChatRole::User, "first", "10:00:00"),
            message(ChatRole::Assistant, "second", "10:00:01"),
            message(ChatRole::User, "third", "10:00:02"),
        ];
        let report = render_report("QuantVision", &sample(), &messages);

        let first = report.find("USER: first").unwrap();
        let second = report.find("ASSISTANT: second").unwrap();
        let third = report.find("USER: third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_dated_report_adds_date_line() {
        let at = Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 5).unwrap();
        let report = render_dated_report("QuantVision", &sample(), &[], at);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "QUANTVISION NAKED FOREX DECISION REPORT");
        assert_eq!(lines[2], "Date: 2026-03-14 09:30:05");
        assert_eq!(lines[3], "Asset: EUR/USD (4h)");
    }

    #[test]
    fn test_custom_app_name_in_header() {
        let report = render_report("ChartDesk", &sample(), &[]);
        assert!(report.starts_with("CHARTDESK NAKED FOREX DECISION REPORT\n"));
    }

    // ============= Filename Tests =============

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("QuantVision", "EURUSD"), "QuantVision_EURUSD_Report.txt");
    }

    #[test]
    fn test_report_filename_sanitizes_separators() {
        assert_eq!(
            report_filename("QuantVision", "BTC/USDT"),
            "QuantVision_BTC_USDT_Report.txt"
        );
        assert_eq!(
            report_filename("QuantVision", "a\\b\"c"),
            "QuantVision_a_b_c_Report.txt"
        );
    }

    #[test]
    fn test_report_filename_replaces_control_characters() {
        assert_eq!(
            report_filename("QuantVision", "EUR\nUSD"),
            "QuantVision_EUR_USD_Report.txt"
        );
        assert_eq!(
            report_filename("QuantVision", "BTC\r\n\tUSDT\u{7f}"),
            "QuantVision_BTC___USDT__Report.txt"
        );
    }

    #[test]
    fn test_report_filename_is_valid_header_value() {
        let filename = report_filename("QuantVision", "EUR\r\nSet-Cookie: x\u{0}");
        let disposition = format!("attachment; filename=\"{}\"", filename);
        assert!(axum::http::HeaderValue::try_from(disposition).is_ok());
    }
}
