//! Unit tests for price parsing and the derived position heuristic.

#[cfg(test)]
mod position_tests {
    use crate::analysis::position::*;
    use crate::analysis::PositionType;

    // ============= parse_price Tests =============

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("1.2000"), Some(1.2));
        assert_eq!(parse_price("50000"), Some(50000.0));
    }

    #[test]
    fn test_parse_price_strips_symbols() {
        assert_eq!(parse_price("$1.2345"), Some(1.2345));
        assert_eq!(parse_price("0.02603 USDT"), Some(0.02603));
        assert_eq!(parse_price("1,234.50"), Some(1234.5));
    }

    #[test]
    fn test_parse_price_uses_leading_literal() {
        // "1.2.3" reads as 1.2
        assert_eq!(parse_price("1.2.3"), Some(1.2));
        assert_eq!(parse_price(".5"), Some(0.5));
    }

    #[test]
    fn test_parse_price_failures() {
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("."), None);
        assert_eq!(parse_price("..5"), None);
    }

    #[test]
    fn test_parse_price_rejects_zero() {
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("$0.00"), None);
    }

    #[test]
    fn test_parse_price_drops_sign() {
        // The minus sign is stripped with the other symbols
        assert_eq!(parse_price("-5"), Some(5.0));
    }

    // ============= derive_position Tests =============

    #[test]
    fn test_derive_long_when_stop_below_price() {
        let pos = derive_position("$1.2345", "1.2000", PositionType::Short);
        assert_eq!(pos, PositionType::Long);
    }

    #[test]
    fn test_derive_short_when_stop_above_price() {
        let pos = derive_position("1.2000", "1.2500", PositionType::Long);
        assert_eq!(pos, PositionType::Short);
    }

    #[test]
    fn test_derive_short_when_stop_equals_price() {
        let pos = derive_position("100", "100.00", PositionType::Long);
        assert_eq!(pos, PositionType::Short);
    }

    #[test]
    fn test_derive_falls_back_when_price_unparseable() {
        let pos = derive_position("n/a", "1.20", PositionType::NotApplicable);
        assert_eq!(pos, PositionType::NotApplicable);

        let pos = derive_position("n/a", "1.20", PositionType::Short);
        assert_eq!(pos, PositionType::Short);
    }

    #[test]
    fn test_derive_falls_back_when_stop_unparseable() {
        let pos = derive_position("1.2345", "none", PositionType::Long);
        assert_eq!(pos, PositionType::Long);
    }

    #[test]
    fn test_derive_falls_back_when_stop_zero() {
        let pos = derive_position("1.2345", "0", PositionType::Short);
        assert_eq!(pos, PositionType::Short);
    }

    #[test]
    fn test_parsed_values_override_model() {
        // Model says SHORT, the numbers say LONG: the numbers win
        let pos = derive_position("42,000", "41,500", PositionType::Short);
        assert_eq!(pos, PositionType::Long);
    }

    // ============= RiskBand Tests =============

    #[test]
    fn test_risk_band_boundaries() {
        assert_eq!(RiskBand::from_score(1.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(3.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(3.5), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(7.0), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(8.0), RiskBand::High);
        assert_eq!(RiskBand::from_score(f64::NAN), RiskBand::High);
    }
}
