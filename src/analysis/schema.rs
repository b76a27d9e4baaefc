use serde_json::{json, Map, Value};

/// JSON Schema of [`AnalysisResult`](super::AnalysisResult) as sent to the model.
///
/// Written in standard (lower-case) JSON Schema with closed objects, which is
/// what OpenAI strict structured output requires. Gemini gets a converted
/// copy, see [`to_gemini_schema`].
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "assetName": { "type": "string" },
            "timeframe": { "type": "string" },
            "currentPrice": { "type": "string" },
            "positionType": { "type": "string", "enum": ["LONG", "SHORT", "N/A"] },
            "trend": { "type": "string", "enum": ["Bullish", "Bearish", "Neutral", "Unknown"] },
            "sentiment": { "type": "string" },
            "zones": {
                "type": "object",
                "properties": {
                    "resistanceZone": { "type": "string" },
                    "supportZone": { "type": "string" }
                },
                "required": ["resistanceZone", "supportZone"],
                "additionalProperties": false
            },
            "nakedForexPatterns": { "type": "array", "items": { "type": "string" } },
            "expectedOutcome": { "type": "string" },
            "investmentVerdict": { "type": "string", "enum": ["PROCEED", "ABSTAIN", "WAIT"] },
            "riskScore": { "type": "number" },
            "summary": { "type": "string" },
            "tradingRecommendation": { "type": "string" },
            "stopLoss": { "type": "string" },
            "takeProfit": { "type": "string" }
        },
        "required": [
            "assetName", "timeframe", "currentPrice", "positionType", "trend",
            "sentiment", "zones", "nakedForexPatterns", "expectedOutcome",
            "investmentVerdict", "riskScore", "summary", "tradingRecommendation",
            "stopLoss", "takeProfit"
        ],
        "additionalProperties": false
    })
}

/// Rewrite a JSON Schema into Gemini's `responseSchema` dialect.
///
/// Gemini expects upper-case type names (`OBJECT`, `STRING`, ...) and
/// rejects `additionalProperties`.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" => continue,
                    "type" => {
                        let converted = value
                            .as_str()
                            .map(|t| Value::String(t.to_ascii_uppercase()))
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), converted);
                    }
                    // Enum values and required names are data, not schema
                    "enum" | "required" => {
                        out.insert(key.clone(), value.clone());
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}
