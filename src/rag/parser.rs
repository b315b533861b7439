//! Strict parsing of the generation provider's response.
//!
//! The provider is told to answer with bare JSON, but responses wrapped in
//! markdown code fences or surrounded by prose still occur. Handling is
//! strict: strip fences, take the substring between the first `{` and the
//! last `}`, parse against the expected shape, and fail with [`ParseError`]
//! on anything missing or mistyped.

use serde::Deserialize;
use thiserror::Error;

use crate::model::Decision;

/// Malformed generation-provider response.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    /// Invalid JSON, or a required field (decision, score, rate,
    /// explanation, monthly payment, debt ratio) missing or mistyped.
    #[error("response does not match the expected shape: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("unrecognized decision value '{value}'")]
    UnknownDecision { value: String },

    #[error("score {value} is outside [0,100]")]
    ScoreOutOfRange { value: f64 },

    #[error("annual rate {value}% is outside [0,100]")]
    RateOutOfRange { value: f64 },
}

/// Every field is required except `key_factors`; a response missing any of
/// them is rejected rather than accepted partially populated.
#[derive(Debug, Deserialize)]
struct RawDecision {
    decision: String,
    score: f64,
    /// Annual rate in percent.
    annual_rate: f64,
    explanation: String,
    #[allow(dead_code)]
    monthly_payment: f64,
    #[allow(dead_code)]
    debt_ratio: f64,
    #[serde(default)]
    key_factors: Vec<String>,
}

/// Validated generative decision.
#[derive(Debug, Clone, PartialEq)]
pub struct RagDecision {
    pub decision: Decision,
    pub score: f64,
    /// Annual rate as a fraction.
    pub annual_rate: f64,
    pub explanation: String,
    pub key_factors: Vec<String>,
}

/// Extracts the JSON object embedded in `raw`.
pub fn extract_json_object(raw: &str) -> Result<String, ParseError> {
    let cleaned = raw.replace("```json", "").replace("```", "");

    let start = cleaned.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = cleaned.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    Ok(cleaned[start..=end].to_string())
}

/// Parses and validates a generation response.
pub fn parse_decision(raw: &str) -> Result<RagDecision, ParseError> {
    let json = extract_json_object(raw)?;
    let parsed: RawDecision = serde_json::from_str(&json)?;

    let decision = match parsed.decision.trim().to_ascii_lowercase().as_str() {
        "approved" => Decision::Approved,
        "rejected" => Decision::Rejected,
        _ => {
            return Err(ParseError::UnknownDecision {
                value: parsed.decision,
            });
        }
    };

    if !parsed.score.is_finite() || !(0.0..=100.0).contains(&parsed.score) {
        return Err(ParseError::ScoreOutOfRange {
            value: parsed.score,
        });
    }
    if !parsed.annual_rate.is_finite() || !(0.0..=100.0).contains(&parsed.annual_rate) {
        return Err(ParseError::RateOutOfRange {
            value: parsed.annual_rate,
        });
    }

    Ok(RagDecision {
        decision,
        score: parsed.score,
        annual_rate: parsed.annual_rate / 100.0,
        explanation: parsed.explanation,
        key_factors: parsed.key_factors,
    })
}
