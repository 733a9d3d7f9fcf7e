use serde_json::Value;

use crate::error::{LeaderboardError, ResultRejection};

/// Integer-valued fields of a submission after parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatedResult {
    pub score: i64,
    pub max_score: i64,
    pub duration_ms: i64,
    pub accuracy_percent: u8,
}

/// Reads a JSON value as an integer.
///
/// Accepts integers, integral floats (`80.0`) and numeric strings. Values that
/// are integral but do not fit in `i64` are out of range rather than
/// non-integers.
pub fn parse_integral(value: &Value) -> Result<i64, ResultRejection> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            if number.is_u64() {
                return Err(ResultRejection::Range);
            }
            number
                .as_f64()
                .ok_or(ResultRejection::NotInteger)
                .and_then(integral_f64)
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ResultRejection::NotInteger);
            }
            if let Ok(int) = trimmed.parse::<i64>() {
                return Ok(int);
            }
            match trimmed.parse::<f64>() {
                Ok(float) if float.is_finite() => integral_f64(float),
                _ => Err(ResultRejection::NotInteger),
            }
        }
        _ => Err(ResultRejection::NotInteger),
    }
}

fn integral_f64(value: f64) -> Result<i64, ResultRejection> {
    if value.fract() != 0.0 {
        return Err(ResultRejection::NotInteger);
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(ResultRejection::Range);
    }
    Ok(value as i64)
}

/// `round(score / max_score * 100)` clamped to 0..=100.
pub fn accuracy_percent(score: i64, max_score: i64) -> u8 {
    if max_score <= 0 {
        return 0;
    }
    let ratio = score as f64 / max_score as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

pub struct ResultValidator;

impl ResultValidator {
    pub fn validate(score: i64, max_score: i64, duration_ms: i64) -> Result<u8, LeaderboardError> {
        if max_score <= 0 {
            return Err(range("maxScore"));
        }
        if score < 0 || score > max_score {
            return Err(range("score"));
        }
        if duration_ms < 0 {
            return Err(range("durationMs"));
        }
        Ok(accuracy_percent(score, max_score))
    }

    /// Integer parsing for all three fields first, then range checks.
    pub fn validate_raw(
        score: &Value,
        max_score: &Value,
        duration_ms: &Value,
    ) -> Result<ValidatedResult, LeaderboardError> {
        let fields = [
            ("score", score),
            ("maxScore", max_score),
            ("durationMs", duration_ms),
        ];
        let mut parsed = [0i64; 3];
        for (slot, (field, value)) in parsed.iter_mut().zip(fields) {
            *slot = parse_integral(value)
                .map_err(|reason| LeaderboardError::InvalidResult { field, reason })?;
        }
        let [score, max_score, duration_ms] = parsed;
        let accuracy_percent = Self::validate(score, max_score, duration_ms)?;
        Ok(ValidatedResult {
            score,
            max_score,
            duration_ms,
            accuracy_percent,
        })
    }
}

fn range(field: &'static str) -> LeaderboardError {
    LeaderboardError::InvalidResult {
        field,
        reason: ResultRejection::Range,
    }
}
