//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization so every editor rejects input the same way.

use crate::{EngineError, ResultEngine};

/// Trim a required text field; blank input is rejected with `message`.
pub(crate) fn normalize_required_text(value: &str, message: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Reject negative and non-finite amounts.
pub(crate) fn ensure_amount(value: f64, message: &str) -> ResultEngine<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::Validation(message.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(
            normalize_required_text("  Rossi ", "required").unwrap(),
            "Rossi"
        );
        assert_eq!(
            normalize_required_text("   ", "required"),
            Err(EngineError::Validation("required".to_string()))
        );
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" late arrival ")),
            Some("late arrival".to_string())
        );
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert_eq!(ensure_amount(0.0, "bad").unwrap(), 0.0);
        assert!(ensure_amount(-0.01, "bad").is_err());
        assert!(ensure_amount(f64::NAN, "bad").is_err());
        assert!(ensure_amount(f64::INFINITY, "bad").is_err());
    }
}
