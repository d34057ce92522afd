//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidArgument(format!("invalid {label} id")))
}

/// Reject empty or whitespace-only names, returning the trimmed value.
pub(crate) fn require_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim free-text input, mapping whitespace-only values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Reject non-positive transaction/transfer amounts.
pub(crate) fn require_positive_amount(amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidArgument(
            "amount must be > 0".to_string(),
        ));
    }
    Ok(amount_minor)
}

/// Ensure a wallet currency matches the owning budget currency.
pub(crate) fn ensure_budget_currency(
    budget_currency: Currency,
    actual: Currency,
) -> ResultEngine<()> {
    if budget_currency != actual {
        return Err(EngineError::InvalidArgument(format!(
            "budget currency is {}, got {}",
            budget_currency.code(),
            actual.code()
        )));
    }
    Ok(())
}
