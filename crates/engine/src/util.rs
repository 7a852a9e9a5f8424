//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! checks every mutation performs so a rejected input never reaches storage.

use crate::{EngineError, MoneyCents, ResultEngine};

/// Trim a category/product name and reject it when nothing is left.
pub(crate) fn required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MalformedInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Entry and budget amounts must be strictly positive.
pub(crate) fn require_positive_amount(amount: MoneyCents) -> ResultEngine<MoneyCents> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }
    Ok(amount)
}

/// Catalog prices must be strictly positive.
pub(crate) fn require_positive_price(price: MoneyCents) -> ResultEngine<MoneyCents> {
    if !price.is_positive() {
        return Err(EngineError::InvalidPrice(format!(
            "price must be greater than zero, got {price}"
        )));
    }
    Ok(price)
}
