//! The module contains the errors the ledger can return.
//!
//! The errors a conversation can recover from (reprompt in place) are:
//!
//! - [`InvalidAmount`] for non-numeric or non-positive entry/budget amounts.
//! - [`InvalidPrice`] for the same problem on catalog prices.
//! - [`MalformedInput`] when a name or a delimited pair is missing or empty.
//! - [`NotFound`] when a catalog lookup misses.
//!
//! [`InsufficientFunds`] aborts the operation that raised it, and
//! [`PersistenceCorrupt`] means the durable document could not be parsed.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidPrice`]: EngineError::InvalidPrice
//!  [`MalformedInput`]: EngineError::MalformedInput
//!  [`NotFound`]: EngineError::NotFound
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`PersistenceCorrupt`]: EngineError::PersistenceCorrupt
use thiserror::Error;

use crate::MoneyCents;

/// Ledger errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        balance: MoneyCents,
        requested: MoneyCents,
    },
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Persisted document is corrupt: {0}")]
    PersistenceCorrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// `true` for the errors a caller should answer by asking again for the
    /// same input, without leaving the current step.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidPrice(_) | Self::MalformedInput(_) | Self::NotFound(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidPrice(a), Self::InvalidPrice(b)) => a == b,
            (
                Self::InsufficientFunds {
                    balance: a,
                    requested: x,
                },
                Self::InsufficientFunds {
                    balance: b,
                    requested: y,
                },
            ) => a == b && x == y,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::MalformedInput(a), Self::MalformedInput(b)) => a == b,
            (Self::PersistenceCorrupt(a), Self::PersistenceCorrupt(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
