//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every operation failure in the core is one of these kinds; callers decide
/// retry/report policy from the kind, never from string matching. None of
/// these are process-fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The referenced account does not exist.
    #[error("account not found")]
    NotFound,

    /// The acting principal does not own the referenced account.
    #[error("principal does not own this account")]
    Forbidden,

    /// The amount is zero, negative, or otherwise unusable.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Transfer source and target are the same account.
    #[error("transfer source and target are identical")]
    InvalidDestination,

    /// Withdrawal or transfer amount exceeds the source balance.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Concurrent-modification detection fired; retry the whole operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage or lock acquisition did not complete in bounded time; retryable.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Input failed validation (e.g. blank holder name, negative opening balance).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True for failures the caller may retry verbatim; all other kinds are
    /// terminal until the request itself changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(LedgerError::conflict("stale version").is_retryable());
        assert!(LedgerError::unavailable("lock timeout").is_retryable());
        assert!(!LedgerError::NotFound.is_retryable());
        assert!(!LedgerError::InsufficientFunds.is_retryable());
        assert!(!LedgerError::Forbidden.is_retryable());
    }
}
