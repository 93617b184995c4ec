//! Account store trait and storage-layer errors.

use thiserror::Error;

use coffer_auth::PrincipalId;
use coffer_core::{AccountId, LedgerError};

use crate::account::Account;

/// Storage-layer failure.
///
/// Deterministic domain failures (insufficient funds, ownership, amounts)
/// never originate here; this is only what the storage itself can get wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The account being saved does not exist.
    #[error("account {0} not found")]
    NotFound(AccountId),

    /// The revision stamp moved since the account was loaded.
    #[error("version conflict on account {account_id} (expected {expected}, found {found})")]
    VersionConflict {
        account_id: AccountId,
        expected: u64,
        found: u64,
    },

    /// The backend could not complete the operation in bounded time.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => LedgerError::NotFound,
            StoreError::VersionConflict { .. } => LedgerError::conflict(err.to_string()),
            StoreError::Unavailable(msg) => LedgerError::unavailable(msg),
        }
    }
}

/// Durable key-value mapping from account identifier to account state.
pub trait AccountStore: Send + Sync {
    /// Load an account. `None` when no account has this identifier.
    fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Persist a freshly opened account.
    fn insert(&self, account: Account) -> Result<Account, StoreError>;

    /// Persist a mutated revision.
    ///
    /// Succeeds only when the incoming revision is exactly one ahead of the
    /// stored one; anything else means a concurrent writer got there first
    /// and the whole operation must retry from its load.
    fn save(&self, account: Account) -> Result<Account, StoreError>;

    /// Accounts owned by the given principal.
    fn list_by_owner(&self, owner: PrincipalId) -> Result<Vec<Account>, StoreError>;

    /// Every account, unfiltered. Administrative use only.
    fn list_all(&self) -> Result<Vec<Account>, StoreError>;
}
