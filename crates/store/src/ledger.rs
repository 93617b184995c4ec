//! Append-only transaction ledger trait.

use coffer_core::AccountId;

use crate::account_store::StoreError;
use crate::record::{RecordDraft, TransactionRecord};

/// Append-only store of immutable transaction records.
pub trait TransactionLedger: Send + Sync {
    /// Append a record, assigning its identifier and insertion sequence.
    ///
    /// Never fails for domain reasons; only the storage layer can reject an
    /// append.
    fn append(&self, draft: RecordDraft) -> Result<TransactionRecord, StoreError>;

    /// Records where the account is either source or target, ordered by
    /// timestamp descending, tie-broken by insertion sequence descending.
    fn list_for_account(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>, StoreError>;
}
