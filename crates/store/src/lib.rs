//! `coffer-store` — durable state behind the ledger engine.
//!
//! Two stores: a key-value account store with optimistic version stamps, and
//! an append-only transaction ledger. Both are traits so the persistence
//! technology stays a collaborator choice; the in-memory implementations here
//! back tests, dev, and the demo binary.

pub mod account;
pub mod account_store;
pub mod in_memory;
pub mod ledger;
pub mod record;

pub use account::Account;
pub use account_store::{AccountStore, StoreError};
pub use in_memory::{InMemoryAccountStore, InMemoryTransactionLedger};
pub use ledger::TransactionLedger;
pub use record::{RecordDraft, TransactionKind, TransactionRecord};
