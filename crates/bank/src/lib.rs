//! `coffer-bank` — the ledger engine.
//!
//! Validates and applies deposit, withdrawal, and transfer operations against
//! the account store, pairing every balance mutation with exactly one ledger
//! append inside the same per-account critical section. The ledger is
//! therefore always a faithful replay of balance history: folding the records
//! that touch an account, in chronological order from its opening balance,
//! reproduces the stored balance.

pub mod engine;
pub mod locks;
pub mod view;

pub use engine::LedgerEngine;
pub use locks::{AccountGuard, AccountLocks};
pub use view::{AccountSummary, PrincipalSummary, TransactionView};
