//! `coffer-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the money value type, the error taxonomy, and the clock
//! capability the ledger engine stamps records with.

pub mod clock;
pub mod error;
pub mod id;
pub mod money;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LedgerError, LedgerResult};
pub use id::{AccountId, TransactionId};
pub use money::Money;
