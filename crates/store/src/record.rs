//! Immutable transaction records.
//!
//! A record is the audit entry for exactly one committed balance mutation. It
//! snapshots the balance *after* the mutation on each involved side; the
//! pre-mutation balance is always recoverable as `after ∓ amount`, so no
//! "before" field exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coffer_auth::PrincipalId;
use coffer_core::{AccountId, Money, TransactionId};

/// Kind of balance mutation a record describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

/// A record ready to be appended, before the ledger assigns identity.
///
/// Construction goes through the kind-specific constructors below, which are
/// the only way to get the endpoint shape right: deposits have no source,
/// withdrawals have no target, transfers have both, and a balance-after
/// snapshot exists exactly where the endpoint does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub amount: Money,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub source: Option<AccountId>,
    pub target: Option<AccountId>,
    pub source_balance_after: Option<Money>,
    pub target_balance_after: Option<Money>,
    pub initiator: PrincipalId,
}

impl RecordDraft {
    pub fn deposit(
        amount: Money,
        target: AccountId,
        target_balance_after: Money,
        initiator: PrincipalId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            kind: TransactionKind::Deposit,
            timestamp,
            source: None,
            target: Some(target),
            source_balance_after: None,
            target_balance_after: Some(target_balance_after),
            initiator,
        }
    }

    pub fn withdrawal(
        amount: Money,
        source: AccountId,
        source_balance_after: Money,
        initiator: PrincipalId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            kind: TransactionKind::Withdrawal,
            timestamp,
            source: Some(source),
            target: None,
            source_balance_after: Some(source_balance_after),
            target_balance_after: None,
            initiator,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        amount: Money,
        source: AccountId,
        target: AccountId,
        source_balance_after: Money,
        target_balance_after: Money,
        initiator: PrincipalId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            kind: TransactionKind::Transfer,
            timestamp,
            source: Some(source),
            target: Some(target),
            source_balance_after: Some(source_balance_after),
            target_balance_after: Some(target_balance_after),
            initiator,
        }
    }

    /// True when the record involves the given account on either side.
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.source == Some(account_id) || self.target == Some(account_id)
    }
}

/// A committed ledger record: a draft plus ledger-assigned identity.
///
/// `sequence` is the insertion order within the ledger. Ordering by
/// `(timestamp, sequence)` is total even when two records carry the same
/// instant. Records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub sequence: u64,
    #[serde(flatten)]
    pub detail: RecordDraft,
}

impl TransactionRecord {
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.detail.touches(account_id)
    }

    pub fn kind(&self) -> TransactionKind {
        self.detail.kind
    }

    pub fn amount(&self) -> Money {
        self.detail.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.detail.timestamp
    }

    /// Signed effect of this record on the given account's balance.
    ///
    /// Positive when the account is the target (money in), negative when it
    /// is the source (money out), `None` when the record does not touch it.
    pub fn effect_on(&self, account_id: AccountId) -> Option<Money> {
        if self.detail.target == Some(account_id) {
            Some(self.detail.amount)
        } else if self.detail.source == Some(account_id) {
            Some(Money::ZERO - self.detail.amount)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(n: i64) -> Money {
        Money::from_minor_units(n)
    }

    #[test]
    fn deposit_shape_has_no_source() {
        let target = AccountId::new();
        let draft = RecordDraft::deposit(cents(500), target, cents(1500), PrincipalId::new(), Utc::now());

        assert_eq!(draft.kind, TransactionKind::Deposit);
        assert_eq!(draft.source, None);
        assert_eq!(draft.source_balance_after, None);
        assert_eq!(draft.target, Some(target));
        assert_eq!(draft.target_balance_after, Some(cents(1500)));
    }

    #[test]
    fn withdrawal_shape_has_no_target() {
        let source = AccountId::new();
        let draft =
            RecordDraft::withdrawal(cents(500), source, cents(1000), PrincipalId::new(), Utc::now());

        assert_eq!(draft.kind, TransactionKind::Withdrawal);
        assert_eq!(draft.target, None);
        assert_eq!(draft.target_balance_after, None);
        assert_eq!(draft.source, Some(source));
        assert_eq!(draft.source_balance_after, Some(cents(1000)));
    }

    #[test]
    fn effect_is_signed_by_endpoint() {
        let source = AccountId::new();
        let target = AccountId::new();
        let other = AccountId::new();
        let record = TransactionRecord {
            id: TransactionId::new(),
            sequence: 1,
            detail: RecordDraft::transfer(
                cents(3000),
                source,
                target,
                cents(12_000),
                cents(5000),
                PrincipalId::new(),
                Utc::now(),
            ),
        };

        assert_eq!(record.effect_on(target), Some(cents(3000)));
        assert_eq!(record.effect_on(source), Some(cents(-3000)));
        assert_eq!(record.effect_on(other), None);
    }
}
