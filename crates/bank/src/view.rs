//! Display shapes for transaction history.
//!
//! Records reference accounts and principals by identifier; the outer layer
//! wants names next to them. Resolution happens here, after the mutation
//! path, and never feeds back into it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coffer_auth::{PrincipalDirectory, PrincipalId};
use coffer_core::{AccountId, LedgerResult, Money, TransactionId};
use coffer_store::{AccountStore, TransactionKind, TransactionRecord};

/// An account endpoint reduced to what history rendering needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub holder_name: String,
}

/// The initiating principal reduced to id + username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalSummary {
    pub id: PrincipalId,
    pub username: String,
}

/// One history entry with both endpoints and the initiator resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
    pub source: Option<AccountSummary>,
    pub target: Option<AccountSummary>,
    pub source_balance_after: Option<Money>,
    pub target_balance_after: Option<Money>,
    pub initiator: PrincipalSummary,
}

impl TransactionView {
    /// Resolve a record's identifiers against the account store and the
    /// principal directory.
    ///
    /// Accounts are never deleted, so endpoint lookups normally succeed; a
    /// missing one (or a deregistered principal) renders as `(unknown)`
    /// rather than failing the whole page.
    pub fn resolve<S, D>(record: &TransactionRecord, accounts: &S, directory: &D) -> LedgerResult<Self>
    where
        S: AccountStore,
        D: PrincipalDirectory,
    {
        let summarize = |id: AccountId| -> Result<AccountSummary, coffer_store::StoreError> {
            Ok(AccountSummary {
                id,
                holder_name: accounts
                    .get(id)?
                    .map(|a| a.holder_name().to_string())
                    .unwrap_or_else(|| "(unknown)".to_string()),
            })
        };

        let source = record.detail.source.map(|id| summarize(id)).transpose()?;
        let target = record.detail.target.map(|id| summarize(id)).transpose()?;

        let initiator = PrincipalSummary {
            id: record.detail.initiator,
            username: directory
                .get(record.detail.initiator)
                .map(|p| p.username)
                .unwrap_or_else(|| "(unknown)".to_string()),
        };

        Ok(Self {
            id: record.id,
            kind: record.kind(),
            amount: record.amount(),
            timestamp: record.timestamp(),
            source,
            target,
            source_balance_after: record.detail.source_balance_after,
            target_balance_after: record.detail.target_balance_after,
            initiator,
        })
    }
}
