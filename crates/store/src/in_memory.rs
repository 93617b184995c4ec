//! In-memory store implementations.
//!
//! Intended for tests/dev and the demo binary. Not optimized for performance.
//! Poisoned locks are recovered rather than propagated: the guarded data is
//! plain state that stays consistent even if a writer panicked mid-assert.

use std::collections::HashMap;
use std::sync::RwLock;

use coffer_auth::PrincipalId;
use coffer_core::{AccountId, TransactionId};

use crate::account::Account;
use crate::account_store::{AccountStore, StoreError};
use crate::ledger::TransactionLedger;
use crate::record::{RecordDraft, TransactionRecord};

/// In-memory key-value account store with version-checked saves.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts.get(&id).cloned())
    }

    fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    fn save(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let stored = accounts
            .get(&account.id())
            .ok_or(StoreError::NotFound(account.id()))?;

        if stored.version() + 1 != account.version() {
            return Err(StoreError::VersionConflict {
                account_id: account.id(),
                expected: stored.version() + 1,
                found: account.version(),
            });
        }

        accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    fn list_by_owner(&self, owner: PrincipalId) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<Account> = accounts
            .values()
            .filter(|a| a.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.id());
        Ok(owned)
    }

    fn list_all(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by_key(|a| a.id());
        Ok(all)
    }
}

/// In-memory append-only transaction ledger.
#[derive(Debug, Default)]
pub struct InMemoryTransactionLedger {
    records: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryTransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in insertion order. Used by replay checks in tests.
    pub fn all_records(&self) -> Vec<TransactionRecord> {
        self.records.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TransactionLedger for InMemoryTransactionLedger {
    fn append(&self, draft: RecordDraft) -> Result<TransactionRecord, StoreError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let record = TransactionRecord {
            id: TransactionId::new(),
            sequence: records.len() as u64 + 1,
            detail: draft,
        };
        records.push(record.clone());
        Ok(record)
    }

    fn list_for_account(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut matching: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| r.touches(account_id))
            .cloned()
            .collect();
        // Newest first; sequence breaks same-instant ties deterministically.
        matching.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then(b.sequence.cmp(&a.sequence))
        });
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use coffer_core::Money;

    fn cents(n: i64) -> Money {
        Money::from_minor_units(n)
    }

    fn open(owner: PrincipalId, balance: i64) -> Account {
        Account::open("Holder", cents(balance), owner).unwrap()
    }

    #[test]
    fn save_rejects_stale_revisions() {
        let store = InMemoryAccountStore::new();
        let account = store.insert(open(PrincipalId::new(), 1000)).unwrap();

        // Two writers load the same revision; the second save must fail.
        let first = account.with_balance(cents(1500));
        let second = account.with_balance(cents(400));

        store.save(first).unwrap();
        let err = store.save(second).unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));

        let stored = store.get(account.id()).unwrap().unwrap();
        assert_eq!(stored.balance(), cents(1500));
    }

    #[test]
    fn save_of_unknown_account_fails() {
        let store = InMemoryAccountStore::new();
        let account = open(PrincipalId::new(), 0);
        let err = store.save(account.with_balance(cents(10))).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_by_owner_filters() {
        let store = InMemoryAccountStore::new();
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();
        store.insert(open(alice, 100)).unwrap();
        store.insert(open(alice, 200)).unwrap();
        store.insert(open(bob, 300)).unwrap();

        assert_eq!(store.list_by_owner(alice).unwrap().len(), 2);
        assert_eq!(store.list_by_owner(bob).unwrap().len(), 1);
        assert_eq!(store.list_all().unwrap().len(), 3);
    }

    #[test]
    fn append_assigns_increasing_sequences() {
        let ledger = InMemoryTransactionLedger::new();
        let account = AccountId::new();
        let initiator = PrincipalId::new();
        let now = Utc::now();

        let first = ledger
            .append(RecordDraft::deposit(cents(100), account, cents(100), initiator, now))
            .unwrap();
        let second = ledger
            .append(RecordDraft::deposit(cents(50), account, cents(150), initiator, now))
            .unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn listing_orders_newest_first_with_sequence_tiebreak() {
        let ledger = InMemoryTransactionLedger::new();
        let account = AccountId::new();
        let other = AccountId::new();
        let initiator = PrincipalId::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);

        // Two records at the same instant, one later, one for another account.
        ledger
            .append(RecordDraft::deposit(cents(1), account, cents(1), initiator, t0))
            .unwrap();
        ledger
            .append(RecordDraft::deposit(cents(2), account, cents(3), initiator, t0))
            .unwrap();
        ledger
            .append(RecordDraft::deposit(cents(3), account, cents(6), initiator, t1))
            .unwrap();
        ledger
            .append(RecordDraft::deposit(cents(9), other, cents(9), initiator, t1))
            .unwrap();

        let listed = ledger.list_for_account(account).unwrap();
        let sequences: Vec<u64> = listed.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![3, 2, 1]);
    }
}
