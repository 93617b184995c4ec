//! The ledger engine.
//!
//! Every mutating operation follows the same shape: acquire the account
//! lock(s), load, validate, compute the new balance(s), then persist the new
//! account revision(s) and append exactly one ledger record before releasing
//! the lock(s). All validation happens before any write, so a rejected
//! operation leaves no state behind.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use coffer_auth::Principal;
use coffer_core::{AccountId, Clock, LedgerError, LedgerResult, Money};
use coffer_store::{Account, AccountStore, RecordDraft, TransactionLedger, TransactionRecord};

use crate::locks::AccountLocks;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Validates and applies balance mutations, pairing each one with an
/// immutable ledger record inside the same critical section.
pub struct LedgerEngine<S, L> {
    accounts: Arc<S>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    locks: AccountLocks,
}

impl<S, L> LedgerEngine<S, L>
where
    S: AccountStore,
    L: TransactionLedger,
{
    pub fn new(accounts: Arc<S>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self::with_lock_timeout(accounts, ledger, clock, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(
        accounts: Arc<S>,
        ledger: Arc<L>,
        clock: Arc<dyn Clock>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            ledger,
            clock,
            locks: AccountLocks::new(lock_timeout),
        }
    }

    /// Open a new account owned by the acting principal.
    ///
    /// Opening an account is not a balance mutation and appends no record;
    /// the opening balance is where every replay of this account starts.
    pub fn create_account(
        &self,
        holder_name: impl Into<String>,
        opening_balance: Money,
        principal: &Principal,
    ) -> LedgerResult<Account> {
        let account = Account::open(holder_name, opening_balance, principal.id)?;
        let account = self.accounts.insert(account)?;
        info!(
            account_id = %account.id(),
            owner = %principal.id,
            opening_balance = %account.balance(),
            "account opened"
        );
        Ok(account)
    }

    /// Accounts owned by the acting principal.
    pub fn list_accounts(&self, principal: &Principal) -> LedgerResult<Vec<Account>> {
        Ok(self.accounts.list_by_owner(principal.id)?)
    }

    /// Every account, unfiltered. Admin only.
    pub fn list_accounts_admin(&self, principal: &Principal) -> LedgerResult<Vec<Account>> {
        if !principal.is_admin() {
            return Err(LedgerError::Forbidden);
        }
        Ok(self.accounts.list_all()?)
    }

    /// Credit `amount` to the account and record a DEPOSIT.
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Money,
        principal: &Principal,
    ) -> LedgerResult<Account> {
        let _guard = self.locks.acquire(account_id)?;

        let account = self.load(account_id)?;
        assert_owner(&account, principal)?;
        ensure_positive(amount)?;

        let new_balance = checked_add(account.balance(), amount)?;
        let updated = self.accounts.save(account.with_balance(new_balance))?;
        let append = self.ledger.append(RecordDraft::deposit(
            amount,
            account_id,
            new_balance,
            principal.id,
            self.clock.now(),
        ));
        if let Err(err) = append {
            // A real backend can fail the append; the balance mutation must
            // not survive without its record.
            let _ = self.accounts.save(updated.with_balance(account.balance()));
            return Err(err.into());
        }

        info!(account_id = %account_id, amount = %amount, balance = %new_balance, "deposit committed");
        Ok(updated)
    }

    /// Debit `amount` from the account and record a WITHDRAWAL.
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Money,
        principal: &Principal,
    ) -> LedgerResult<Account> {
        let _guard = self.locks.acquire(account_id)?;

        let account = self.load(account_id)?;
        assert_owner(&account, principal)?;
        ensure_positive(amount)?;
        if account.balance() < amount {
            return Err(LedgerError::InsufficientFunds);
        }

        let new_balance = account.balance() - amount;
        let updated = self.accounts.save(account.with_balance(new_balance))?;
        let append = self.ledger.append(RecordDraft::withdrawal(
            amount,
            account_id,
            new_balance,
            principal.id,
            self.clock.now(),
        ));
        if let Err(err) = append {
            let _ = self.accounts.save(updated.with_balance(account.balance()));
            return Err(err.into());
        }

        info!(account_id = %account_id, amount = %amount, balance = %new_balance, "withdrawal committed");
        Ok(updated)
    }

    /// Move `amount` between two accounts and record a single TRANSFER.
    ///
    /// The source must belong to the acting principal; any account may
    /// receive. Callers re-query if they need the updated balances.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Money,
        principal: &Principal,
    ) -> LedgerResult<()> {
        // Rejected before locking: the pair lock is not reentrant.
        if from == to {
            return Err(LedgerError::InvalidDestination);
        }

        debug!(from = %from, to = %to, "acquiring transfer lock pair");
        let _guards = self.locks.acquire_pair(from, to)?;

        // Both endpoints must exist and the source must be owned before the
        // amount is even looked at.
        let source = self.load(from)?;
        assert_owner(&source, principal)?;
        let target = self.load(to)?;

        ensure_positive(amount)?;
        if source.balance() < amount {
            return Err(LedgerError::InsufficientFunds);
        }

        let source_after = source.balance() - amount;
        let target_after = checked_add(target.balance(), amount)?;

        // Both saves happen under both locks; every writer goes through the
        // engine, so the only way a version conflict fires here is an
        // out-of-band writer. Restore the source before surfacing it, so no
        // half-applied transfer is ever visible.
        let saved_source = self.accounts.save(source.with_balance(source_after))?;
        let saved_target = match self.accounts.save(target.with_balance(target_after)) {
            Ok(saved) => saved,
            Err(err) => {
                let _ = self.accounts.save(saved_source.with_balance(source.balance()));
                return Err(err.into());
            }
        };

        let append = self.ledger.append(RecordDraft::transfer(
            amount,
            from,
            to,
            source_after,
            target_after,
            principal.id,
            self.clock.now(),
        ));
        if let Err(err) = append {
            let _ = self.accounts.save(saved_target.with_balance(target.balance()));
            let _ = self.accounts.save(saved_source.with_balance(source.balance()));
            return Err(err.into());
        }

        info!(
            from = %from,
            to = %to,
            amount = %amount,
            source_balance = %source_after,
            target_balance = %target_after,
            "transfer committed"
        );
        Ok(())
    }

    /// Transaction records touching the account, newest first.
    ///
    /// Only the owner may view an account's history; admins bypass the guard.
    pub fn history(
        &self,
        account_id: AccountId,
        principal: &Principal,
    ) -> LedgerResult<Vec<TransactionRecord>> {
        let account = self.load(account_id)?;
        if !principal.is_admin() {
            assert_owner(&account, principal)?;
        }
        Ok(self.ledger.list_for_account(account_id)?)
    }

    fn load(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.accounts.get(account_id)?.ok_or(LedgerError::NotFound)
    }
}

fn assert_owner(account: &Account, principal: &Principal) -> LedgerResult<()> {
    if !account.is_owned_by(principal.id) {
        return Err(LedgerError::Forbidden);
    }
    Ok(())
}

fn ensure_positive(amount: Money) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::invalid_amount("amount must be positive"));
    }
    Ok(())
}

fn checked_add(balance: Money, amount: Money) -> LedgerResult<Money> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))
}
