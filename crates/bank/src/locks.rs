//! Per-account mutual exclusion.
//!
//! One logical lock per account identifier, acquired before the account is
//! loaded and held until its new revision and the matching ledger record are
//! both persisted. Acquisition is bounded: a waiter that exceeds the timeout
//! gets `Unavailable` (retryable) instead of blocking forever.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use coffer_core::{AccountId, LedgerError, LedgerResult};

#[derive(Debug, Default)]
struct LockSlot {
    held: Mutex<bool>,
    released: Condvar,
}

/// Holds one account's lock; releases on drop.
#[derive(Debug)]
pub struct AccountGuard {
    slot: Arc<LockSlot>,
}

impl Drop for AccountGuard {
    fn drop(&mut self) {
        let mut held = self.slot.held.lock().unwrap_or_else(|e| e.into_inner());
        *held = false;
        self.slot.released.notify_one();
    }
}

/// Registry of per-account locks, keyed by identifier.
///
/// Slots are created lazily and never removed; the registry grows with the
/// number of distinct accounts ever touched, which is bounded by the account
/// store itself.
#[derive(Debug)]
pub struct AccountLocks {
    slots: Mutex<HashMap<AccountId, Arc<LockSlot>>>,
    timeout: Duration,
}

impl AccountLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn slot(&self, id: AccountId) -> Arc<LockSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(id).or_default())
    }

    /// Acquire the lock for one account, waiting at most the configured
    /// timeout.
    pub fn acquire(&self, id: AccountId) -> LedgerResult<AccountGuard> {
        let slot = self.slot(id);
        let deadline = Instant::now() + self.timeout;

        let mut held = slot.held.lock().unwrap_or_else(|e| e.into_inner());
        while *held {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| Self::timed_out(id))?;
            let (guard, wait) = slot
                .released
                .wait_timeout(held, remaining)
                .unwrap_or_else(|e| e.into_inner());
            held = guard;
            if wait.timed_out() && *held {
                return Err(Self::timed_out(id));
            }
        }
        *held = true;
        drop(held);

        Ok(AccountGuard { slot })
    }

    /// Acquire two account locks in ascending identifier order.
    ///
    /// The total order is independent of argument order, so two transfers in
    /// opposite directions between the same accounts cannot deadlock. The
    /// identifiers must differ; the engine rejects self-transfers before it
    /// ever asks for a pair.
    pub fn acquire_pair(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> LedgerResult<(AccountGuard, AccountGuard)> {
        debug_assert_ne!(a, b);
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_guard = self.acquire(first)?;
        let second_guard = self.acquire(second)?;
        Ok((first_guard, second_guard))
    }

    fn timed_out(id: AccountId) -> LedgerError {
        LedgerError::unavailable(format!("timed out waiting for lock on account {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn acquire_is_exclusive_until_dropped() {
        let locks = AccountLocks::new(Duration::from_millis(50));
        let id = AccountId::new();

        let guard = locks.acquire(id).unwrap();
        let err = locks.acquire(id).unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));

        drop(guard);
        assert!(locks.acquire(id).is_ok());
    }

    #[test]
    fn different_accounts_do_not_contend() {
        let locks = AccountLocks::new(Duration::from_millis(50));
        let _a = locks.acquire(AccountId::new()).unwrap();
        let _b = locks.acquire(AccountId::new()).unwrap();
    }

    #[test]
    fn opposite_direction_pairs_do_not_deadlock() {
        let locks = Arc::new(AccountLocks::new(Duration::from_secs(5)));
        let x = AccountId::new();
        let y = AccountId::new();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let locks = Arc::clone(&locks);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    let (a, b) = if i % 2 == 0 { (x, y) } else { (y, x) };
                    let pair = locks.acquire_pair(a, b).unwrap();
                    drop(pair);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn waiter_gets_the_lock_once_released() {
        let locks = Arc::new(AccountLocks::new(Duration::from_secs(5)));
        let id = AccountId::new();

        let guard = locks.acquire(id).unwrap();
        let waiter = {
            let locks = Arc::clone(&locks);
            thread::spawn(move || locks.acquire(id).map(|_| ()))
        };
        thread::sleep(Duration::from_millis(20));
        drop(guard);

        waiter.join().unwrap().unwrap();
    }
}
