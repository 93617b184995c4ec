//! The account entity.

use serde::{Deserialize, Serialize};

use coffer_auth::PrincipalId;
use coffer_core::{AccountId, LedgerError, LedgerResult, Money};

/// A bank account: holder display name, current balance, owning principal.
///
/// Balances are only ever changed through [`Account::with_balance`], which
/// produces the next revision; the engine persists that revision with a
/// version-checked save, so a stale read can never silently overwrite a
/// newer balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    holder_name: String,
    balance: Money,
    owner: PrincipalId,
    version: u64,
}

impl Account {
    /// Open a new account. The holder name must be non-blank and the opening
    /// balance non-negative.
    pub fn open(
        holder_name: impl Into<String>,
        opening_balance: Money,
        owner: PrincipalId,
    ) -> LedgerResult<Self> {
        let holder_name = holder_name.into();
        if holder_name.trim().is_empty() {
            return Err(LedgerError::validation("account holder name is required"));
        }
        if opening_balance.is_negative() {
            return Err(LedgerError::validation(
                "opening balance cannot be negative",
            ));
        }
        Ok(Self {
            id: AccountId::new(),
            holder_name,
            balance: opening_balance,
            owner,
            version: 1,
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    /// Revision stamp for optimistic concurrency (bumped on every mutation).
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_owned_by(&self, principal: PrincipalId) -> bool {
        self.owner == principal
    }

    /// Next revision of this account with an updated balance.
    pub fn with_balance(&self, balance: Money) -> Self {
        Self {
            balance,
            version: self.version + 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> PrincipalId {
        PrincipalId::new()
    }

    #[test]
    fn open_assigns_id_and_first_version() {
        let account = Account::open("Alice Savings", Money::from_minor_units(10_000), owner())
            .unwrap();
        assert_eq!(account.balance(), Money::from_minor_units(10_000));
        assert_eq!(account.version(), 1);
    }

    #[test]
    fn blank_holder_name_is_rejected() {
        let err = Account::open("   ", Money::ZERO, owner()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn negative_opening_balance_is_rejected() {
        let negative = Money::from_minor_units(-1);
        let err = Account::open("Alice", negative, owner()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn with_balance_bumps_the_version() {
        let account = Account::open("Alice", Money::ZERO, owner()).unwrap();
        let next = account.with_balance(Money::from_minor_units(500));
        assert_eq!(next.id(), account.id());
        assert_eq!(next.version(), 2);
        assert_eq!(next.balance(), Money::from_minor_units(500));
        // The original revision is untouched.
        assert_eq!(account.balance(), Money::ZERO);
    }
}
