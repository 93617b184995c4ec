//! Principal resolution.
//!
//! The request layer authenticates a username; the core resolves it to a
//! stable [`Principal`] through this capability.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::principal::{Principal, PrincipalId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("username '{0}' is already registered")]
    DuplicateUsername(String),

    #[error("username must not be blank")]
    BlankUsername,
}

/// Identity resolution consumed by the ledger engine's callers.
pub trait PrincipalDirectory: Send + Sync {
    /// Resolve an authenticated username to its principal.
    fn resolve(&self, username: &str) -> Option<Principal>;

    /// Look up a principal by identifier (used when rendering history views).
    fn get(&self, id: PrincipalId) -> Option<Principal>;

    /// Register a new principal. Usernames are unique.
    fn register(&self, principal: Principal) -> Result<Principal, DirectoryError>;

    /// Every registered principal, unfiltered. Administrative use only;
    /// gating is the outer authorization layer's job.
    fn list_all(&self) -> Vec<Principal>;
}

/// In-memory directory. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalDirectory {
    by_id: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryPrincipalDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrincipalDirectory for InMemoryPrincipalDirectory {
    fn resolve(&self, username: &str) -> Option<Principal> {
        let by_id = self.by_id.read().unwrap_or_else(|e| e.into_inner());
        by_id.values().find(|p| p.username == username).cloned()
    }

    fn get(&self, id: PrincipalId) -> Option<Principal> {
        let by_id = self.by_id.read().unwrap_or_else(|e| e.into_inner());
        by_id.get(&id).cloned()
    }

    fn register(&self, principal: Principal) -> Result<Principal, DirectoryError> {
        if principal.username.trim().is_empty() {
            return Err(DirectoryError::BlankUsername);
        }
        let mut by_id = self.by_id.write().unwrap_or_else(|e| e.into_inner());
        if by_id.values().any(|p| p.username == principal.username) {
            return Err(DirectoryError::DuplicateUsername(principal.username));
        }
        by_id.insert(principal.id, principal.clone());
        Ok(principal)
    }

    fn list_all(&self) -> Vec<Principal> {
        let by_id = self.by_id.read().unwrap_or_else(|e| e.into_inner());
        let mut principals: Vec<Principal> = by_id.values().cloned().collect();
        principals.sort_by(|a, b| a.username.cmp(&b.username));
        principals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Role;

    #[test]
    fn register_then_resolve() {
        let dir = InMemoryPrincipalDirectory::new();
        let alice = dir.register(Principal::new("alice", Role::User)).unwrap();

        assert_eq!(dir.resolve("alice"), Some(alice.clone()));
        assert_eq!(dir.get(alice.id), Some(alice));
        assert_eq!(dir.resolve("bob"), None);
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let dir = InMemoryPrincipalDirectory::new();
        dir.register(Principal::new("alice", Role::User)).unwrap();

        let err = dir.register(Principal::new("alice", Role::Admin)).unwrap_err();
        assert_eq!(err, DirectoryError::DuplicateUsername("alice".into()));
    }

    #[test]
    fn blank_usernames_are_rejected() {
        let dir = InMemoryPrincipalDirectory::new();
        let err = dir.register(Principal::new("  ", Role::User)).unwrap_err();
        assert_eq!(err, DirectoryError::BlankUsername);
    }
}
