//! `coffer-auth` — principal identity and resolution.
//!
//! Password hashing, token issuance, and route gating live outside the core.
//! This crate only answers "who is acting": a stable principal identifier, a
//! display identity, a coarse role, and a directory that resolves
//! authenticated usernames to principals.

pub mod directory;
pub mod principal;

pub use directory::{DirectoryError, InMemoryPrincipalDirectory, PrincipalDirectory};
pub use principal::{Principal, PrincipalId, Role};
