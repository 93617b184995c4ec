//! Demo wiring of the in-memory stack.
//!
//! Registers two principals, opens accounts, runs a deposit, a withdrawal,
//! and a transfer, then prints the resolved history of each account. The
//! HTTP/auth surface of the real deployment lives outside this workspace.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use coffer_auth::{InMemoryPrincipalDirectory, Principal, PrincipalDirectory, Role};
use coffer_bank::{LedgerEngine, TransactionView};
use coffer_core::{Money, SystemClock};
use coffer_store::{InMemoryAccountStore, InMemoryTransactionLedger};

fn main() -> Result<()> {
    coffer_observability::init();

    let accounts = Arc::new(InMemoryAccountStore::new());
    let ledger = Arc::new(InMemoryTransactionLedger::new());
    let directory = InMemoryPrincipalDirectory::new();
    let engine = LedgerEngine::new(
        Arc::clone(&accounts),
        Arc::clone(&ledger),
        Arc::new(SystemClock),
    );

    let alice = directory.register(Principal::new("alice", Role::User))?;
    let bob = directory.register(Principal::new("bob", Role::User))?;

    let alice_account = engine.create_account("Alice Checking", "100.00".parse()?, &alice)?;
    let bob_account = engine.create_account("Bob Checking", "20.00".parse()?, &bob)?;

    engine.deposit(alice_account.id(), "50.00".parse()?, &alice)?;
    engine.withdraw(alice_account.id(), "10.00".parse()?, &alice)?;
    engine.transfer(
        alice_account.id(),
        bob_account.id(),
        "30.00".parse::<Money>()?,
        &alice,
    )?;

    for account in engine.list_accounts(&alice)?.into_iter().chain(engine.list_accounts(&bob)?) {
        info!(account_id = %account.id(), balance = %account.balance(), "final balance");
        let principal = if account.owner() == alice.id { &alice } else { &bob };
        for record in engine.history(account.id(), principal)? {
            let view = TransactionView::resolve(&record, accounts.as_ref(), &directory)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}
