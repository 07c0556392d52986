use super::{AccountStorage, Guard, Storage, StorageError};
use crate::models::{Account, AccountError, CardStatus, EntryKind, LedgerEntry};
use crate::storage::account_storage::DEFAULT_OPENING_BALANCE;
use crate::types::{Monetary, TransferId};
use anyhow::{anyhow, Result};
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;

fn money(value: &str) -> Result<Monetary> {
    Ok(Monetary::from_str(value)?)
}

fn storage_with(accounts: &[(&str, &str)]) -> Result<AccountStorage> {
    let storage = AccountStorage::new();

    for (account_id, balance) in accounts {
        storage.open(Account::with_balance(*account_id, money(balance)?)?);
    }

    Ok(storage)
}

#[test]
fn test_open_refuses_duplicate_account_ids() -> Result<()> {
    let storage = storage_with(&[("alice", "100")])?;

    assert!(!storage.open(Account::with_balance("alice", money("5")?)?));
    assert_eq!(storage.len(), 1);

    let alice = storage.snapshot("alice").ok_or_else(|| anyhow!("alice missing from storage"))?;

    assert_eq!(alice.balance(), money("100")?);

    Ok(())
}

#[tokio::test]
async fn test_conditional_update_applies_when_guard_holds() -> Result<()> {
    let storage = storage_with(&[("alice", "100")])?;
    let entry = LedgerEntry::debit(TransferId::new(), money("40")?, Utc::now());

    let updated = storage.conditional_update("alice", Guard::sufficient_funds(money("40")?), entry).await?
        .ok_or_else(|| anyhow!("guard should have held"))?;

    assert_eq!(updated.balance(), money("60")?);
    assert_eq!(updated.entries().len(), 1);
    assert_eq!(storage.snapshot("alice"), Some(updated));

    Ok(())
}

#[tokio::test]
async fn test_conditional_update_returns_none_when_guard_fails() -> Result<()> {
    let storage = storage_with(&[("alice", "100")])?;
    let entry = LedgerEntry::debit(TransferId::new(), money("150")?, Utc::now());

    let updated = storage.conditional_update("alice", Guard::sufficient_funds(money("150")?), entry).await?;
    let alice = storage.snapshot("alice").ok_or_else(|| anyhow!("alice missing from storage"))?;

    assert!(updated.is_none());
    assert_eq!(alice.balance(), money("100")?);
    assert!(alice.entries().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_updates_on_missing_records_return_none() -> Result<()> {
    let storage = AccountStorage::new();
    let amount = money("1")?;

    let conditional = storage.conditional_update("ghost", Guard::sufficient_funds(amount), LedgerEntry::debit(TransferId::new(), amount, Utc::now())).await?;
    let unconditional = storage.unconditional_update("ghost", LedgerEntry::credit(TransferId::new(), amount, Utc::now())).await?;

    assert!(conditional.is_none());
    assert!(unconditional.is_none());
    assert!(!storage.contains("ghost"));

    Ok(())
}

#[tokio::test]
async fn test_active_guard_refuses_blocked_accounts() -> Result<()> {
    let storage = AccountStorage::new();
    storage.open(Account::with_balance("alice", money("100")?)?.with_status(CardStatus::Blocked));

    let guard = Guard::sufficient_funds(money("10")?).and_active();
    let updated = storage.conditional_update("alice", guard, LedgerEntry::debit(TransferId::new(), money("10")?, Utc::now())).await?;

    assert!(updated.is_none());

    Ok(())
}

#[tokio::test]
async fn test_rejected_mutation_surfaces_account_error() -> Result<()> {
    let storage = AccountStorage::new();
    storage.open(Account::with_balance("alice", Monetary::from_minor_units(i64::MAX))?);

    let result = storage.unconditional_update("alice", LedgerEntry::credit(TransferId::new(), money("1")?, Utc::now())).await;

    assert!(matches!(result, Err(StorageError::Rejected(AccountError::Overflow { .. }))));

    Ok(())
}

#[tokio::test]
async fn test_fetched_records_cannot_change_stored_balances() -> Result<()> {
    let storage = storage_with(&[("alice", "100")])?;
    let amount = money("30")?;

    let mut fetched = storage.fetch("alice").await?.ok_or_else(|| anyhow!("alice missing from storage"))?;
    fetched.post(LedgerEntry::debit(TransferId::new(), amount, Utc::now()))?;

    assert_eq!(fetched.balance(), money("70")?);
    assert_eq!(fetched.entries().len(), 1);

    storage.unconditional_update("alice", LedgerEntry::credit(TransferId::new(), amount, Utc::now())).await?;
    storage.conditional_update("alice", Guard::sufficient_funds(money("500")?), LedgerEntry::debit(TransferId::new(), money("500")?, Utc::now())).await?;

    let alice = storage.snapshot("alice").ok_or_else(|| anyhow!("alice missing from storage"))?;
    let credited = alice.entries().iter()
        .filter(|entry| entry.kind == EntryKind::Credit)
        .try_fold(Monetary::ZERO, |total, entry| total.checked_add(entry.amount))
        .ok_or_else(|| anyhow!("Ledger total overflowed"))?;

    assert_eq!(alice.entries().len(), 1);
    assert_eq!(alice.balance().checked_sub(credited), Some(money("100")?));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_guarded_debits_never_overdraw() -> Result<()> {
    let storage = Arc::new(storage_with(&[("alice", "100")])?);
    let amount = money("7")?;
    let mut handles = Vec::new();

    for _ in 0..50 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let entry = LedgerEntry::debit(TransferId::new(), amount, Utc::now());
            storage.conditional_update("alice", Guard::sufficient_funds(amount), entry).await
        }));
    }

    let mut applied = 0;

    for handle in handles {
        if handle.await??.is_some() {
            applied += 1;
        }
    }

    let alice = storage.snapshot("alice").ok_or_else(|| anyhow!("alice missing from storage"))?;

    assert_eq!(applied, 14);
    assert_eq!(alice.balance(), money("2")?);
    assert_eq!(alice.entries().len(), 14);
    assert!(alice.entries().iter().all(|entry| entry.kind == EntryKind::Debit));

    Ok(())
}

#[test]
fn test_import_csv_opens_valid_rows_and_skips_bad_ones() -> Result<()> {
    let csv = "account,balance,status\n\
               alice,100.5,active\n\
               bob,,blocked\n\
               carol,-5,active\n\
               dave,abc,active\n\
               alice,1,active\n\
               erin,20,\n";

    let storage = AccountStorage::new();
    let opened = storage.import_csv(csv.as_bytes());

    assert_eq!(opened, 3);

    let alice = storage.snapshot("alice").ok_or_else(|| anyhow!("alice missing from storage"))?;
    let bob = storage.snapshot("bob").ok_or_else(|| anyhow!("bob missing from storage"))?;
    let erin = storage.snapshot("erin").ok_or_else(|| anyhow!("erin missing from storage"))?;

    assert_eq!(alice.balance(), money("100.5")?);
    assert_eq!(bob.balance(), DEFAULT_OPENING_BALANCE);
    assert_eq!(bob.status, CardStatus::Blocked);
    assert_eq!(erin.status, CardStatus::Active);
    assert!(!storage.contains("carol"));
    assert!(!storage.contains("dave"));

    Ok(())
}
