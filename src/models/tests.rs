use super::{Account, AccountError, CardStatus, EntryKind, LedgerEntry};

use std::str::FromStr;

use anyhow::Result;
use chrono::Utc;

use crate::types::{Monetary, TransferId};

fn money(value: &str) -> Result<Monetary> {
    Ok(Monetary::from_str(value)?)
}

#[test]
fn test_new_account_is_empty_and_active() {
    let account = Account::new("alice");

    assert_eq!(account.account_id, "alice");
    assert_eq!(account.balance(), Monetary::ZERO);
    assert_eq!(account.status, CardStatus::Active);
    assert!(account.entries().is_empty());
}

#[test]
fn test_opening_with_negative_balance_fails() -> Result<()> {
    let result = Account::with_balance("alice", money("-0.0001")?);

    assert!(matches!(result, Err(AccountError::NegativeBalance { .. })));

    Ok(())
}

#[test]
fn test_debit_decrements_balance_and_appends_entry() -> Result<()> {
    let mut account = Account::with_balance("alice", money("100")?)?;
    let entry = LedgerEntry::debit(TransferId::new(), money("30")?, Utc::now());

    let balance = account.post(entry.clone())?;

    assert_eq!(balance, money("70")?);
    assert_eq!(account.balance(), money("70")?);
    assert_eq!(account.entries(), &[entry]);

    Ok(())
}

#[test]
fn test_debit_of_exact_balance_leaves_zero() -> Result<()> {
    let mut account = Account::with_balance("alice", money("10")?)?;

    account.post(LedgerEntry::debit(TransferId::new(), money("10")?, Utc::now()))?;

    assert_eq!(account.balance(), Monetary::ZERO);

    Ok(())
}

#[test]
fn test_overdrawing_debit_fails_without_side_effects() -> Result<()> {
    let mut account = Account::with_balance("alice", money("10")?)?;
    let entry = LedgerEntry::debit(TransferId::new(), money("10.0001")?, Utc::now());

    let result = account.post(entry);

    assert!(matches!(result, Err(AccountError::InsufficientFunds { .. })));
    assert_eq!(account.balance(), money("10")?);
    assert!(account.entries().is_empty());

    Ok(())
}

#[test]
fn test_credit_and_reversal_increment_balance() -> Result<()> {
    let transfer_id = TransferId::new();
    let mut account = Account::with_balance("alice", money("5")?)?;

    account.post(LedgerEntry::credit(transfer_id, money("2.5")?, Utc::now()))?;
    account.post(LedgerEntry::reversal(transfer_id, money("1")?, "rollback: receiver not found"))?;

    let kinds: Vec<EntryKind> = account.entries().iter().map(|entry| entry.kind).collect();

    assert_eq!(account.balance(), money("8.5")?);
    assert_eq!(kinds, vec![EntryKind::Credit, EntryKind::Reversal]);
    assert_eq!(account.entries()[1].note.as_deref(), Some("rollback: receiver not found"));

    Ok(())
}

#[test]
fn test_non_positive_entry_is_rejected() -> Result<()> {
    let mut account = Account::with_balance("alice", money("5")?)?;

    let zero = account.post(LedgerEntry::credit(TransferId::new(), Monetary::ZERO, Utc::now()));
    let negative = account.post(LedgerEntry::credit(TransferId::new(), money("-1")?, Utc::now()));

    assert!(matches!(zero, Err(AccountError::NonPositiveAmount { .. })));
    assert!(matches!(negative, Err(AccountError::NonPositiveAmount { .. })));
    assert!(account.entries().is_empty());

    Ok(())
}

#[test]
fn test_overflowing_credit_fails_without_side_effects() -> Result<()> {
    let mut account = Account::with_balance("alice", Monetary::from_minor_units(i64::MAX))?;

    let result = account.post(LedgerEntry::credit(TransferId::new(), money("1")?, Utc::now()));

    assert!(matches!(result, Err(AccountError::Overflow { .. })));
    assert_eq!(account.balance(), Monetary::from_minor_units(i64::MAX));
    assert!(account.entries().is_empty());

    Ok(())
}

#[test]
fn test_blocked_status_is_carried_but_not_enforced_by_posting() -> Result<()> {
    let mut account = Account::with_balance("alice", money("5")?)?.with_status(CardStatus::Blocked);

    account.post(LedgerEntry::debit(TransferId::new(), money("5")?, Utc::now()))?;

    assert_eq!(account.status.as_str(), "blocked");
    assert_eq!(account.balance(), Monetary::ZERO);

    Ok(())
}
