use crate::models::{Account, EntryKind, LedgerEntry};
use crate::types::{AccountId, Monetary};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Account [{account_id}] cannot be opened with negative balance [{balance}]")]
    NegativeBalance {
        account_id: AccountId,
        balance: Monetary
    },
    #[error("Entry amount [{amount}]:[{kind:?}] must be positive for account [{account_id}]")]
    NonPositiveAmount {
        account_id: AccountId,
        kind: EntryKind,
        amount: Monetary
    },
    #[error("Insufficient funds for [{kind:?}] of [{amount}] on account [{account_id}] holding [{balance}]")]
    InsufficientFunds {
        account_id: AccountId,
        kind: EntryKind,
        amount: Monetary,
        balance: Monetary
    },
    #[error("Numeric overflow applying [{kind:?}] of [{amount}] to account [{account_id}]")]
    Overflow {
        account_id: AccountId,
        kind: EntryKind,
        amount: Monetary
    }
}

impl AccountError {
    pub fn negative_balance(account_id: &str, balance: Monetary) -> Self {
        Self::NegativeBalance { account_id: account_id.to_string(), balance }
    }

    pub fn non_positive_amount(account: &Account, entry: &LedgerEntry) -> Self {
        Self::NonPositiveAmount {
            account_id: account.account_id.clone(),
            kind: entry.kind,
            amount: entry.amount
        }
    }

    pub fn insufficient_funds(account: &Account, entry: &LedgerEntry) -> Self {
        Self::InsufficientFunds {
            account_id: account.account_id.clone(),
            kind: entry.kind,
            amount: entry.amount,
            balance: account.balance()
        }
    }

    pub fn overflow(account: &Account, entry: &LedgerEntry) -> Self {
        Self::Overflow {
            account_id: account.account_id.clone(),
            kind: entry.kind,
            amount: entry.amount
        }
    }
}
