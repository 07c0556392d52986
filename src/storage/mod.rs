mod account_storage;
#[cfg(test)]
mod tests;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, AccountError, CardStatus, LedgerEntry};
use crate::types::Monetary;

pub use account_storage::AccountStorage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be reached. Nothing was applied.
    #[error("Account store unavailable: {0}")]
    Unavailable(String),
    /// The record refused the mutation. Nothing was applied.
    #[error("Account store rejected the update: {0}")]
    Rejected(#[from] AccountError)
}

/// Predicate evaluated against the current value of a record, inside the
/// same atomic step as the mutation it guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    min_balance: Monetary,
    require_active: bool
}

impl Guard {
    /// Holds when the record's balance covers `amount`.
    pub fn sufficient_funds(amount: Monetary) -> Self {
        Self {
            min_balance: amount,
            require_active: false
        }
    }

    /// Additionally requires the record's card to be active.
    pub fn and_active(mut self) -> Self {
        self.require_active = true;
        self
    }

    pub fn admits(&self, account: &Account) -> bool {
        account.balance() >= self.min_balance
            && (!self.require_active || account.status == CardStatus::Active)
    }
}

/// The account store as seen by the transfer coordinator.
///
/// Each update is atomic and serializable on its single record but there is
/// no multi-record atomicity. Updates return the post-mutation record, or
/// `None` when the record does not exist (or the guard did not hold).
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn fetch(&self, account_id: &str) -> Result<Option<Account>, StorageError>;

    async fn conditional_update(&self, account_id: &str, guard: Guard, entry: LedgerEntry) -> Result<Option<Account>, StorageError>;

    async fn unconditional_update(&self, account_id: &str, entry: LedgerEntry) -> Result<Option<Account>, StorageError>;
}
