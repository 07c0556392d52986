use thiserror::Error;

use crate::models::AccountError;
use crate::storage::StorageError;
use crate::types::{AccountId, Monetary};

/// Why a request was refused before any storage call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("sender account id is missing")]
    MissingSender,
    #[error("receiver account id is missing")]
    MissingReceiver,
    #[error("sender and receiver are the same account")]
    SelfTransfer,
    #[error("amount is not a finite number")]
    NonFiniteAmount,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount is too large to represent")]
    AmountOutOfRange
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Invalid transfer request: {0}")]
    InvalidRequest(#[from] Rejection),
    #[error("Account [{account_id}] was not found")]
    AccountNotFound {
        account_id: AccountId
    },
    #[error("Insufficient funds in account [{account_id}]: requested [{requested}], available [{available}]")]
    InsufficientFunds {
        account_id: AccountId,
        requested: Monetary,
        available: Monetary
    },
    #[error("Account [{account_id}] is blocked")]
    AccountBlocked {
        account_id: AccountId
    },
    #[error("Account [{account_id}] changed while the debit was being checked, nothing was debited")]
    ConcurrentUpdate {
        account_id: AccountId
    },
    #[error("Account store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Account store rejected the update: {0}")]
    UpdateRejected(AccountError),
    #[error("Reversal of [{amount}] to account [{account_id}] failed after {attempts} attempt(s) ({last_error}) following: {cause}; manual reconciliation required")]
    ReversalFailed {
        account_id: AccountId,
        amount: Monetary,
        attempts: usize,
        last_error: String,
        cause: Box<TransferError>
    }
}

impl From<StorageError> for TransferError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Unavailable(reason) => Self::StoreUnavailable(reason),
            StorageError::Rejected(error) => Self::UpdateRejected(error)
        }
    }
}

impl TransferError {
    pub fn account_not_found(account_id: &str) -> Self {
        Self::AccountNotFound { account_id: account_id.to_string() }
    }
}
