mod account;
mod errors;
mod ledger;
#[cfg(test)]
mod tests;
mod transfer;

use serde::Deserialize;

pub use account::Account;
pub use errors::AccountError;
pub use ledger::LedgerEntry;
pub use transfer::{TransferInstruction, TransferRequest};

/// Direction of a ledger entry. A `Reversal` undoes a `Debit` of the same
/// transfer and is never recorded as a second debit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryKind {
    Debit,
    Credit,
    Reversal
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Active,
    Blocked
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "active",
            CardStatus::Blocked => "blocked"
        }
    }
}
