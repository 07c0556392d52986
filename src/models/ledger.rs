use chrono::{DateTime, Utc};

use crate::models::EntryKind;
use crate::types::{Monetary, TransferId};

/// One immutable, balance-affecting event in an account's history.
///
/// An entry doubles as the mutation handed to the store: posting it moves
/// the balance in the direction of its `kind` and appends it, so every
/// balance change has exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The transfer saga that wrote this entry.
    pub transfer_id: TransferId,
    pub kind: EntryKind,
    /// Always strictly positive; direction comes from `kind`.
    pub amount: Monetary,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>
}

impl LedgerEntry {
    pub fn debit(transfer_id: TransferId, amount: Monetary, timestamp: DateTime<Utc>) -> Self {
        Self {
            transfer_id,
            kind: EntryKind::Debit,
            amount,
            timestamp,
            note: None
        }
    }

    pub fn credit(transfer_id: TransferId, amount: Monetary, timestamp: DateTime<Utc>) -> Self {
        Self {
            transfer_id,
            kind: EntryKind::Credit,
            amount,
            timestamp,
            note: None
        }
    }

    pub fn reversal(transfer_id: TransferId, amount: Monetary, note: impl Into<String>) -> Self {
        Self {
            transfer_id,
            kind: EntryKind::Reversal,
            amount,
            timestamp: Utc::now(),
            note: Some(note.into())
        }
    }
}
