use std::fmt;

use crate::transfer::TransferError;
use crate::types::{Monetary, TransferId};

/// States of a transfer saga.
///
/// ```text
/// Validating -> Debiting -> Declined
///                        -> Crediting -> Committed
///                                     -> Compensating -> Reverted
///                                                     -> Unreconciled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Validating,
    Debiting,
    Crediting,
    Compensating,
    Committed,
    Declined,
    Reverted,
    Unreconciled
}

impl TransferState {
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::Declined | TransferState::Reverted | TransferState::Unreconciled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validating => "VALIDATING",
            TransferState::Debiting => "DEBITING",
            TransferState::Crediting => "CREDITING",
            TransferState::Compensating => "COMPENSATING",
            TransferState::Committed => "COMMITTED",
            TransferState::Declined => "DECLINED",
            TransferState::Reverted => "REVERTED",
            TransferState::Unreconciled => "UNRECONCILED"
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// Definite outcome of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    /// Sender debited and receiver credited.
    Committed {
        transfer_id: TransferId,
        new_sender_balance: Monetary
    },
    /// Nothing was mutated.
    Declined {
        reason: TransferError
    },
    /// The debit was undone by a reversal entry; balances are as before.
    Reverted {
        transfer_id: TransferId,
        reason: TransferError
    },
    /// The sender was debited, nobody was credited, and the reversal failed.
    Unreconciled {
        transfer_id: TransferId,
        reason: TransferError
    }
}

impl TransferResult {
    pub fn state(&self) -> TransferState {
        match self {
            TransferResult::Committed { .. } => TransferState::Committed,
            TransferResult::Declined { .. } => TransferState::Declined,
            TransferResult::Reverted { .. } => TransferState::Reverted,
            TransferResult::Unreconciled { .. } => TransferState::Unreconciled
        }
    }

    #[cfg(test)]
    pub fn is_committed(&self) -> bool {
        matches!(self, TransferResult::Committed { .. })
    }

    #[cfg(test)]
    pub fn reason(&self) -> Option<&TransferError> {
        match self {
            TransferResult::Committed { .. } => None,
            TransferResult::Declined { reason }
            | TransferResult::Reverted { reason, .. }
            | TransferResult::Unreconciled { reason, .. } => Some(reason)
        }
    }
}
