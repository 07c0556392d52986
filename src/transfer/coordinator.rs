use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::models::{CardStatus, LedgerEntry, TransferRequest};
use crate::storage::{Guard, Storage};
use crate::transfer::{validate, TransferError, TransferResult, TransferState};
use crate::types::{Monetary, TransferId};

/// The compensating update plus one immediate retry.
pub const DEFAULT_REVERSAL_ATTEMPTS: usize = 2;

const NOTE_RECEIVER_NOT_FOUND: &str = "rollback: receiver not found";
const NOTE_CREDIT_FAILED: &str = "rollback: credit failed";

/// Next step of a running saga.
enum Step {
    Debit,
    Credit {
        sender_balance: Monetary
    },
    Compensate {
        cause: TransferError
    },
    Finish(TransferResult)
}

impl Step {
    fn state(&self) -> TransferState {
        match self {
            Step::Debit => TransferState::Debiting,
            Step::Credit { .. } => TransferState::Crediting,
            Step::Compensate { .. } => TransferState::Compensating,
            Step::Finish(result) => result.state()
        }
    }
}

/// Moves funds between two account records without a multi-record
/// transaction.
///
/// A transfer is a saga of at most three single-record updates: a guarded
/// debit of the sender, a credit of the receiver, and, only if the credit
/// fails, a reversal back to the sender. No lock is held across steps.
pub struct TransferCoordinator<S: Storage> {
    storage: Arc<S>,
    reversal_attempts: usize,
    require_active_sender: bool
}

impl<S: Storage> TransferCoordinator<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            reversal_attempts: DEFAULT_REVERSAL_ATTEMPTS,
            require_active_sender: false
        }
    }

    /// Caps how many times the reversal is tried before the transfer is
    /// declared unreconciled. Values below one are raised to one.
    pub fn with_reversal_attempts(mut self, attempts: usize) -> Self {
        self.reversal_attempts = attempts.max(1);
        self
    }

    /// Makes the debit additionally require an active sender card.
    pub fn with_active_sender_check(mut self, enabled: bool) -> Self {
        self.require_active_sender = enabled;
        self
    }

    /// Runs one transfer to a terminal outcome. Never fails past this call:
    /// every error is folded into the returned `TransferResult`.
    pub async fn execute(&self, from: &str, to: &str, amount: f64) -> TransferResult {
        debug!(from, to, amount, state = %TransferState::Validating, "Transfer state");

        let request = match validate(from, to, amount) {
            Ok(request) => request,
            Err(rejection) => {
                warn!(from, to, amount, "Transfer rejected: {rejection}");
                return TransferResult::Declined { reason: rejection.into() }
            }
        };

        self.run(&request).await
    }

    async fn run(&self, request: &TransferRequest) -> TransferResult {
        let transfer_id = TransferId::new();
        let posted_at = Utc::now();
        let mut step = Step::Debit;

        loop {
            debug!(transfer_id = %transfer_id, state = %step.state(), "Transfer state");

            step = match step {
                Step::Debit => self.debit(transfer_id, request, posted_at).await,
                Step::Credit { sender_balance } => self.credit(transfer_id, request, posted_at, sender_balance).await,
                Step::Compensate { cause } => self.compensate(transfer_id, request, cause).await,
                Step::Finish(result) => {
                    log_outcome(transfer_id, request, &result);
                    return result
                }
            };
        }
    }

    async fn debit(&self, transfer_id: TransferId, request: &TransferRequest, posted_at: DateTime<Utc>) -> Step {
        let mut guard = Guard::sufficient_funds(request.amount);

        if self.require_active_sender {
            guard = guard.and_active();
        }

        let entry = LedgerEntry::debit(transfer_id, request.amount, posted_at);

        match self.storage.conditional_update(&request.from, guard, entry).await {
            Ok(Some(sender)) => Step::Credit { sender_balance: sender.balance() },
            Ok(None) => Step::Finish(TransferResult::Declined { reason: self.classify_refused_debit(request).await }),
            Err(error) => Step::Finish(TransferResult::Declined { reason: error.into() })
        }
    }

    /// The store only reports that the guard failed; a read of the sender
    /// tells the caller why. The read is not atomic with the refused debit,
    /// so a balance that covers the amount again means a credit landed in
    /// between.
    async fn classify_refused_debit(&self, request: &TransferRequest) -> TransferError {
        match self.storage.fetch(&request.from).await {
            Ok(None) => TransferError::account_not_found(&request.from),
            Ok(Some(sender)) if self.require_active_sender && sender.status != CardStatus::Active => {
                TransferError::AccountBlocked { account_id: sender.account_id }
            }
            Ok(Some(sender)) if sender.balance() >= request.amount => {
                TransferError::ConcurrentUpdate { account_id: sender.account_id }
            }
            Ok(Some(sender)) => TransferError::InsufficientFunds {
                account_id: sender.account_id.clone(),
                requested: request.amount,
                available: sender.balance()
            },
            Err(error) => error.into()
        }
    }

    async fn credit(&self, transfer_id: TransferId, request: &TransferRequest, posted_at: DateTime<Utc>, sender_balance: Monetary) -> Step {
        let entry = LedgerEntry::credit(transfer_id, request.amount, posted_at);

        match self.storage.unconditional_update(&request.to, entry).await {
            Ok(Some(_)) => Step::Finish(TransferResult::Committed { transfer_id, new_sender_balance: sender_balance }),
            Ok(None) => Step::Compensate { cause: TransferError::account_not_found(&request.to) },
            Err(error) => Step::Compensate { cause: error.into() }
        }
    }

    async fn compensate(&self, transfer_id: TransferId, request: &TransferRequest, cause: TransferError) -> Step {
        let note = match cause {
            TransferError::AccountNotFound { .. } => NOTE_RECEIVER_NOT_FOUND,
            _ => NOTE_CREDIT_FAILED
        };

        let entry = LedgerEntry::reversal(transfer_id, request.amount, note);
        let mut last_error = String::new();

        for attempt in 1..=self.reversal_attempts {
            match self.storage.unconditional_update(&request.from, entry.clone()).await {
                Ok(Some(_)) => return Step::Finish(TransferResult::Reverted { transfer_id, reason: cause }),
                Ok(None) => last_error = format!("sender account [{}] no longer exists", request.from),
                Err(error) => last_error = error.to_string()
            }

            warn!(transfer_id = %transfer_id, attempt, "Reversal attempt failed: {last_error}");
        }

        Step::Finish(TransferResult::Unreconciled {
            transfer_id,
            reason: TransferError::ReversalFailed {
                account_id: request.from.clone(),
                amount: request.amount,
                attempts: self.reversal_attempts,
                last_error,
                cause: Box::new(cause)
            }
        })
    }
}

fn log_outcome(transfer_id: TransferId, request: &TransferRequest, result: &TransferResult) {
    let TransferRequest { from, to, amount } = request;

    match result {
        TransferResult::Committed { new_sender_balance, .. } => {
            info!(transfer_id = %transfer_id, from = %from, to = %to, amount = %amount, "Transfer committed, sender balance [{new_sender_balance}]");
        }
        TransferResult::Declined { reason } => {
            warn!(transfer_id = %transfer_id, from = %from, to = %to, amount = %amount, "Transfer declined: {reason}");
        }
        TransferResult::Reverted { reason, .. } => {
            warn!(transfer_id = %transfer_id, from = %from, to = %to, amount = %amount, "Transfer reverted: {reason}");
        }
        TransferResult::Unreconciled { reason, .. } => {
            error!(transfer_id = %transfer_id, from = %from, to = %to, amount = %amount, "TRANSFER UNRECONCILED: {reason}");
        }
    }
}
