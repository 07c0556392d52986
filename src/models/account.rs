use crate::models::errors::AccountError;
use crate::models::{CardStatus, EntryKind, LedgerEntry};
use crate::types::{AccountId, Monetary};

/// Represents the state of a single account record.
///
/// The balance never goes below zero and the ledger is append-only: the only
/// way to change either is [`Account::post`], which does both together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The unique, immutable identifier for the account.
    pub account_id: AccountId,
    /// Current balance, never negative.
    balance: Monetary,
    /// Status of the account's payment card.
    pub status: CardStatus,
    /// Every balance mutation in the order it was applied.
    entries: Vec<LedgerEntry>
}

impl Account {
    /// Creates a new, empty and active account.
    pub fn new(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
            balance: Monetary::ZERO,
            status: CardStatus::Active,
            entries: Vec::new()
        }
    }

    /// Creates an active account holding an opening balance.
    ///
    /// # Errors
    /// Returns `AccountError::NegativeBalance` if `balance` is below zero.
    pub fn with_balance(account_id: impl Into<AccountId>, balance: Monetary) -> Result<Self, AccountError> {
        let account_id = account_id.into();

        if balance.is_negative() {
            return Err(AccountError::negative_balance(&account_id, balance))
        }

        Ok(Self {
            balance,
            ..Self::new(account_id)
        })
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    pub fn balance(&self) -> Monetary {
        self.balance
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Applies a ledger entry to the balance and appends it to the history.
    ///
    /// Either both happen or neither does, so the ledger always accounts for
    /// the balance exactly.
    ///
    /// # Errors
    /// Returns `AccountError` if:
    /// - The entry amount is not positive.
    /// - A debit would leave the balance negative.
    /// - The new balance overflows.
    pub fn post(&mut self, entry: LedgerEntry) -> Result<Monetary, AccountError> {
        if !entry.amount.is_positive() {
            return Err(AccountError::non_positive_amount(self, &entry))
        }

        let balance = match entry.kind {
            EntryKind::Debit => {
                if self.balance < entry.amount {
                    return Err(AccountError::insufficient_funds(self, &entry))
                }

                self.balance.checked_sub(entry.amount)
            }
            EntryKind::Credit | EntryKind::Reversal => self.balance.checked_add(entry.amount)
        }
        .ok_or_else(|| AccountError::overflow(self, &entry))?;

        self.balance = balance;
        self.entries.push(entry);

        Ok(balance)
    }
}
