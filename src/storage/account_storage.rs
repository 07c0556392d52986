use crate::models::{Account, CardStatus, LedgerEntry};
use crate::storage::{Guard, Storage, StorageError};
use crate::types::{AccountId, Monetary};
use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use dashmap::iter::Iter;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Balance given to an account registered without one.
pub const DEFAULT_OPENING_BALANCE: Monetary = Monetary::from_minor_units(1_000 * 10_000);

#[derive(Debug, Deserialize)]
struct AccountRow {
    account: String,
    balance: Option<Monetary>,
    status: Option<CardStatus>
}

/// In-memory account store.
///
/// Every update holds the shard write lock of its one key for the whole
/// read-check-mutate step, which makes it atomic and serializable per record
/// while updates to unrelated records proceed in parallel.
pub struct AccountStorage {
    accounts: Arc<DashMap<AccountId, Account>>
}

impl AccountStorage {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(DashMap::new())
        }
    }

    /// Registers a new account. Returns `false` without touching the store if
    /// the id is already taken.
    pub fn open(&self, account: Account) -> bool {
        match self.accounts.entry(account.account_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(account);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn contains(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    pub fn snapshot(&self, account_id: &str) -> Option<Account> {
        self.accounts.get(account_id).map(|account| account.value().clone())
    }

    pub fn iter(&self) -> Iter<'_, AccountId, Account> {
        self.accounts.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Seeds the store from `account,balance,status` CSV rows and returns the
    /// number of accounts opened. Bad rows are logged and skipped.
    pub fn import_csv<R: Read>(&self, source: R) -> usize {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let mut opened = 0;

        for result in reader.deserialize::<AccountRow>() {
            let row = match result {
                Ok(row) => row,
                Err(error) => {
                    error!("Account CSV deserialization error: {error}");
                    continue;
                }
            };

            if row.account.is_empty() {
                error!("Account CSV row without an account id was skipped");
                continue;
            }

            let balance = row.balance.unwrap_or(DEFAULT_OPENING_BALANCE);
            let account = match Account::with_balance(row.account, balance) {
                Ok(account) => account.with_status(row.status.unwrap_or_default()),
                Err(error) => {
                    error!("{error}");
                    continue;
                }
            };

            let account_id = account.account_id.clone();

            if self.open(account) {
                debug!("Account [{account_id}] opened with balance [{balance}]");
                opened += 1;
            } else {
                warn!("Account [{account_id}] already exists, duplicate row skipped");
            }
        }

        opened
    }
}

impl Default for AccountStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for AccountStorage {
    async fn fetch(&self, account_id: &str) -> Result<Option<Account>, StorageError> {
        Ok(self.snapshot(account_id))
    }

    async fn conditional_update(&self, account_id: &str, guard: Guard, entry: LedgerEntry) -> Result<Option<Account>, StorageError> {
        let Some(mut account) = self.accounts.get_mut(account_id) else {
            return Ok(None)
        };

        if !guard.admits(account.value()) {
            return Ok(None)
        }

        account.value_mut().post(entry)?;

        Ok(Some(account.value().clone()))
    }

    async fn unconditional_update(&self, account_id: &str, entry: LedgerEntry) -> Result<Option<Account>, StorageError> {
        let Some(mut account) = self.accounts.get_mut(account_id) else {
            return Ok(None)
        };

        account.value_mut().post(entry)?;

        Ok(Some(account.value().clone()))
    }
}
