use crate::models::TransferInstruction;
use crate::storage::Storage;
use crate::transfer::{TransferCoordinator, TransferResult};
use anyhow::Context;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{spawn_blocking, JoinHandle, JoinSet};
use tracing::{error, info};

/// Count of transfers per terminal outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    pub committed: usize,
    pub declined: usize,
    pub reverted: usize,
    pub unreconciled: usize
}

impl TransferSummary {
    fn record(&mut self, result: &TransferResult) {
        match result {
            TransferResult::Committed { .. } => self.committed += 1,
            TransferResult::Declined { .. } => self.declined += 1,
            TransferResult::Reverted { .. } => self.reverted += 1,
            TransferResult::Unreconciled { .. } => self.unreconciled += 1
        }
    }

    pub fn total(&self) -> usize {
        self.committed + self.declined + self.reverted + self.unreconciled
    }
}

/// Streams transfer instructions from a CSV file through the coordinator.
///
/// Transfers run concurrently up to the configured limit. They are
/// independent sagas, so no ordering between them is implied.
pub struct TransferEngine<S: Storage> {
    coordinator: Arc<TransferCoordinator<S>>,
    backpressure: usize,
    concurrency: usize
}

impl<S: Storage> TransferEngine<S> {
    /// Creates a new engine driving the provided coordinator.
    pub fn new(coordinator: Arc<TransferCoordinator<S>>) -> Self {
        Self {
            coordinator,
            backpressure: 256,
            concurrency: 64
        }
    }

    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs every transfer in the CSV file to a terminal outcome.
    ///
    /// # Errors
    /// Fails before any transfer runs if the file cannot be opened.
    pub async fn run(&self, path: &str) -> anyhow::Result<TransferSummary> {
        let file = File::open(path)
            .with_context(|| format!("Unable to open transfers CSV at path: {path}"))?;
        let (sender, receiver) = mpsc::channel::<TransferInstruction>(self.backpressure);
        let csv_handle = self.spawn_csv_reader(file, sender);
        let summary = self.process_transfers(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        info!(
            committed = summary.committed,
            declined = summary.declined,
            reverted = summary.reverted,
            unreconciled = summary.unreconciled,
            "Processed {} transfers", summary.total()
        );

        Ok(summary)
    }

    fn spawn_csv_reader(&self, file: File, sender: mpsc::Sender<TransferInstruction>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for result in reader.deserialize::<TransferInstruction>() {
                match result {
                    Ok(instruction) => {
                        if sender.blocking_send(instruction).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn process_transfers(&self, mut receiver: mpsc::Receiver<TransferInstruction>) -> TransferSummary {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut summary = TransferSummary::default();

        while let Some(instruction) = receiver.recv().await {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(error) => {
                    error!("Transfer permits closed: {error}");
                    break;
                }
            };

            let coordinator = self.coordinator.clone();

            tasks.spawn(async move {
                let result = coordinator.execute(&instruction.from, &instruction.to, instruction.amount).await;
                drop(permit);
                result
            });

            // Reap finished transfers so results do not pile up on long inputs.
            while let Some(joined) = tasks.try_join_next() {
                match joined {
                    Ok(result) => summary.record(&result),
                    Err(error) => error!("A transfer task did not complete: {error}")
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => summary.record(&result),
                Err(error) => error!("A transfer task did not complete: {error}")
            }
        }

        summary
    }
}
