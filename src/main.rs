mod engine;
mod models;
mod storage;
mod transfer;
mod types;

use std::fs::File;
use std::io::{stderr, stdout, BufReader, BufWriter, Write};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::TransferEngine;
use crate::storage::AccountStorage;
use crate::transfer::{TransferCoordinator, DEFAULT_REVERSAL_ATTEMPTS};

/// Exit status when any transfer left a sender debited without a credit.
const EXIT_UNRECONCILED: i32 = 2;

const DEFAULT_CONCURRENCY: usize = 64;

/// Queued rows allowed per transfer slot.
const BACKPRESSURE_PER_SLOT: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: Positional arguments are enough for this tool; a richer CLI would move to clap.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: fund-transfer-engine [accounts].csv [transfers].csv [log_level:optional] [require_active:optional] [reversal_attempts:optional] [concurrency:optional] > [output].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        eprintln!("require_active: true or false (default: false)");
        eprintln!("reversal_attempts: at least 1 (default: {DEFAULT_REVERSAL_ATTEMPTS}), concurrency: at least 1 (default: {DEFAULT_CONCURRENCY})");
        exit(1);
    }

    let accounts_path = &args[1];
    let transfers_path = &args[2];
    let log_level = args.get(3)
        .map(|s| parse_log_level(s)).unwrap_or(LevelFilter::ERROR);
    let require_active = args.get(4)
        .map(|s| parse_flag("require_active", s)).unwrap_or(false);
    let reversal_attempts = args.get(5)
        .map(|s| parse_count("reversal_attempts", s, DEFAULT_REVERSAL_ATTEMPTS)).unwrap_or(DEFAULT_REVERSAL_ATTEMPTS);
    let concurrency = args.get(6)
        .map(|s| parse_count("concurrency", s, DEFAULT_CONCURRENCY)).unwrap_or(DEFAULT_CONCURRENCY);

    setup_logging(log_level);

    let storage = Arc::new(AccountStorage::new());
    let accounts_file = File::open(accounts_path)
        .with_context(|| format!("Unable to open accounts CSV at path: {accounts_path}"))?;
    let opened = storage.import_csv(BufReader::new(accounts_file));

    info!("Opened {opened} accounts from {accounts_path}");

    let coordinator = TransferCoordinator::new(storage.clone())
        .with_active_sender_check(require_active)
        .with_reversal_attempts(reversal_attempts);
    let engine = TransferEngine::new(Arc::new(coordinator))
        .with_concurrency(concurrency)
        .with_backpressure(concurrency.saturating_mul(BACKPRESSURE_PER_SLOT));

    info!(require_active, reversal_attempts, concurrency, "Transfer engine configured");

    let timer = Instant::now();
    let summary = engine.run(transfers_path).await?;
    let duration = timer.elapsed();

    info!("Processed transfers in: {duration:?}");

    write_results_to_stdout(&storage)?;

    if summary.unreconciled > 0 {
        error!("{} transfer(s) are unreconciled and require manual reconciliation", summary.unreconciled);
        exit(EXIT_UNRECONCILED);
    }

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn parse_flag(name: &str, value: &str) -> bool {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => {
            eprintln!("Invalid {name} '{value}', defaulting to 'false'");
            false
        }
    }
}

fn parse_count(name: &str, value: &str, default: usize) -> usize {
    match value.parse::<usize>() {
        Ok(count) if count > 0 => count,
        _ => {
            eprintln!("Invalid {name} '{value}', defaulting to '{default}'");
            default
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the account CSV, so logs go to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_results_to_stdout(storage: &AccountStorage) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());
    let mut accounts: Vec<_> = storage.iter().map(|item| item.value().clone()).collect();
    accounts.sort_by(|left, right| left.account_id.cmp(&right.account_id));

    writeln!(output, "account,balance,status,entries")?;

    for account in accounts {
        writeln!(
            output,
            "{},{},{},{}",
            account.account_id,
            account.balance(),
            account.status.as_str(),
            account.entries().len()
        )?;
    }

    output.flush()?;

    Ok(())
}
