mod async_engine;

pub use async_engine::TransferEngine;
#[cfg(test)]
pub use async_engine::TransferSummary;
