use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonetaryError {
    #[error("Monetary error: {0}")]
    InvalidFormat(String),
    #[error("Monetary error: Value is not a finite number")]
    NotFinite,
    #[error("Monetary error: Overflow")]
    Overflow
}
