use crate::models::TransferRequest;
use crate::transfer::Rejection;
use crate::types::{Monetary, MonetaryError};

/// Checks a raw transfer before anything touches storage.
///
/// Ids must be non-empty and distinct. The amount must be finite and still
/// strictly positive after rounding to the monetary precision.
pub fn validate(from: &str, to: &str, amount: f64) -> Result<TransferRequest, Rejection> {
    if from.trim().is_empty() {
        return Err(Rejection::MissingSender)
    }

    if to.trim().is_empty() {
        return Err(Rejection::MissingReceiver)
    }

    if from == to {
        return Err(Rejection::SelfTransfer)
    }

    if !amount.is_finite() {
        return Err(Rejection::NonFiniteAmount)
    }

    if amount <= 0.0 {
        return Err(Rejection::NonPositiveAmount)
    }

    let amount = Monetary::from_f64(amount).map_err(|error| match error {
        MonetaryError::NotFinite => Rejection::NonFiniteAmount,
        MonetaryError::InvalidFormat(_) | MonetaryError::Overflow => Rejection::AmountOutOfRange
    })?;

    if !amount.is_positive() {
        return Err(Rejection::NonPositiveAmount)
    }

    Ok(TransferRequest {
        from: from.to_string(),
        to: to.to_string(),
        amount
    })
}
