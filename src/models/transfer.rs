use serde::Deserialize;

use crate::types::{AccountId, Monetary};

/// A transfer as submitted by a caller, before any validation.
///
/// The amount stays a raw float here so that NaN, infinities and
/// non-positive values reach the validator instead of failing in parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferInstruction {
    pub from: String,
    pub to: String,
    pub amount: f64
}

/// A validated transfer: distinct, non-empty accounts and a strictly
/// positive amount. Only the validator constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Monetary
}
