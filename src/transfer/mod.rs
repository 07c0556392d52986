//! Fund-transfer consistency: validation, the debit/credit/reversal saga,
//! and the outcome taxonomy callers map to their own responses.

mod coordinator;
mod errors;
mod state;
mod validator;

pub use coordinator::{TransferCoordinator, DEFAULT_REVERSAL_ATTEMPTS};
pub use errors::{Rejection, TransferError};
pub use state::{TransferResult, TransferState};
pub use validator::validate;
