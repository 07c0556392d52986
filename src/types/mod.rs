mod errors;
mod monetary;
mod transfer_id;

pub use errors::MonetaryError;
pub use monetary::Monetary;
pub use transfer_id::TransferId;

pub type AccountId = String;
