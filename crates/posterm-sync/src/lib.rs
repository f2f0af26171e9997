pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::SyncClient;
pub use error::SyncError;
pub use types::{SyncPayload, TransactionAck};
