pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{RemoteStatusClient, RestClient};
pub use error::ClientError;
pub use types::RemoteResponse;
