pub mod auth;
pub mod commands;
pub mod contracts;
pub mod error;
mod ingest;
pub mod matching;
pub mod migrations;
pub mod setup;
pub mod state;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
