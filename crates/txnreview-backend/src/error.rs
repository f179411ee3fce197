//! Error types for txnreview-backend

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Fixture not found: {path}")]
    FixtureNotFound { path: String },

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(#[from] serde_json::Error),
}
