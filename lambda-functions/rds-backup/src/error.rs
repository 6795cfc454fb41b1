//! Error types for the backup run

use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum BackupError {
    /// An RDS control-plane call failed
    #[error("{operation} failed: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    /// RDS answered but left out a field the run depends on
    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackupError {
    /// Keeps the service's error code and message; the raw HTTP exchange only
    /// goes to the log.
    pub fn provider<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        error!(operation, error = %DisplayErrorContext(&err), "RDS call failed");

        Self::Provider {
            operation,
            message: summarize(&err),
        }
    }
}

fn summarize<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        _ => err.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
