//! Error types for the cross-region copy run

use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum CopyError {
    /// An RDS control-plane call failed in either region
    #[error("{operation} failed in {region}: {message}")]
    Provider {
        operation: &'static str,
        region: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CopyError {
    /// Keeps the service's error code and message; the raw HTTP exchange only
    /// goes to the log.
    pub fn provider<E, R>(operation: &'static str, region: &str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        error!(
            operation,
            region,
            error = %DisplayErrorContext(&err),
            "RDS call failed"
        );

        Self::Provider {
            operation,
            region: region.to_string(),
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

pub type Result<T> = std::result::Result<T, CopyError>;
