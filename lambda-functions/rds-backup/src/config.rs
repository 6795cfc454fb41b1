use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BackupError, Result};

pub const SOURCE_REGION_ENV: &str = "SOURCE_REGION";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwsRegion(String);

impl AwsRegion {
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn default_source() -> Self {
        Self("us-east-1".to_string())
    }

    // Basic shape check, not a lookup against the published region list
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.contains('-')
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self::default_source()
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AwsRegion {
    fn from(region: &str) -> Self {
        Self::new(region)
    }
}

impl From<String> for AwsRegion {
    fn from(region: String) -> Self {
        Self(region)
    }
}

/// Region settings for one backup run.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(on(AwsRegion, into))]
pub struct BackupConfig {
    #[builder(default = AwsRegion::default_source())]
    pub source_region: AwsRegion,
}

impl BackupConfig {
    /// Reads `SOURCE_REGION`, falling back to `us-east-1`.
    pub fn from_env() -> Self {
        let source_region = std::env::var(SOURCE_REGION_ENV)
            .map(AwsRegion::from)
            .unwrap_or_else(|_| AwsRegion::default_source());

        Self { source_region }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.source_region.is_valid() {
            return Err(BackupError::Config(format!(
                "invalid source region '{}'",
                self.source_region
            )));
        }
        Ok(())
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
