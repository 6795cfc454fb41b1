use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CopyError, Result};

pub const SOURCE_REGION_ENV: &str = "SOURCE_REGION";
pub const DR_REGION_ENV: &str = "DR_REGION";

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

    pub fn default_dr() -> Self {
        Self("us-west-2".to_string())
    }

    // Basic shape check, not a lookup against the published region list
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.contains('-')
    }

    fn from_env_or(var: &str, fallback: fn() -> Self) -> Self {
        std::env::var(var)
            .map(Self::from)
            .unwrap_or_else(|_| fallback())
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

/// Where snapshots are read from and where their DR copies land.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(on(AwsRegion, into))]
pub struct CopyConfig {
    #[builder(default = AwsRegion::default_source())]
    pub source_region: AwsRegion,

    #[builder(default = AwsRegion::default_dr())]
    pub dr_region: AwsRegion,
}

impl CopyConfig {
    /// Reads `SOURCE_REGION` and `DR_REGION`, falling back to
    /// `us-east-1` and `us-west-2`.
    pub fn from_env() -> Self {
        Self {
            source_region: AwsRegion::from_env_or(SOURCE_REGION_ENV, AwsRegion::default_source),
            dr_region: AwsRegion::from_env_or(DR_REGION_ENV, AwsRegion::default_dr),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, region) in [("source", &self.source_region), ("DR", &self.dr_region)] {
            if !region.is_valid() {
                return Err(CopyError::Config(format!(
                    "invalid {} region '{}'",
                    name, region
                )));
            }
        }

        if self.source_region == self.dr_region {
            return Err(CopyError::Config(format!(
                "DR region must differ from source region '{}'",
                self.source_region
            )));
        }

        Ok(())
    }
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
