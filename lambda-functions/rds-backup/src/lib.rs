pub mod config;
pub mod error;
pub mod rds;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub use config::{AwsRegion, BackupConfig};
pub use error::BackupError;
pub use rds::{AwsRdsClient, SnapshotApi, SnapshotTag};

/// The scheduler's event payload carries nothing the backup run reads.
pub type Request = serde_json::Value;

pub const SUCCESS_MESSAGE: &str = "RDS backup completed successfully";

pub const BACKUP_TAGS: [(&str, &str); 3] = [
    ("Environment", "Production"),
    ("BackupType", "Automated"),
    ("Project", "ProjectNova"),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn success(message: &str) -> Self {
        Self {
            status_code: 200,
            body: encode_message(message),
        }
    }

    pub fn failure(err: &BackupError) -> Self {
        Self {
            status_code: 500,
            body: encode_message(&format!("Error: {}", err)),
        }
    }
}

// The body is a JSON string literal, not a JSON object
fn encode_message(message: &str) -> String {
    serde_json::Value::String(message.to_string()).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSnapshot {
    pub instance_id: String,
    pub snapshot_id: String,
    pub snapshot_arn: String,
}

pub fn snapshot_identifier(instance_id: &str, at: DateTime<Utc>) -> String {
    format!("{}-backup-{}", instance_id, at.format("%Y-%m-%d-%H-%M"))
}

pub fn backup_tags() -> Vec<SnapshotTag> {
    BACKUP_TAGS
        .iter()
        .map(|(key, value)| SnapshotTag::new(*key, *value))
        .collect()
}

pub struct RdsBackupService<A> {
    api: A,
    config: BackupConfig,
}

impl<A: SnapshotApi> RdsBackupService<A> {
    pub fn new(api: A, config: BackupConfig) -> Self {
        Self { api, config }
    }

    /// Snapshots and tags every instance in the source region. The first
    /// failing call aborts the remaining instances.
    pub async fn run_backup(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CreatedSnapshot>, BackupError> {
        self.config.validate()?;

        let instance_ids = self.api.list_instance_ids().await?;
        info!(
            region = %self.config.source_region,
            instances = instance_ids.len(),
            "Starting RDS backup"
        );

        let mut created = Vec::with_capacity(instance_ids.len());

        for instance_id in instance_ids {
            let snapshot_id = snapshot_identifier(&instance_id, now);

            let snapshot_arn = self.api.create_snapshot(&instance_id, &snapshot_id).await?;
            info!(
                instance_id = %instance_id,
                snapshot_id = %snapshot_id,
                "Created snapshot"
            );

            self.api.add_tags(&snapshot_arn, backup_tags()).await?;

            created.push(CreatedSnapshot {
                instance_id,
                snapshot_id,
                snapshot_arn,
            });
        }

        Ok(created)
    }

    pub async fn handle(&self, now: DateTime<Utc>) -> Response {
        match self.run_backup(now).await {
            Ok(created) => {
                info!(snapshots = created.len(), "RDS backup completed");
                Response::success(SUCCESS_MESSAGE)
            }
            Err(e) => {
                error!(error = %e, "RDS backup failed");
                Response::failure(&e)
            }
        }
    }
}
