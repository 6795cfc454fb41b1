use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rds::{types::DbSnapshot, Client as RdsClient};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::AwsRegion;
use crate::error::{CopyError, Result};

/// A manual snapshot as far as the copy run cares about it.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub identifier: String,
    pub arn: String,
    pub instance_id: String,
    pub created_at: DateTime<Utc>,
}

impl SnapshotRecord {
    /// `None` when RDS has not filled in every field yet, which is the case
    /// for a snapshot that is still being created.
    pub fn from_db_snapshot(snapshot: &DbSnapshot) -> Option<Self> {
        let created = snapshot.snapshot_create_time()?;

        Some(Self {
            identifier: snapshot.db_snapshot_identifier()?.to_string(),
            arn: snapshot.db_snapshot_arn()?.to_string(),
            instance_id: snapshot.db_instance_identifier()?.to_string(),
            created_at: DateTime::from_timestamp(created.secs(), created.subsec_nanos())?,
        })
    }
}

/// RDS control-plane calls made against one region.
#[async_trait]
pub trait SnapshotRegion: Send + Sync {
    /// Manual snapshots owned by the account, public ones excluded.
    async fn list_manual_snapshots(&self) -> Result<Vec<SnapshotRecord>>;

    /// `Ok(false)` only when RDS reports the snapshot as not found.
    async fn snapshot_exists(&self, snapshot_id: &str) -> Result<bool>;

    /// Copies `source_arn` into this region under `target_id`, carrying tags over.
    async fn copy_snapshot(&self, source_arn: &str, target_id: &str) -> Result<()>;
}

pub struct AwsRdsRegion {
    client: RdsClient,
    region: AwsRegion,
}

impl AwsRdsRegion {
    pub fn new(client: RdsClient, region: AwsRegion) -> Self {
        Self { client, region }
    }

    pub async fn connect(region: &AwsRegion) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.as_str().to_string()))
            .load()
            .await;

        Self::new(RdsClient::new(&config), region.clone())
    }
}

#[async_trait]
impl SnapshotRegion for AwsRdsRegion {
    async fn list_manual_snapshots(&self) -> Result<Vec<SnapshotRecord>> {
        let mut snapshots = Vec::new();
        let mut marker = None;

        loop {
            let result = self
                .client
                .describe_db_snapshots()
                .snapshot_type("manual")
                .include_public(false)
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| CopyError::provider("DescribeDBSnapshots", self.region.as_str(), e))?;

            for snapshot in result.db_snapshots() {
                match SnapshotRecord::from_db_snapshot(snapshot) {
                    Some(record) => snapshots.push(record),
                    None => warn!(
                        snapshot_id = snapshot.db_snapshot_identifier().unwrap_or("<unknown>"),
                        status = snapshot.status().unwrap_or("<unknown>"),
                        "Skipping incomplete snapshot"
                    ),
                }
            }

            if result.marker.is_none() {
                break;
            }

            marker = result.marker;
        }

        Ok(snapshots)
    }

    async fn snapshot_exists(&self, snapshot_id: &str) -> Result<bool> {
        let result = self
            .client
            .describe_db_snapshots()
            .db_snapshot_identifier(snapshot_id)
            .send()
            .await;

        match result {
            Ok(output) => Ok(!output.db_snapshots().is_empty()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|err| err.is_db_snapshot_not_found_fault()) =>
            {
                Ok(false)
            }
            Err(e) => Err(CopyError::provider(
                "DescribeDBSnapshots",
                self.region.as_str(),
                e,
            )),
        }
    }

    async fn copy_snapshot(&self, source_arn: &str, target_id: &str) -> Result<()> {
        self.client
            .copy_db_snapshot()
            .source_db_snapshot_identifier(source_arn)
            .target_db_snapshot_identifier(target_id)
            .copy_tags(true)
            .send()
            .await
            .map_err(|e| CopyError::provider("CopyDBSnapshot", self.region.as_str(), e))?;

        Ok(())
    }
}
