use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rds::{types::Tag, Client as RdsClient};
use tracing::warn;

use crate::config::AwsRegion;
use crate::error::{BackupError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTag {
    pub key: String,
    pub value: String,
}

impl SnapshotTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// RDS control-plane calls the backup run depends on.
#[async_trait]
pub trait SnapshotApi: Send + Sync {
    /// Identifiers of every DB instance visible in the region.
    async fn list_instance_ids(&self) -> Result<Vec<String>>;

    /// Starts a manual snapshot and returns its ARN.
    async fn create_snapshot(&self, instance_id: &str, snapshot_id: &str) -> Result<String>;

    async fn add_tags(&self, resource_arn: &str, tags: Vec<SnapshotTag>) -> Result<()>;
}

pub struct AwsRdsClient {
    client: RdsClient,
}

impl AwsRdsClient {
    pub fn new(client: RdsClient) -> Self {
        Self { client }
    }

    pub async fn for_region(region: &AwsRegion) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.as_str().to_string()))
            .load()
            .await;

        Self::new(RdsClient::new(&config))
    }
}

#[async_trait]
impl SnapshotApi for AwsRdsClient {
    async fn list_instance_ids(&self) -> Result<Vec<String>> {
        let mut instance_ids = Vec::new();
        let mut marker = None;

        loop {
            let result = self
                .client
                .describe_db_instances()
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| BackupError::provider("DescribeDBInstances", e))?;

            for instance in result.db_instances() {
                match instance.db_instance_identifier() {
                    Some(id) => instance_ids.push(id.to_string()),
                    None => warn!("Skipping DB instance without an identifier"),
                }
            }

            if result.marker.is_none() {
                break;
            }

            marker = result.marker;
        }

        Ok(instance_ids)
    }

    async fn create_snapshot(&self, instance_id: &str, snapshot_id: &str) -> Result<String> {
        let result = self
            .client
            .create_db_snapshot()
            .db_snapshot_identifier(snapshot_id)
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|e| BackupError::provider("CreateDBSnapshot", e))?;

        result
            .db_snapshot()
            .and_then(|snapshot| snapshot.db_snapshot_arn())
            .map(str::to_string)
            .ok_or(BackupError::MissingField {
                operation: "CreateDBSnapshot",
                field: "DBSnapshotArn",
            })
    }

    async fn add_tags(&self, resource_arn: &str, tags: Vec<SnapshotTag>) -> Result<()> {
        let tags = tags
            .into_iter()
            .map(|tag| Tag::builder().key(tag.key).value(tag.value).build())
            .collect();

        self.client
            .add_tags_to_resource()
            .resource_name(resource_arn)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| BackupError::provider("AddTagsToResource", e))?;

        Ok(())
    }
}
