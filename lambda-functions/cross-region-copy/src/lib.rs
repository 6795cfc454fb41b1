pub mod config;
pub mod error;
pub mod rds;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, warn};

pub use config::{AwsRegion, CopyConfig};
pub use error::CopyError;
pub use rds::{AwsRdsRegion, SnapshotRecord, SnapshotRegion};

/// The scheduler's event payload carries nothing the copy run reads.
pub type Request = serde_json::Value;

pub const DR_COPY_PREFIX: &str = "dr-copy-";

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

    pub fn failure(err: &CopyError) -> Self {
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

pub fn completion_message(copied: usize) -> String {
    format!("Cross-region copy completed. Copied {} snapshots.", copied)
}

pub fn dr_snapshot_identifier(snapshot_id: &str) -> String {
    format!("{}{}", DR_COPY_PREFIX, snapshot_id)
}

/// Keeps the newest snapshot of each instance. A later entry only replaces
/// the current pick when its create time is strictly greater, so on a tie the
/// earlier entry wins. Instances come out in the order they were first seen.
pub fn latest_per_instance(
    snapshots: impl IntoIterator<Item = SnapshotRecord>,
) -> Vec<SnapshotRecord> {
    let mut latest: Vec<SnapshotRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for snapshot in snapshots {
        match index.get(&snapshot.instance_id) {
            Some(&slot) => {
                if snapshot.created_at > latest[slot].created_at {
                    latest[slot] = snapshot;
                }
            }
            None => {
                index.insert(snapshot.instance_id.clone(), latest.len());
                latest.push(snapshot);
            }
        }
    }

    latest
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    /// Target identifiers of copies started in the DR region
    pub copied: Vec<String>,
    /// Target identifiers that already existed in the DR region
    pub skipped: Vec<String>,
}

pub struct CrossRegionCopyService<R> {
    source: R,
    dr: R,
    config: CopyConfig,
}

impl<R: SnapshotRegion> CrossRegionCopyService<R> {
    pub fn new(source: R, dr: R, config: CopyConfig) -> Self {
        Self { source, dr, config }
    }

    pub async fn run_copy(&self) -> Result<CopyReport, CopyError> {
        self.config.validate()?;

        let snapshots = self.source.list_manual_snapshots().await?;
        let listed = snapshots.len();
        let latest = latest_per_instance(snapshots);

        info!(
            source_region = %self.config.source_region,
            dr_region = %self.config.dr_region,
            listed,
            instances = latest.len(),
            "Selected latest manual snapshots"
        );

        let mut report = CopyReport::default();

        for snapshot in latest {
            let target_id = dr_snapshot_identifier(&snapshot.identifier);

            if self.dr.snapshot_exists(&target_id).await? {
                warn!(
                    instance_id = %snapshot.instance_id,
                    target_snapshot_id = %target_id,
                    "Snapshot already exists in DR region, skipping"
                );
                report.skipped.push(target_id);
                continue;
            }

            self.dr.copy_snapshot(&snapshot.arn, &target_id).await?;
            info!(
                instance_id = %snapshot.instance_id,
                snapshot_id = %snapshot.identifier,
                target_snapshot_id = %target_id,
                "Copying snapshot to DR region"
            );
            report.copied.push(target_id);
        }

        Ok(report)
    }

    pub async fn handle(&self) -> Response {
        match self.run_copy().await {
            Ok(report) => {
                info!(
                    copied = report.copied.len(),
                    skipped = report.skipped.len(),
                    "Cross-region copy completed"
                );
                Response::success(&completion_message(report.copied.len()))
            }
            Err(e) => {
                error!(error = %e, "Cross-region copy failed");
                Response::failure(&e)
            }
        }
    }
}
