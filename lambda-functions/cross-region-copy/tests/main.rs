use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cross_region_copy::error::Result;
use cross_region_copy::{
    CopyConfig, CopyError, CrossRegionCopyService, Request, Response, SnapshotRecord,
    SnapshotRegion,
};
use lambda_runtime::{Context, LambdaEvent};
use mockall::mock;
use serde_json::json;

mock! {
    pub Region {}

    #[async_trait]
    impl SnapshotRegion for Region {
        async fn list_manual_snapshots(&self) -> Result<Vec<SnapshotRecord>>;
        async fn snapshot_exists(&self, snapshot_id: &str) -> Result<bool>;
        async fn copy_snapshot(&self, source_arn: &str, target_id: &str) -> Result<()>;
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
}

fn snapshot(identifier: &str, instance_id: &str, created_at: DateTime<Utc>) -> SnapshotRecord {
    SnapshotRecord {
        identifier: identifier.to_string(),
        arn: format!("arn:aws:rds:us-east-1:123456789012:snapshot:{}", identifier),
        instance_id: instance_id.to_string(),
        created_at,
    }
}

fn source_with(snapshots: Vec<SnapshotRecord>) -> MockRegion {
    let mut source = MockRegion::new();
    source
        .expect_list_manual_snapshots()
        .times(1)
        .return_once(move || Ok(snapshots));
    source.expect_snapshot_exists().times(0);
    source.expect_copy_snapshot().times(0);
    source
}

fn body_message(response: &Response) -> String {
    serde_json::from_str(&response.body).unwrap()
}

#[tokio::test]
async fn test_copies_latest_snapshot_per_instance() {
    let source = source_with(vec![
        snapshot("db-1-backup-2024-01-15-08-00", "db-1", at(8, 0)),
        snapshot("db-2-backup-2024-01-15-09-00", "db-2", at(9, 0)),
        snapshot("db-1-backup-2024-01-15-10-00", "db-1", at(10, 0)),
    ]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists()
        .times(2)
        .returning(|_| Ok(false));
    dr.expect_copy_snapshot()
        .times(1)
        .withf(|source_arn, target_id| {
            source_arn.ends_with(":snapshot:db-1-backup-2024-01-15-10-00")
                && target_id == "dr-copy-db-1-backup-2024-01-15-10-00"
        })
        .returning(|_, _| Ok(()));
    dr.expect_copy_snapshot()
        .times(1)
        .withf(|_, target_id| target_id == "dr-copy-db-2-backup-2024-01-15-09-00")
        .returning(|_, _| Ok(()));

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let report = service.run_copy().await.unwrap();

    assert_eq!(
        report.copied,
        vec![
            "dr-copy-db-1-backup-2024-01-15-10-00".to_string(),
            "dr-copy-db-2-backup-2024-01-15-09-00".to_string(),
        ]
    );
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn test_existing_dr_copy_is_skipped_and_not_counted() {
    let source = source_with(vec![
        snapshot("db-1-snap", "db-1", at(10, 0)),
        snapshot("db-2-snap", "db-2", at(10, 0)),
    ]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists()
        .times(2)
        .returning(|target_id| Ok(target_id == "dr-copy-db-1-snap"));
    dr.expect_copy_snapshot()
        .times(1)
        .withf(|_, target_id| target_id == "dr-copy-db-2-snap")
        .returning(|_, _| Ok(()));

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let response = service.handle().await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        body_message(&response),
        "Cross-region copy completed. Copied 1 snapshots."
    );
}

#[tokio::test]
async fn test_all_present_copies_nothing() {
    let source = source_with(vec![snapshot("db-1-snap", "db-1", at(10, 0))]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().returning(|_| Ok(true));
    dr.expect_copy_snapshot().times(0);

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let report = service.run_copy().await.unwrap();

    assert!(report.copied.is_empty());
    assert_eq!(report.skipped, vec!["dr-copy-db-1-snap".to_string()]);
}

#[tokio::test]
async fn test_no_manual_snapshots() {
    let source = source_with(Vec::new());

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().times(0);
    dr.expect_copy_snapshot().times(0);

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let response = service.handle().await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.body,
        "\"Cross-region copy completed. Copied 0 snapshots.\""
    );
}

#[tokio::test]
async fn test_tied_snapshots_copy_first_listed() {
    let source = source_with(vec![
        snapshot("db-1-first", "db-1", at(10, 30)),
        snapshot("db-1-second", "db-1", at(10, 30)),
    ]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().returning(|_| Ok(false));
    dr.expect_copy_snapshot()
        .times(1)
        .withf(|_, target_id| target_id == "dr-copy-db-1-first")
        .returning(|_, _| Ok(()));

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let report = service.run_copy().await.unwrap();

    assert_eq!(report.copied, vec!["dr-copy-db-1-first".to_string()]);
}

#[tokio::test]
async fn test_lookup_error_aborts_instead_of_copying() {
    let source = source_with(vec![snapshot("db-1-snap", "db-1", at(10, 0))]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().times(1).returning(|_| {
        Err(CopyError::Provider {
            operation: "DescribeDBSnapshots",
            region: "us-west-2".to_string(),
            message: "connection reset".to_string(),
        })
    });
    dr.expect_copy_snapshot().times(0);

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let response = service.handle().await;

    assert_eq!(response.status_code, 500);
    assert_eq!(
        body_message(&response),
        "Error: DescribeDBSnapshots failed in us-west-2: connection reset"
    );
}

#[tokio::test]
async fn test_copy_failure_returns_500() {
    let source = source_with(vec![
        snapshot("db-1-snap", "db-1", at(10, 0)),
        snapshot("db-2-snap", "db-2", at(10, 0)),
    ]);

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().times(1).returning(|_| Ok(false));
    dr.expect_copy_snapshot().times(1).returning(|_, _| {
        Err(CopyError::Provider {
            operation: "CopyDBSnapshot",
            region: "us-west-2".to_string(),
            message: "SnapshotQuotaExceeded".to_string(),
        })
    });

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let response = service.handle().await;

    assert_eq!(response.status_code, 500);
    assert!(body_message(&response).contains("SnapshotQuotaExceeded"));
}

#[tokio::test]
async fn test_listing_failure_returns_500() {
    let mut source = MockRegion::new();
    source.expect_list_manual_snapshots().returning(|| {
        Err(CopyError::Provider {
            operation: "DescribeDBSnapshots",
            region: "us-east-1".to_string(),
            message: "AccessDenied".to_string(),
        })
    });

    let mut dr = MockRegion::new();
    dr.expect_snapshot_exists().times(0);
    dr.expect_copy_snapshot().times(0);

    let service = CrossRegionCopyService::new(source, dr, CopyConfig::default());
    let response = service.handle().await;

    assert_eq!(response.status_code, 500);
    assert_eq!(
        body_message(&response),
        "Error: DescribeDBSnapshots failed in us-east-1: AccessDenied"
    );
}

#[test]
fn test_same_region_config_returns_500_without_calls() {
    let mut source = MockRegion::new();
    source.expect_list_manual_snapshots().times(0);
    let mut dr = MockRegion::new();
    dr.expect_copy_snapshot().times(0);

    let config = CopyConfig::builder()
        .source_region("us-east-1")
        .dr_region("us-east-1")
        .build();
    let service = CrossRegionCopyService::new(source, dr, config);
    let response = tokio_test::block_on(service.handle());

    assert_eq!(response.status_code, 500);
    assert!(body_message(&response).contains("DR region must differ"));
}

#[test]
fn test_lambda_event_structure() {
    let event_json = json!({
        "version": "0",
        "source": "aws.events",
        "detail-type": "Scheduled Event",
        "detail": {}
    });

    let event = LambdaEvent {
        payload: serde_json::from_value::<Request>(event_json).unwrap(),
        context: Context::default(),
    };

    assert_eq!(event.payload["detail-type"], "Scheduled Event");
}
