use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rds_backup::{AwsRdsClient, BackupConfig, RdsBackupService, Request, Response};

async fn function_handler(
    _event: LambdaEvent<Request>,
    service: &RdsBackupService<AwsRdsClient>,
) -> Result<Response, Error> {
    Ok(service.handle(Utc::now()).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = BackupConfig::from_env();
    let client = AwsRdsClient::for_region(&config.source_region).await;
    let service = RdsBackupService::new(client, config);

    run(service_fn(|event| function_handler(event, &service))).await
}
