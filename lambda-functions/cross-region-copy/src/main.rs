use cross_region_copy::{AwsRdsRegion, CopyConfig, CrossRegionCopyService, Request, Response};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn function_handler(
    _event: LambdaEvent<Request>,
    service: &CrossRegionCopyService<AwsRdsRegion>,
) -> Result<Response, Error> {
    Ok(service.handle().await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = CopyConfig::from_env();
    let source = AwsRdsRegion::connect(&config.source_region).await;
    let dr = AwsRdsRegion::connect(&config.dr_region).await;
    let service = CrossRegionCopyService::new(source, dr, config);

    run(service_fn(|event| function_handler(event, &service))).await
}
