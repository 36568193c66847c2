use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use snapshot_restorer::{RdsSnapshotRestorer, RestoreConfig, RestoreResult, RestoreService};

async fn function_handler(
    service: &RestoreService<RdsSnapshotRestorer>,
    event: LambdaEvent<Value>,
) -> Result<RestoreResult, Error> {
    Ok(service.handle_payload(event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let service = RestoreService::new(
        RdsSnapshotRestorer::new(sdk_config),
        RestoreConfig::from_env(),
    );

    run(service_fn(|event| function_handler(&service, event))).await
}
