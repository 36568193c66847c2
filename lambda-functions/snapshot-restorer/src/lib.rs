//! Restores an RDS instance from the snapshot an AWS Backup job just
//! completed, tagging the copy with where it came from.

pub mod arn;
pub mod config;
pub mod error;
pub mod event;
pub mod response;
pub mod restore;

pub use arn::ResourceArn;
pub use config::RestoreConfig;
pub use error::RestoreError;
pub use event::{BackupDetail, NotificationEvent};
pub use response::{Failure, Rejection, RestoreResult, RestoreStarted, SuccessCheck};
pub use restore::{
    ProvenanceTag, RdsSnapshotRestorer, RestoreOutput, RestoreRequest, SnapshotRestorer,
};

use serde_json::Value;
use tracing::{error, info, warn};

pub struct RestoreService<R> {
    restorer: R,
    config: RestoreConfig,
}

impl<R: SnapshotRestorer> RestoreService<R> {
    pub fn new(restorer: R, config: RestoreConfig) -> Self {
        Self { restorer, config }
    }

    /// Validates the event and derives the restore request without calling RDS.
    pub fn build_request(
        &self,
        event: &NotificationEvent,
    ) -> Result<RestoreRequest, RestoreError> {
        event.validate()?;

        let snapshot = event.snapshot_arn()?;
        let resource_arn = event.resource_arn()?;
        let region = event.region()?;

        event.ensure_completed()?;

        let source = ResourceArn::parse(resource_arn)?;
        let subnet_group_name = self.config.subnet_group_name()?;

        Ok(RestoreRequest::builder()
            .target_identifier(source.target_identifier())
            .snapshot_identifier(snapshot)
            .region(region)
            .subnet_group_name(subnet_group_name)
            .tags(source.provenance_tags())
            .build())
    }

    async fn try_restore(
        &self,
        event: &NotificationEvent,
    ) -> Result<RestoreResult, RestoreError> {
        let request = self.build_request(event)?;
        let output = self.restorer.restore(&request).await?;

        info!(
            "Restore of {} from {} returned status {}",
            request.target_identifier, request.snapshot_identifier, output.http_status
        );

        Ok(RestoreResult::from_output(
            output,
            &request.snapshot_identifier,
            &request.target_identifier,
            self.config.success_check,
        ))
    }

    /// Runs one invocation on an already typed event.
    pub async fn handle_event(&self, event: &NotificationEvent) -> RestoreResult {
        match self.try_restore(event).await {
            Ok(result) => result,
            Err(e) => fold_error(&e),
        }
    }

    /// Runs one invocation on the raw payload handed over by the runtime.
    /// Every failure, including a payload of the wrong shape, is folded into
    /// the returned result.
    pub async fn handle_payload(&self, payload: Value) -> RestoreResult {
        match NotificationEvent::try_from(payload) {
            Ok(event) => self.handle_event(&event).await,
            Err(e) => fold_error(&e),
        }
    }
}

fn fold_error(e: &RestoreError) -> RestoreResult {
    if e.is_rejection() {
        warn!("Rejected event: {}", e);
    } else {
        error!("Error occurred: {}", e);
    }
    RestoreResult::from_error(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingRestorer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SnapshotRestorer for CountingRestorer {
        async fn restore(&self, request: &RestoreRequest) -> Result<RestoreOutput, RestoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RestoreOutput {
                http_status: 200,
                db_instance_arn: Some(format!(
                    "arn:aws:rds:{}:123456789012:db:{}",
                    request.region, request.target_identifier
                )),
            })
        }
    }

    fn service() -> (RestoreService<CountingRestorer>, Arc<AtomicUsize>) {
        counted(RestoreConfig::new("restore-subnets"))
    }

    fn counted(config: RestoreConfig) -> (RestoreService<CountingRestorer>, Arc<AtomicUsize>) {
        let restorer = CountingRestorer::default();
        let calls = Arc::clone(&restorer.calls);
        (RestoreService::new(restorer, config), calls)
    }

    fn payload(status: &str) -> Value {
        json!({
            "source": "aws.backup",
            "detail-type": "Recovery Point State Change",
            "region": "us-east-1",
            "resources": ["arn:aws:rds:us-east-1:123456789012:snapshot:awsbackup:job-1"],
            "detail": {
                "status": status,
                "resourceArn": "arn:aws:rds:us-east-1:123456789012:db:prod-db-1"
            }
        })
    }

    fn event(status: &str) -> NotificationEvent {
        serde_json::from_value(payload(status)).unwrap()
    }

    #[test]
    fn test_build_request() {
        let (service, _) = service();
        let request = service.build_request(&event("COMPLETED")).unwrap();
        assert_eq!(request.target_identifier, "copy-of-prod-db-1");
        assert_eq!(
            request.snapshot_identifier,
            "arn:aws:rds:us-east-1:123456789012:snapshot:awsbackup:job-1"
        );
        assert_eq!(request.region, "us-east-1");
        assert_eq!(request.subnet_group_name, "restore-subnets");
        assert_eq!(request.tags.len(), 3);
        assert!(!request.publicly_accessible);
    }

    #[tokio::test]
    async fn test_completed_event_restores_once() {
        let (service, calls) = service();
        let result = service.handle_event(&event("COMPLETED")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.status_code(), 200);
    }

    #[tokio::test]
    async fn test_pending_event_never_calls_restorer() {
        let (service, calls) = service();
        let result = service.handle_event(&event("PENDING")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result,
            RestoreResult::Rejected(Rejection {
                status_code: 400,
                message: "Backup snapshot is not in a COMPLETED state.".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_subnet_group_fails_before_call() {
        let (service, calls) = counted(RestoreConfig::default());
        let result = service.handle_event(&event("COMPLETED")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.status_code(), 500);
        assert!(matches!(result, RestoreResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_raw_payload_restores_once() {
        let (service, calls) = service();
        let result = service.handle_payload(payload("COMPLETED")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.status_code(), 200);
    }

    #[tokio::test]
    async fn test_oddly_typed_foreign_payload_is_rejected() {
        let (service, calls) = service();
        let result = service
            .handle_payload(json!({
                "source": "aws.health",
                "detail-type": "AWS Health Event",
                "detail": { "status": { "code": "open" } }
            }))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result,
            RestoreResult::Rejected(Rejection {
                status_code: 400,
                message: "Invalid event source or detail type.".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_pending_event_without_resources_fails_on_extraction() {
        let (service, calls) = service();
        let mut pending = payload("PENDING");
        pending["resources"] = json!([]);

        let result = service.handle_payload(pending).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, RestoreResult::Failed(_)));
        assert_eq!(result.status_code(), 500);
    }
}
