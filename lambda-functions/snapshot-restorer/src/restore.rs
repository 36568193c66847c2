use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::types::Tag;
use aws_sdk_rds::Client as RdsClient;
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::RestoreError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ProvenanceTag {
    pub key: String,
    pub value: String,
}

impl ProvenanceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<&ProvenanceTag> for Tag {
    fn from(tag: &ProvenanceTag) -> Self {
        Tag::builder().key(&tag.key).value(&tag.value).build()
    }
}

/// Everything needed for one `RestoreDBInstanceFromDBSnapshot` call.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(on(String, into))]
pub struct RestoreRequest {
    pub target_identifier: String,
    pub snapshot_identifier: String,
    pub region: String,
    pub subnet_group_name: String,
    pub tags: Vec<ProvenanceTag>,
    #[builder(default = false)]
    pub publicly_accessible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreOutput {
    pub http_status: u16,
    pub db_instance_arn: Option<String>,
}

/// Issues the restore against the managed database service.
#[async_trait]
pub trait SnapshotRestorer: Send + Sync {
    async fn restore(&self, request: &RestoreRequest) -> Result<RestoreOutput, RestoreError>;
}

/// [`SnapshotRestorer`] backed by the RDS API.
///
/// Holds the shared SDK config loaded at cold start and builds a client for
/// the event's region on each call.
pub struct RdsSnapshotRestorer {
    sdk_config: SdkConfig,
}

impl RdsSnapshotRestorer {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client_for(&self, region: &str) -> RdsClient {
        let config = aws_sdk_rds::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();

        RdsClient::from_conf(config)
    }
}

#[async_trait]
impl SnapshotRestorer for RdsSnapshotRestorer {
    async fn restore(&self, request: &RestoreRequest) -> Result<RestoreOutput, RestoreError> {
        info!(
            "Restoring database {} from snapshot {}...",
            request.target_identifier, request.snapshot_identifier
        );

        let tags: Vec<Tag> = request.tags.iter().map(Tag::from).collect();

        let result = self
            .client_for(&request.region)
            .restore_db_instance_from_db_snapshot()
            .db_instance_identifier(&request.target_identifier)
            .db_snapshot_identifier(&request.snapshot_identifier)
            .publicly_accessible(request.publicly_accessible)
            .db_subnet_group_name(&request.subnet_group_name)
            .set_tags(Some(tags))
            .send()
            .await;

        match result {
            // The SDK only yields Ok for a 2xx response.
            Ok(output) => Ok(RestoreOutput {
                http_status: 200,
                db_instance_arn: output
                    .db_instance()
                    .and_then(|instance| instance.db_instance_arn())
                    .map(str::to_string),
            }),
            Err(e) => {
                let status = e.raw_response().map(|response| response.status().as_u16());
                let message = DisplayErrorContext(&e).to_string();
                error!("Error during database restore: {}", message);
                Err(RestoreError::ExternalCall { status, message })
            }
        }
    }
}
