use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RestoreError;

pub const BACKUP_EVENT_SOURCE: &str = "aws.backup";
pub const RECOVERY_POINT_DETAIL_TYPE: &str = "Recovery Point State Change";
pub const COMPLETED_STATUS: &str = "COMPLETED";

/// EventBridge notification emitted by AWS Backup.
///
/// Built from the raw payload with `TryFrom<Value>`, which checks source and
/// detail type before the typed fields are read.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NotificationEvent {
    #[serde(default)]
    pub source: String,

    #[serde(rename = "detail-type", default)]
    pub detail_type: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub detail: BackupDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupDetail {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub resource_arn: Option<String>,
}

/// Exact, case-sensitive match on the raw payload. Field types outside
/// `source` and `detail-type` are not looked at.
pub fn validate_payload(payload: &Value) -> Result<(), RestoreError> {
    let source = payload.get("source").and_then(Value::as_str);
    let detail_type = payload.get("detail-type").and_then(Value::as_str);

    if source == Some(BACKUP_EVENT_SOURCE) && detail_type == Some(RECOVERY_POINT_DETAIL_TYPE) {
        Ok(())
    } else {
        Err(RestoreError::InvalidEvent)
    }
}

impl TryFrom<Value> for NotificationEvent {
    type Error = RestoreError;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        validate_payload(&payload)?;

        let event: Self = serde_json::from_value(payload)
            .context("backup event does not have the expected shape")?;
        Ok(event)
    }
}

impl NotificationEvent {
    /// Exact, case-sensitive match on source and detail type.
    pub fn is_recovery_point_change(&self) -> bool {
        self.source == BACKUP_EVENT_SOURCE && self.detail_type == RECOVERY_POINT_DETAIL_TYPE
    }

    pub fn validate(&self) -> Result<(), RestoreError> {
        if self.is_recovery_point_change() {
            Ok(())
        } else {
            Err(RestoreError::InvalidEvent)
        }
    }

    pub fn status(&self) -> Result<&str, RestoreError> {
        self.detail
            .status
            .as_deref()
            .ok_or_else(|| anyhow!("event detail is missing 'status'").into())
    }

    /// Passes only when the recovery point reached `COMPLETED`.
    pub fn ensure_completed(&self) -> Result<(), RestoreError> {
        let status = self.status()?;
        if status == COMPLETED_STATUS {
            Ok(())
        } else {
            Err(RestoreError::NotCompleted {
                status: status.to_string(),
            })
        }
    }

    pub fn snapshot_arn(&self) -> Result<&str, RestoreError> {
        match self.resources.first() {
            Some(arn) if !arn.is_empty() => Ok(arn.as_str()),
            Some(_) => Err(anyhow!("snapshot identifier in 'resources[0]' is empty").into()),
            None => Err(anyhow!("event has no 'resources' entry").into()),
        }
    }

    pub fn resource_arn(&self) -> Result<&str, RestoreError> {
        self.detail
            .resource_arn
            .as_deref()
            .ok_or_else(|| anyhow!("event detail is missing 'resourceArn'").into())
    }

    pub fn region(&self) -> Result<&str, RestoreError> {
        self.region
            .as_deref()
            .ok_or_else(|| anyhow!("event is missing 'region'").into())
    }
}
