use serde::Serialize;
use serde_json::Value;

use crate::error::RestoreError;
use crate::restore::RestoreOutput;

pub const DB_TYPE_INSTANCE: &str = "DBInstance";

/// How a restore response is judged successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessCheck {
    /// Status equals the number 200.
    #[default]
    NumericStatus,
    /// Compares the numeric status against the string `"200"`, as the
    /// first deployment of this handler did. Never matches, so every
    /// restore is reported with the failure message.
    LegacyStringMatch,
}

impl SuccessCheck {
    pub fn is_success(&self, http_status: u16) -> bool {
        match self {
            Self::NumericStatus => http_status == 200,
            Self::LegacyStringMatch => Value::from(http_status) == Value::from("200"),
        }
    }
}

/// Outcome of a restore accepted by RDS.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestoreStarted {
    #[serde(rename = "HTTPStatusCode")]
    pub http_status_code: u16,
    #[serde(rename = "DBType")]
    pub db_type: String,
    #[serde(rename = "DBInstanceArn")]
    pub db_instance_arn: Option<String>,
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub status_code: u16,
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub status_code: u16,
    pub body: String,
}

/// Structured result handed back to the Lambda runtime.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RestoreResult {
    Started(RestoreStarted),
    Rejected(Rejection),
    Failed(Failure),
}

impl RestoreResult {
    pub fn from_output(
        output: RestoreOutput,
        snapshot: &str,
        target_identifier: &str,
        check: SuccessCheck,
    ) -> Self {
        let message = if check.is_success(output.http_status) {
            format!(
                "RDS snapshot {} is being restored to {}",
                snapshot, target_identifier
            )
        } else {
            format!(
                "Failed to restore snapshot {} to {}. Please check the logs.",
                snapshot, target_identifier
            )
        };

        Self::Started(RestoreStarted {
            http_status_code: output.http_status,
            db_type: DB_TYPE_INSTANCE.to_string(),
            db_instance_arn: output.db_instance_arn,
            message,
        })
    }

    pub fn from_error(err: &RestoreError) -> Self {
        if err.is_rejection() {
            return Self::Rejected(Rejection {
                status_code: err.status_code(),
                message: err.to_string(),
            });
        }

        // Body is a JSON-encoded string, e.g. "\"Error: ...\"".
        let detail = format!("Error: {}", err);
        let body = serde_json::to_string(&detail).unwrap_or(detail);

        Self::Failed(Failure {
            status_code: err.status_code(),
            body,
        })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Started(started) => started.http_status_code,
            Self::Rejected(rejection) => rejection.status_code,
            Self::Failed(failure) => failure.status_code,
        }
    }
}
