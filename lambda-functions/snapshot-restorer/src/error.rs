use thiserror::Error;

/// Everything that can stop a restore from being issued or completed.
///
/// Rejections (`InvalidEvent`, `NotCompleted`, `MalformedArn`) describe input
/// the function refuses to act on. The remaining variants are failures on our
/// side or on the RDS side.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Invalid event source or detail type.")]
    InvalidEvent,

    #[error("Backup snapshot is not in a COMPLETED state.")]
    NotCompleted { status: String },

    #[error("Malformed resource ARN: {0}")]
    MalformedArn(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("restore call failed: {message}")]
    ExternalCall {
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl RestoreError {
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidEvent | Self::NotCompleted { .. } | Self::MalformedArn(_)
        )
    }

    /// Status code reported in the outward result.
    pub fn status_code(&self) -> u16 {
        if self.is_rejection() {
            400
        } else {
            500
        }
    }
}
