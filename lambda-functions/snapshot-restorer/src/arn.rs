use std::fmt;

use crate::error::RestoreError;
use crate::restore::ProvenanceTag;

pub const TARGET_IDENTIFIER_PREFIX: &str = "copy-of-";

const REGION_INDEX: usize = 3;
const ACCOUNT_INDEX: usize = 4;
// arn:partition:service:region:account-id:resource
const MIN_SEGMENTS: usize = 6;

/// The pieces of a source database ARN needed to name and tag its copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceArn {
    raw: String,
    region: String,
    account: String,
    resource_name: String,
}

impl ResourceArn {
    pub fn parse(arn: &str) -> Result<Self, RestoreError> {
        let segments: Vec<&str> = arn.split(':').collect();

        if segments.len() < MIN_SEGMENTS {
            return Err(RestoreError::MalformedArn(arn.to_string()));
        }

        let region = segments[REGION_INDEX];
        let account = segments[ACCOUNT_INDEX];
        let resource_name = segments[segments.len() - 1];

        if region.is_empty() || account.is_empty() || resource_name.is_empty() {
            return Err(RestoreError::MalformedArn(arn.to_string()));
        }

        Ok(Self {
            raw: arn.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource_name: resource_name.to_string(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Identifier for the restored instance, e.g. `copy-of-prod-db-1`.
    pub fn target_identifier(&self) -> String {
        format!("{}{}", TARGET_IDENTIFIER_PREFIX, self.resource_name)
    }

    pub fn provenance_tags(&self) -> Vec<ProvenanceTag> {
        vec![
            ProvenanceTag::new("copied-from-prod", "true"),
            ProvenanceTag::new("source-region", &self.region),
            ProvenanceTag::new("source-account", &self.account),
        ]
    }
}

impl fmt::Display for ResourceArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
