use crate::error::RestoreError;
use crate::response::SuccessCheck;

pub const SUBNET_GROUP_ENV: &str = "DB_SUBNET_GROUP_NAME";
// Name used by the existing deployment templates.
pub const LEGACY_SUBNET_GROUP_ENV: &str = "DB_DUBNET_GROUP_NAME";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreConfig {
    pub subnet_group_name: Option<String>,
    pub success_check: SuccessCheck,
}

impl RestoreConfig {
    pub fn new(subnet_group_name: impl Into<String>) -> Self {
        Self {
            subnet_group_name: Some(subnet_group_name.into()),
            success_check: SuccessCheck::default(),
        }
    }

    pub fn with_success_check(mut self, success_check: SuccessCheck) -> Self {
        self.success_check = success_check;
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let subnet_group_name = [SUBNET_GROUP_ENV, LEGACY_SUBNET_GROUP_ENV]
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());

        Self {
            subnet_group_name,
            success_check: SuccessCheck::default(),
        }
    }

    pub fn subnet_group_name(&self) -> Result<&str, RestoreError> {
        self.subnet_group_name.as_deref().ok_or_else(|| {
            RestoreError::Configuration(format!(
                "{} is not set; cannot choose a subnet group for the restored instance",
                SUBNET_GROUP_ENV
            ))
        })
    }
}
