//! Configuration management for roleclone
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`ROLECLONE_<SECTION>__<KEY>`)
//! 3. roleclone.local.toml (gitignored, local overrides)
//! 4. roleclone.toml (project config)
//! 5. ~/.config/roleclone/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [aws]
//! profile = "staging"
//! region = "eu-west-1"
//!
//! [clone]
//! page_size = 100
//!
//! [output]
//! color = false
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::{ConfigScope, LOCAL_CONFIG_FILE, PROJECT_CONFIG_FILE, Paths};

/// Largest page size the identity service accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Main roleclone configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleCloneConfig {
    pub aws: AwsConfig,
    pub clone: CloneConfig,
    pub output: OutputConfig,
}

/// Overrides for the AWS SDK's credential and region resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// Items per listing page; the service default when unset.
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl RoleCloneConfig {
    /// Load configuration from default locations
    pub fn load() -> anyhow::Result<Self> {
        ConfigLoader::new().load()
    }

    /// Check values the deserializer cannot constrain
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(page_size) = self.clone.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            return Err(ConfigError::ValidationError(format!(
                "clone.page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        for (key, value) in [
            ("aws.region", &self.aws.region),
            ("aws.profile", &self.aws.profile),
            ("aws.endpoint_url", &self.aws.endpoint_url),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "{key} is set but empty"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = RoleCloneConfig::default();
        assert!(config.aws.region.is_none());
        assert!(config.aws.profile.is_none());
        assert!(config.clone.page_size.is_none());
        assert!(config.output.color);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test_case(Some(1), true; "minimum")]
    #[test_case(Some(1000), true; "maximum")]
    #[test_case(None, true; "unset")]
    #[test_case(Some(0), false; "zero")]
    #[test_case(Some(1001), false; "above maximum")]
    fn test_page_size_validation(page_size: Option<u32>, valid: bool) {
        let config = RoleCloneConfig {
            clone: CloneConfig { page_size },
            ..Default::default()
        };
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn test_empty_profile_is_invalid() {
        let config = RoleCloneConfig {
            aws: AwsConfig {
                profile: Some("  ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("aws.profile"));
    }
}
