//! Configuration loader with multi-source merging

use crate::{Paths, RoleCloneConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "ROLECLONE".to_string(),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "ROLECLONE")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/roleclone/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<RoleCloneConfig> {
        let mut builder = config::Config::builder();

        // Built-in defaults, then user, project and local files
        let defaults = RoleCloneConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        let files = Paths::new().search_order(&self.project_dir, self.user_config);
        for (_, file) in files.into_iter().filter(|(_, file)| file.exists()) {
            builder = builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variables (ROLECLONE_AWS__PROFILE, ROLECLONE_CLONE__PAGE_SIZE)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Build and deserialize
        let config = builder.build().context("Failed to build configuration")?;

        let roleclone_config: RoleCloneConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        roleclone_config
            .validate()
            .context("Configuration is invalid")?;

        Ok(roleclone_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use std::fs;
    use tempfile::tempdir;

    fn loader(project_dir: &Path) -> ConfigLoader {
        // Unique prefix keeps the developer's environment out of the tests
        ConfigLoader::new()
            .with_project_dir(project_dir)
            .with_env_prefix("ROLECLONE_TEST_UNSET")
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path()).load().expect("Failed to load config");

        assert_eq!(config, RoleCloneConfig::default());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[aws]
profile = "staging"
region = "eu-west-1"

[clone]
page_size = 50

[output]
format = "json"
"#;
        fs::write(project_dir.join("roleclone.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.aws.profile.as_deref(), Some("staging"));
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert!(config.aws.endpoint_url.is_none());
        assert_eq!(config.clone.page_size, Some(50));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.color);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("roleclone.toml"),
            r#"
[aws]
profile = "staging"
region = "eu-west-1"
"#,
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("roleclone.local.toml"),
            r#"
[aws]
profile = "sandbox"
"#,
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config should override project config, key by key
        assert_eq!(config.aws.profile.as_deref(), Some("sandbox"));
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("roleclone.toml"), "[clone]\npage_size = 0\n")
            .expect("Failed to write config");

        let err = loader(project_dir).load().unwrap_err();
        assert!(format!("{err:#}").contains("clone.page_size"));
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("roleclone.toml"), "[aws\nprofile = ")
            .expect("Failed to write config");

        assert!(loader(project_dir).load().is_err());
    }

    // Environment variables are not exercised here: they are process-global
    // and the config crate reads them at build time. In actual usage:
    //
    // ROLECLONE_AWS__PROFILE=staging
    // ROLECLONE_CLONE__PAGE_SIZE=100
    // ROLECLONE_OUTPUT__COLOR=false
}
