//! Where roleclone looks for configuration files.

use std::fmt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

/// File name of the shared, committed project configuration.
pub const PROJECT_CONFIG_FILE: &str = "roleclone.toml";

/// File name of the per-checkout overrides, usually gitignored.
pub const LOCAL_CONFIG_FILE: &str = "roleclone.local.toml";

/// The layer a configuration file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    /// `~/.config/roleclone/config.toml` (or the platform equivalent).
    User,
    Project,
    Local,
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigScope::User => "user",
            ConfigScope::Project => "project",
            ConfigScope::Local => "local",
        })
    }
}

/// Resolves configuration file locations for one invocation.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "roleclone", "roleclone"),
        }
    }

    /// The per-user configuration file. Fails on systems without a home
    /// directory.
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().join("config.toml"))
            .ok_or_else(|| {
                ConfigError::XdgError("no home directory to hold user configuration".to_string())
            })
    }

    /// Candidate files, lowest precedence first. Files need not exist.
    pub fn search_order(
        &self,
        project_dir: &Path,
        include_user: bool,
    ) -> Vec<(ConfigScope, PathBuf)> {
        let mut files = Vec::with_capacity(3);

        if include_user && let Ok(user) = self.user_config_file() {
            files.push((ConfigScope::User, user));
        }
        files.push((ConfigScope::Project, project_dir.join(PROJECT_CONFIG_FILE)));
        files.push((ConfigScope::Local, project_dir.join(LOCAL_CONFIG_FILE)));

        files
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
