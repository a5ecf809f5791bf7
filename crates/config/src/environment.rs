//! Process environment captured once at startup.
//!
//! The config layers live at paths that depend on the home directory, the
//! working directory and a handful of environment markers. [`Environment`]
//! resolves them up front so the rest of the crate never reads process
//! state directly, and tests can point every layer at a sandbox.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Name of the user and project config files.
pub const CONFIG_FILE_NAME: &str = ".gh.json";

/// Environment variable that switches on test mode when set to `testing`.
pub const ENV_MODE_VAR: &str = "GH_ENV";

/// Environment variable overriding the user config file path.
pub const CONFIG_PATH_VAR: &str = "GH_CONFIG";

/// Environment variable supplying the active plugin scope.
pub const PLUGIN_SCOPE_VAR: &str = "GH_PLUGIN";

/// The packaged default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../default.gh.json");

/// Resolved locations and markers for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Path of the user-home config file.
    pub user_config_path: PathBuf,
    /// Directory searched for the project config file.
    pub project_dir: PathBuf,
    /// Whether test mode is active.
    pub test_mode: bool,
    /// Plugin scope supplied through the environment, if any.
    pub plugin_scope: Option<String>,
    /// Text of the packaged default configuration.
    pub default_config: String,
}

impl Environment {
    /// Captures the current process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] when no user config path can
    /// be determined, or [`ConfigError::ReadFile`] when the working directory
    /// is unavailable.
    pub fn from_env() -> Result<Self> {
        let test_mode = std::env::var(ENV_MODE_VAR).is_ok_and(|v| v == "testing");

        let user_config_path = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None if test_mode => std::env::temp_dir().join("gh-testing").join(CONFIG_FILE_NAME),
            None => dirs::home_dir()
                .map(|home| home.join(CONFIG_FILE_NAME))
                .ok_or(ConfigError::NoHomeDirectory)?,
        };

        let project_dir = std::env::current_dir().map_err(|e| ConfigError::ReadFile {
            path: PathBuf::from("."),
            source: e,
        })?;

        let plugin_scope = std::env::var(PLUGIN_SCOPE_VAR)
            .ok()
            .filter(|scope| !scope.is_empty());

        Ok(Self {
            user_config_path,
            project_dir,
            test_mode,
            plugin_scope,
            default_config: DEFAULT_CONFIG.to_string(),
        })
    }

    /// Creates an environment rooted at explicit paths, using the packaged
    /// default configuration and test mode off.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_config::Environment;
    ///
    /// let env = Environment::new("/tmp/home/.gh.json", "/tmp/project");
    /// assert_eq!(env.project_config_path().to_str(), Some("/tmp/project/.gh.json"));
    /// assert!(!env.test_mode);
    /// ```
    #[must_use]
    pub fn new(user_config_path: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: user_config_path.into(),
            project_dir: project_dir.into(),
            test_mode: false,
            plugin_scope: None,
            default_config: DEFAULT_CONFIG.to_string(),
        }
    }

    /// Replaces the packaged default configuration text.
    #[must_use]
    pub fn with_default_config(mut self, default_config: impl Into<String>) -> Self {
        self.default_config = default_config.into();
        self
    }

    /// Sets test mode.
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Sets the plugin scope supplied by the environment.
    #[must_use]
    pub fn with_plugin_scope(mut self, scope: impl Into<String>) -> Self {
        self.plugin_scope = Some(scope.into());
        self
    }

    /// Returns the path of the project config file.
    #[must_use]
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE_NAME)
    }

    /// Returns the path of the user config file.
    #[must_use]
    pub fn user_config_path(&self) -> &Path {
        &self.user_config_path
    }
}
