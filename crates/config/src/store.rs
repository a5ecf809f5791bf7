//! Layered configuration loading, caching and persistence.
//!
//! # Layers (lowest to highest precedence)
//!
//! 1. The packaged default (`default.gh.json`, compiled into the binary)
//! 2. The user file (`~/.gh.json`), bootstrapped from the default on first run
//! 3. Installed plugin manifests, merged into `plugins.<name>` when a plugin
//!    scope is requested (user values win key by key)
//! 4. The project file (`./.gh.json`)
//!
//! Layers 2 and 4 are overlaid shallowly: a top-level key in a higher layer
//! replaces the lower value wholesale.
//!
//! # Caching
//!
//! [`ConfigStore::load`] caches one merged [`Config`] per scope. Every
//! mutating operation ([`ConfigStore::write`], [`ConfigStore::remove`],
//! [`ConfigStore::create`]) clears the cache. The store is meant to be
//! created once per invocation and threaded through the code that needs it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, GITHUB_TOKEN_KEY, GITHUB_USER_KEY, PLUGINS_PATH_KEY};
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::persistence::{
    ConfigMap, read_config_file, read_optional_config_file, write_config_file, write_private_file,
};
use crate::plugins::{PluginRegistry, plugin_basename};

/// Package manager asked for its global module root.
pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";

/// Loads, merges, caches and persists configuration for one invocation.
#[derive(Debug)]
pub struct ConfigStore {
    env: Environment,
    cache: HashMap<Option<String>, Arc<Config>>,
    plugins: PluginRegistry,
    plugins_dir: Option<Option<PathBuf>>,
    package_manager: String,
}

impl ConfigStore {
    /// Creates a store for the given environment.
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            cache: HashMap::new(),
            plugins: PluginRegistry::new(),
            plugins_dir: None,
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
        }
    }

    /// Creates a store for the current process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the home or working directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Environment::from_env()?))
    }

    /// Overrides the package manager executable used to locate plugins.
    #[must_use]
    pub fn with_package_manager(mut self, program: impl Into<String>) -> Self {
        self.package_manager = program.into();
        self
    }

    /// Returns the environment this store reads from.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Returns the effective merged configuration for a scope.
    ///
    /// `scope` falls back to the environment's plugin scope. Plugin names
    /// may be passed with or without the `gh-` prefix. Repeated calls with
    /// the same scope return the same [`Arc`] until the cache is
    /// invalidated.
    ///
    /// # Errors
    ///
    /// Returns an error if any config layer is unreadable or malformed, or
    /// if the user file cannot be bootstrapped.
    #[instrument(skip(self))]
    pub async fn load(&mut self, scope: Option<&str>) -> Result<Arc<Config>> {
        let key = scope
            .or(self.env.plugin_scope.as_deref())
            .map(|s| plugin_basename(s).to_string());

        if let Some(config) = self.cache.get(&key) {
            return Ok(Arc::clone(config));
        }

        let mut config = self.load_global(key.as_deref()).await?;

        let project_path = self.env.project_config_path();
        match read_optional_config_file(&project_path)? {
            Some(project) => {
                debug!(path = ?project_path, "applying project config");
                config.overlay(project);
            }
            None => debug!(path = ?project_path, "no project config"),
        }

        config.derive_hosts();

        let config = Arc::new(config);
        self.cache.insert(key, Arc::clone(&config));
        Ok(config)
    }

    /// Returns the global configuration without project overrides.
    ///
    /// With a scope, every installed plugin's manifest is merged into
    /// `plugins.<name>`. The result is not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if any config layer or plugin manifest is
    /// unreadable or malformed.
    pub async fn load_global(&mut self, scope: Option<&str>) -> Result<Config> {
        let mut config = self.read_global()?;

        if scope.is_some() {
            let dir = self.resolve_plugins_directory().await?;
            if let Some(dir) = dir {
                let installed = self.plugins.installed(Some(&dir)).to_vec();
                for plugin in &installed {
                    PluginRegistry::merge_plugin_config(&mut config, &dir, plugin)?;
                }
            }
        }

        Ok(config)
    }

    /// Merges the packaged default with the user file, bootstrapping the
    /// user file when it does not exist yet.
    fn read_global(&mut self) -> Result<Config> {
        let user_path = self.env.user_config_path.clone();
        if !user_path.exists() {
            info!(path = ?user_path, "creating user config from defaults");
            self.create()?;
        }

        let mut config = Config::from_map(self.default_layer()?);
        config.overlay(read_config_file(&user_path)?);
        Ok(config)
    }

    fn default_layer(&self) -> Result<ConfigMap> {
        match serde_json5::from_str::<Value>(&self.env.default_config) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConfigError::NotAnObject {
                path: PathBuf::from("<packaged default>"),
            }),
            Err(e) => Err(ConfigError::ParseDefault(e)),
        }
    }

    /// Copies the packaged default configuration to the user file.
    ///
    /// # Errors
    ///
    /// Returns an error if the default is malformed or the user file cannot
    /// be written.
    pub fn create(&mut self) -> Result<()> {
        self.default_layer()?;
        write_private_file(&self.env.user_config_path, self.env.default_config.as_bytes())?;
        self.invalidate();
        Ok(())
    }

    /// Sets a value at a dotted path in the user file.
    ///
    /// The whole global configuration (defaults merged with the user file)
    /// is persisted, and the cache is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the key path is invalid or the file cannot be
    /// read or written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gh_config::ConfigStore;
    /// use serde_json::json;
    ///
    /// # fn example() -> gh_config::Result<()> {
    /// let mut store = ConfigStore::from_env()?;
    /// store.write("plugins.jira.host", json!("jira.example"))?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, value))]
    pub fn write(&mut self, dotted_path: &str, value: Value) -> Result<()> {
        let mut config = self.read_global()?;
        config.set_path(dotted_path, value)?;
        self.persist(&config)
    }

    /// Deletes a top-level key from the user file, returning its old value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    #[instrument(skip(self))]
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        let mut config = self.read_global()?;
        let previous = config.remove(key);
        self.persist(&config)?;
        Ok(previous)
    }

    /// Stores the GitHub login and token in the user file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn write_credentials(&mut self, user: &str, token: &str) -> Result<()> {
        self.write(GITHUB_USER_KEY, Value::String(user.to_string()))?;
        self.write(GITHUB_TOKEN_KEY, Value::String(token.to_string()))?;
        info!(path = ?self.env.user_config_path, "wrote GitHub credentials");
        Ok(())
    }

    fn persist(&mut self, config: &Config) -> Result<()> {
        write_config_file(&self.env.user_config_path, config)?;
        self.invalidate();
        Ok(())
    }

    /// Drops every cached configuration and the resolved plugins
    /// directory.
    ///
    /// The installed plugin list stays memoized for the life of the store.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.plugins_dir = None;
    }

    /// Returns the directory plugins are installed in.
    ///
    /// An explicit `plugins_path` wins. Otherwise the package manager is
    /// asked for its global module root, and the answer is saved back to
    /// the user file (except in test mode). When nothing can be resolved a
    /// warning is logged and `None` is returned. The answer is remembered
    /// until the next write.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading the configuration or persisting the
    /// resolved path fails.
    pub async fn resolve_plugins_directory(&mut self) -> Result<Option<PathBuf>> {
        if let Some(dir) = &self.plugins_dir {
            return Ok(dir.clone());
        }

        let configured = self.read_global()?.plugins_path().map(PathBuf::from);
        let dir = match configured {
            Some(dir) => Some(dir),
            None => match query_global_root(&self.package_manager).await {
                Some(root) => {
                    if !self.env.test_mode {
                        self.write(PLUGINS_PATH_KEY, Value::String(root.clone()))?;
                    }
                    Some(PathBuf::from(root))
                }
                None => {
                    warn!("can't resolve plugins directory path");
                    None
                }
            },
        };

        self.plugins_dir = Some(dir.clone());
        Ok(dir)
    }

    /// Lists installed plugin names, prefix stripped.
    ///
    /// The directory is scanned once per store.
    ///
    /// # Errors
    ///
    /// Returns an error only if resolving the plugins directory fails.
    pub async fn installed_plugins(&mut self) -> Result<Vec<String>> {
        let dir = self.resolve_plugins_directory().await?;
        Ok(self.plugins.installed(dir.as_deref()).to_vec())
    }

    /// Returns whether a plugin is listed in `ignored_plugins`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub async fn is_plugin_ignored(&mut self, plugin: &str) -> Result<bool> {
        let config = self.load(None).await?;
        Ok(PluginRegistry::is_ignored(&config, plugin))
    }
}

/// Asks a package manager for its global module root (`<pm> root -g`).
async fn query_global_root(package_manager: &str) -> Option<String> {
    use tokio::process::Command;

    let output = match Command::new(package_manager).args(["root", "-g"]).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!(program = package_manager, error = %e, "failed to run package manager");
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            program = package_manager,
            code = ?output.status.code(),
            stderr = %stderr.trim(),
            "package manager root lookup failed"
        );
        return None;
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!root.is_empty()).then_some(root)
}
