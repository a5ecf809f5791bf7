//! The merged configuration value.
//!
//! [`Config`] is a JSON object with typed accessors for the keys gh itself
//! understands. Plugins and users may store arbitrary additional keys; those
//! are carried through merges and persistence untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::persistence::ConfigMap;

/// Key holding the API protocol and host.
pub const API_KEY: &str = "api";

/// Key holding an explicit plugins directory.
pub const PLUGINS_PATH_KEY: &str = "plugins_path";

/// Key holding the list of ignored plugin names.
pub const IGNORED_PLUGINS_KEY: &str = "ignored_plugins";

/// Key holding per-plugin configuration objects.
pub const PLUGINS_KEY: &str = "plugins";

/// Key holding the user's GitHub login.
pub const GITHUB_USER_KEY: &str = "github_user";

/// Key holding the user's GitHub token.
pub const GITHUB_TOKEN_KEY: &str = "github_token";

/// Key holding the derived web host URL.
pub const GITHUB_HOST_KEY: &str = "github_host";

/// Key holding the derived gist host URL.
pub const GITHUB_GIST_HOST_KEY: &str = "github_gist_host";

/// The public GitHub API host.
pub const PUBLIC_API_HOST: &str = "api.github.com";

const DEFAULT_PROTOCOL: &str = "https";

/// A merged configuration object.
///
/// # Examples
///
/// ```
/// use gh_config::Config;
/// use serde_json::json;
///
/// let mut config = Config::from_value(json!({
///     "api": { "protocol": "https", "host": "api.github.com" },
///     "github_user": "octocat",
/// }))
/// .unwrap();
/// config.derive_hosts();
///
/// assert_eq!(config.github_user(), Some("octocat"));
/// assert_eq!(config.github_host(), Some("https://github.com/"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(ConfigMap);

impl Config {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-parsed JSON object.
    #[must_use]
    pub fn from_map(map: ConfigMap) -> Self {
        Self(map)
    }

    /// Wraps a JSON value, which must be an object.
    ///
    /// Returns `None` for any other kind of value.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &ConfigMap {
        &self.0
    }

    /// Consumes the configuration, returning the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> ConfigMap {
        self.0
    }

    /// Returns a top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value at a dotted path such as `"api.host"`.
    #[must_use]
    pub fn get_path(&self, dotted_path: &str) -> Option<&Value> {
        let mut segments = dotted_path.split('.');
        let first = self.0.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.as_object()?.get(segment))
    }

    /// Sets the value at a dotted path, creating intermediate objects.
    ///
    /// An intermediate that exists but is not an object is replaced by an
    /// empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeyPath`] if the path or any of its
    /// segments is empty.
    pub fn set_path(&mut self, dotted_path: &str, value: Value) -> Result<()> {
        let segments: Vec<&str> = dotted_path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidKeyPath(dotted_path.to_string()));
        }

        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKeyPath(dotted_path.to_string()))?;

        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(ConfigMap::new()));
            if !entry.is_object() {
                *entry = Value::Object(ConfigMap::new());
            }
            current = entry
                .as_object_mut()
                .ok_or_else(|| ConfigError::InvalidKeyPath(dotted_path.to_string()))?;
        }

        current.insert(leaf.to_string(), value);
        Ok(())
    }

    /// Removes a top-level key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Overlays every top-level key of `layer` onto this configuration.
    ///
    /// The merge is shallow: a nested object in `layer` replaces the
    /// existing value wholesale rather than being merged into it.
    pub fn overlay(&mut self, layer: ConfigMap) {
        for (key, value) in layer {
            self.0.insert(key, value);
        }
    }

    /// Returns the configured API protocol, `https` when unset.
    #[must_use]
    pub fn api_protocol(&self) -> &str {
        self.get_path("api.protocol")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL)
    }

    /// Returns the configured API host, `api.github.com` when unset.
    #[must_use]
    pub fn api_host(&self) -> &str {
        self.get_path("api.host")
            .and_then(Value::as_str)
            .unwrap_or(PUBLIC_API_HOST)
    }

    /// Returns whether the API host is a GitHub Enterprise installation.
    #[must_use]
    pub fn is_enterprise(&self) -> bool {
        self.api_host() != PUBLIC_API_HOST
    }

    /// Returns the REST API base URL.
    ///
    /// Enterprise installations serve the API under `/api/v3`.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        if self.is_enterprise() {
            format!("{}://{}/api/v3", self.api_protocol(), self.api_host())
        } else {
            format!("{}://{}", self.api_protocol(), self.api_host())
        }
    }

    /// Fills in `github_host` and `github_gist_host` from the API settings.
    ///
    /// Values that are already present are left alone, so calling this
    /// repeatedly has no further effect.
    pub fn derive_hosts(&mut self) {
        let protocol = self.api_protocol().to_string();
        let host = self.api_host().to_string();
        let enterprise = self.is_enterprise();

        if !self.0.contains_key(GITHUB_HOST_KEY) {
            let web = if enterprise { host.as_str() } else { "github.com" };
            self.0.insert(
                GITHUB_HOST_KEY.to_string(),
                Value::String(format!("{protocol}://{web}/")),
            );
        }

        if !self.0.contains_key(GITHUB_GIST_HOST_KEY) {
            let gist = if enterprise {
                format!("{host}/gist")
            } else {
                "gist.github.com".to_string()
            };
            self.0.insert(
                GITHUB_GIST_HOST_KEY.to_string(),
                Value::String(format!("{protocol}://{gist}/")),
            );
        }
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the configured GitHub login.
    #[must_use]
    pub fn github_user(&self) -> Option<&str> {
        self.get_str(GITHUB_USER_KEY)
    }

    /// Returns the configured GitHub token.
    #[must_use]
    pub fn github_token(&self) -> Option<&str> {
        self.get_str(GITHUB_TOKEN_KEY)
    }

    /// Returns the web host URL, e.g. `https://github.com/`.
    #[must_use]
    pub fn github_host(&self) -> Option<&str> {
        self.get_str(GITHUB_HOST_KEY)
    }

    /// Returns the gist host URL, e.g. `https://gist.github.com/`.
    #[must_use]
    pub fn github_gist_host(&self) -> Option<&str> {
        self.get_str(GITHUB_GIST_HOST_KEY)
    }

    /// Returns the explicitly configured plugins directory.
    ///
    /// An empty string counts as unset.
    #[must_use]
    pub fn plugins_path(&self) -> Option<&str> {
        self.get_str(PLUGINS_PATH_KEY).filter(|p| !p.is_empty())
    }

    /// Returns the names listed in `ignored_plugins`.
    #[must_use]
    pub fn ignored_plugins(&self) -> Vec<&str> {
        self.0
            .get(IGNORED_PLUGINS_KEY)
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the configuration object stored for a plugin.
    #[must_use]
    pub fn plugin_config(&self, plugin: &str) -> Option<&ConfigMap> {
        self.0
            .get(PLUGINS_KEY)
            .and_then(Value::as_object)
            .and_then(|plugins| plugins.get(plugin))
            .and_then(Value::as_object)
    }

    /// Stores the configuration object for a plugin, creating the
    /// `plugins` object when needed.
    pub fn set_plugin_config(&mut self, plugin: &str, config: ConfigMap) {
        let plugins = self
            .0
            .entry(PLUGINS_KEY.to_string())
            .or_insert_with(|| Value::Object(ConfigMap::new()));
        if !plugins.is_object() {
            *plugins = Value::Object(ConfigMap::new());
        }
        if let Value::Object(plugins) = plugins {
            plugins.insert(plugin.to_string(), Value::Object(config));
        }
    }
}

impl From<ConfigMap> for Config {
    fn from(map: ConfigMap) -> Self {
        Self(map)
    }
}
