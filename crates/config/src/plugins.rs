//! Plugin discovery and per-plugin configuration.
//!
//! Plugins are installed by the package manager into its global module
//! root as directories named `gh-<name>`. Discovery only looks at directory
//! names and the JSON manifest inside each plugin; it never executes plugin
//! code. Executing a plugin is the job of the command layer.
//!
//! ```text
//! <plugins_dir>/
//! ├── gh-jira/
//! │   ├── gh-plugin.json    # default config for the "jira" plugin
//! │   └── bin/gh-jira
//! └── lodash/               # ignored: no gh- prefix
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::persistence::{ConfigMap, read_optional_config_file};

/// Prefix shared by every plugin directory and executable.
pub const PLUGIN_PREFIX: &str = "gh-";

/// File name of the manifest inside a plugin directory.
pub const PLUGIN_MANIFEST_FILE: &str = "gh-plugin.json";

/// Strips the plugin prefix from a name, if present.
///
/// # Examples
///
/// ```
/// use gh_config::plugin_basename;
///
/// assert_eq!(plugin_basename("gh-jira"), "jira");
/// assert_eq!(plugin_basename("jira"), "jira");
/// ```
#[must_use]
pub fn plugin_basename(plugin: &str) -> &str {
    plugin.strip_prefix(PLUGIN_PREFIX).unwrap_or(plugin)
}

/// Returns the install directory of a plugin inside the plugins directory.
#[must_use]
pub fn plugin_dir(plugins_dir: &Path, plugin: &str) -> PathBuf {
    plugins_dir.join(format!("{PLUGIN_PREFIX}{}", plugin_basename(plugin)))
}

/// Filters directory entry names down to plugin names, prefix stripped.
///
/// Entries keep their input order.
///
/// # Examples
///
/// ```
/// use gh_config::plugins::filter_plugin_names;
///
/// let names = filter_plugin_names(["gh-foo", "bar", "gh-baz"]);
/// assert_eq!(names, vec!["foo", "baz"]);
/// ```
pub fn filter_plugin_names<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .as_ref()
                .strip_prefix(PLUGIN_PREFIX)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Tracks installed plugins for the lifetime of one [`ConfigStore`].
///
/// The first scan of the plugins directory is memoized, whether it
/// succeeded or not.
///
/// [`ConfigStore`]: crate::ConfigStore
#[derive(Debug, Default)]
pub struct PluginRegistry {
    installed: Option<Vec<String>>,
}

impl PluginRegistry {
    /// Creates a registry that has not scanned anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists plugins installed in `plugins_dir`, memoizing the result.
    ///
    /// `None` means the plugins directory could not be resolved and yields
    /// an empty list. An unreadable directory is logged and also yields an
    /// empty list; neither case is an error, so built-in commands keep
    /// working without plugins.
    pub fn installed(&mut self, plugins_dir: Option<&Path>) -> &[String] {
        self.installed
            .get_or_insert_with(|| match plugins_dir {
                Some(dir) => scan_plugins_dir(dir),
                None => Vec::new(),
            })
            .as_slice()
    }

    /// Returns whether the memoized scan has happened.
    #[must_use]
    pub fn is_scanned(&self) -> bool {
        self.installed.is_some()
    }

    /// Returns whether a plugin is listed in `ignored_plugins`.
    ///
    /// Either the bare name or the prefixed name may be passed.
    #[must_use]
    pub fn is_ignored(config: &Config, plugin: &str) -> bool {
        let name = plugin_basename(plugin);
        config
            .ignored_plugins()
            .iter()
            .any(|ignored| plugin_basename(ignored) == name)
    }

    /// Loads a plugin's manifest defaults.
    ///
    /// Returns `Ok(None)` when the plugin declares no manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn load_manifest(plugins_dir: &Path, plugin: &str) -> Result<Option<ConfigMap>> {
        let path = plugin_dir(plugins_dir, plugin).join(PLUGIN_MANIFEST_FILE);
        debug!(?path, "loading plugin manifest");
        read_optional_config_file(&path)
    }

    /// Merges a plugin's manifest defaults into `config.plugins[name]`.
    ///
    /// Keys already present in the user's `config.plugins[name]` win over
    /// the manifest. A plugin without a manifest leaves `config` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn merge_plugin_config(config: &mut Config, plugins_dir: &Path, plugin: &str) -> Result<()> {
        let name = plugin_basename(plugin);

        let Some(mut merged) = Self::load_manifest(plugins_dir, name)? else {
            debug!(plugin = name, "plugin has no manifest, nothing to merge");
            return Ok(());
        };

        if let Some(user) = config.plugin_config(name) {
            for (key, value) in user {
                merged.insert(key.clone(), value.clone());
            }
        }

        config.set_plugin_config(name, merged);
        Ok(())
    }
}

fn scan_plugins_dir(dir: &Path) -> Vec<String> {
    let entries = match read_dir_names(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = ?dir, error = %e, "can't read plugins directory");
            return Vec::new();
        }
    };

    let plugins = filter_plugin_names(entries);
    debug!(path = ?dir, count = plugins.len(), "discovered plugins");
    plugins
}

fn read_dir_names(dir: &Path) -> Result<Vec<String>> {
    let read_err = |e| ConfigError::ReadFile {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
