//! Configuration management for gh.
//!
//! This crate loads, merges, caches and persists the layered JSON
//! configuration, and discovers installed plugins without executing them.
//!
//! # Overview
//!
//! - [`config`]: The merged [`Config`] object and its typed accessors
//! - [`store`]: [`ConfigStore`], the per-invocation loader and cache
//! - [`plugins`]: [`PluginRegistry`], plugin discovery and manifest merging
//! - [`environment`]: [`Environment`], paths and markers captured at startup
//! - [`persistence`]: Config file reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! Highest to lowest:
//!
//! 1. Project config (`./.gh.json`)
//! 2. Plugin manifests (only under a plugin scope, and only below the user's
//!    own `plugins.<name>` values)
//! 3. User config (`~/.gh.json`, created from the defaults on first run)
//! 4. Packaged defaults
//!
//! # Examples
//!
//! ```no_run
//! use gh_config::ConfigStore;
//!
//! # async fn example() -> gh_config::Result<()> {
//! let mut store = ConfigStore::from_env()?;
//! let config = store.load(None).await?;
//!
//! println!("API host: {}", config.api_host());
//! for plugin in store.installed_plugins().await? {
//!     println!("plugin: {plugin}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod persistence;
pub mod plugins;
pub mod store;

// Re-export primary types at crate root for convenience
pub use config::Config;
pub use environment::Environment;
pub use error::{ConfigError, Result};
pub use plugins::{PluginRegistry, plugin_basename, plugin_dir};
pub use store::ConfigStore;
