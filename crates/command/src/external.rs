//! Commands provided by external plugin executables.
//!
//! A plugin named `jira` is an executable called `gh-jira`, looked up in
//! this order:
//!
//! 1. `<plugins_dir>/gh-jira/bin/gh-jira`
//! 2. `<plugins_dir>/gh-jira/gh-jira`
//! 3. every directory on `PATH`
//!
//! Loading runs `gh-jira --describe`, which must print a
//! [`DescriptorManifest`] as JSON. Running sends a single JSON request line
//! on the plugin's standard input:
//!
//! ```json
//! {"command": "jira", "options": {...}, "positional": [...], "config": {...}}
//! ```
//!
//! where `config` is the plugin's own `plugins.<name>` section.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use gh_config::plugins::PLUGIN_PREFIX;
use gh_config::{plugin_basename, plugin_dir};
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as Process;
use tracing::{debug, instrument};

use crate::catalog::{Command, RunContext};
use crate::descriptor::{CommandDescriptor, DescriptorManifest};
use crate::error::{CommandError, Result};
use crate::options::ResolvedOptions;

/// Flag asking a plugin to print its descriptor.
pub const DESCRIBE_FLAG: &str = "--describe";

/// The request written to a plugin's standard input.
#[derive(Debug, Serialize)]
struct PluginRequest<'a> {
    command: &'a str,
    options: Value,
    positional: &'a [String],
    config: Value,
}

/// A loaded external plugin.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    plugin: String,
    path: PathBuf,
    descriptor: CommandDescriptor,
}

impl ExternalCommand {
    /// Locates and describes a plugin.
    ///
    /// `plugin` may be given with or without the `gh-` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::PluginLoad`] if no executable is found, it
    /// cannot be started, exits unsuccessfully, or prints an invalid
    /// descriptor.
    #[instrument(skip(plugins_dir))]
    pub async fn load(plugin: &str, plugins_dir: Option<&Path>) -> Result<Self> {
        let plugin = plugin_basename(plugin);
        let path = resolve_executable(plugin, plugins_dir, std::env::var_os("PATH"))
            .ok_or_else(|| CommandError::plugin_load(plugin, "no executable found"))?;

        debug!(path = %path.display(), "describing plugin");
        let output = Process::new(&path)
            .arg(DESCRIBE_FLAG)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CommandError::PluginLoad {
                plugin: plugin.to_string(),
                reason: format!("cannot execute {}", path.display()),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CommandError::plugin_load(
                plugin,
                format!("{DESCRIBE_FLAG} exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let manifest: DescriptorManifest =
            serde_json::from_slice(&output.stdout).map_err(|e| CommandError::PluginLoad {
                plugin: plugin.to_string(),
                reason: "invalid descriptor".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            plugin: plugin.to_string(),
            descriptor: manifest.into_descriptor(plugin)?,
            path,
        })
    }

    /// Returns the plugin name, prefix stripped.
    #[must_use]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Returns the canonical path of the plugin executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Command for ExternalCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn plugin_scope(&self) -> Option<&str> {
        Some(&self.plugin)
    }

    #[instrument(skip_all, fields(plugin = %self.plugin))]
    async fn run(&self, ctx: &RunContext, options: ResolvedOptions) -> Result<()> {
        let request = PluginRequest {
            command: &self.descriptor.name,
            options: options.to_json(),
            positional: options.positional(),
            config: ctx
                .config
                .plugin_config(&self.plugin)
                .map_or_else(|| Value::Object(Default::default()), |c| Value::Object(c.clone())),
        };
        let mut line = serde_json::to_vec(&request)
            .map_err(|e| CommandError::execution(&self.descriptor.name, e))?;
        line.push(b'\n');

        let mut child = Process::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CommandError::execution(&self.descriptor.name, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&line)
                .await
                .map_err(|e| CommandError::execution(&self.descriptor.name, e))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| CommandError::execution(&self.descriptor.name, e))?;
        debug!(%status, "plugin exited");

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::execution(
                &self.descriptor.name,
                format!("plugin exited with {status}"),
            ))
        }
    }
}

/// Finds a plugin's executable, symlinks resolved.
///
/// `search_path` is the value of `PATH` to search after the plugins
/// directory.
#[must_use]
pub fn resolve_executable(
    plugin: &str,
    plugins_dir: Option<&Path>,
    search_path: Option<OsString>,
) -> Option<PathBuf> {
    let file_name = format!("{PLUGIN_PREFIX}{}", plugin_basename(plugin));

    let installed = plugins_dir.into_iter().flat_map(|dir| {
        let root = plugin_dir(dir, plugin);
        [root.join("bin").join(&file_name), root.join(&file_name)]
    });
    let on_path = search_path
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(&file_name))
        .collect::<Vec<_>>();

    installed
        .chain(on_path)
        .find(|candidate| is_executable(candidate))
        .and_then(|found| found.canonicalize().ok())
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use gh_config::Config;
    use serde_json::json;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    const DESCRIBE: &str = r#"{"alias":"ji","description":"Jira integration","options":{"browser":"Boolean","status":["open","closed"]},"shorthands":{"B":["--browser"]},"payload":{"browser":true}}"#;

    fn install(dir: &Path, relative: &str, body: &str) -> PathBuf {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn script(describe: &str) -> String {
        format!(
            "#!/bin/sh\nif [ \"$1\" = \"--describe\" ]; then\n  echo '{describe}'\n  exit 0\nfi\ncat > \"$(dirname \"$0\")/request.json\"\n"
        )
    }

    #[test]
    fn resolve_prefers_bin_directory() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "gh-jira/gh-jira", "#!/bin/sh\n");
        let bin = install(temp.path(), "gh-jira/bin/gh-jira", "#!/bin/sh\n");

        let found = resolve_executable("jira", Some(temp.path()), None).unwrap();
        assert_eq!(found, bin.canonicalize().unwrap());
    }

    #[test]
    fn resolve_falls_back_to_search_path() {
        let temp = TempDir::new().unwrap();
        let exe = install(temp.path(), "bin/gh-jira", "#!/bin/sh\n");

        let search = std::env::join_paths([temp.path().join("nowhere"), temp.path().join("bin")])
            .unwrap();
        let found = resolve_executable("gh-jira", None, Some(search)).unwrap();
        assert_eq!(found, exe.canonicalize().unwrap());
    }

    #[test]
    fn resolve_skips_non_executables() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gh-jira/gh-jira");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not a program").unwrap();

        assert!(resolve_executable("jira", Some(temp.path()), None).is_none());
    }

    #[test]
    fn resolve_dereferences_symlinks() {
        let temp = TempDir::new().unwrap();
        let real = install(temp.path(), "store/jira-1.0/gh-jira", "#!/bin/sh\n");
        std::fs::create_dir_all(temp.path().join("gh-jira")).unwrap();
        std::os::unix::fs::symlink(&real, temp.path().join("gh-jira/gh-jira")).unwrap();

        let found = resolve_executable("jira", Some(temp.path()), None).unwrap();
        assert_eq!(found, real.canonicalize().unwrap());
    }

    #[tokio::test]
    async fn load_reads_descriptor() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "gh-jira/gh-jira", &script(DESCRIBE));

        let command = ExternalCommand::load("gh-jira", Some(temp.path())).await.unwrap();
        assert_eq!(command.plugin(), "jira");
        assert_eq!(command.plugin_scope(), Some("jira"));
        assert_eq!(command.descriptor().name, "jira");
        assert_eq!(command.descriptor().alias.as_deref(), Some("ji"));
        assert!(command.descriptor().find_shorthand("B").is_some());
    }

    #[tokio::test]
    async fn load_rejects_invalid_descriptor() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "gh-jira/gh-jira", &script("not json"));

        let result = ExternalCommand::load("jira", Some(temp.path())).await;
        assert!(matches!(result, Err(CommandError::PluginLoad { plugin, .. }) if plugin == "jira"));
    }

    #[tokio::test]
    async fn load_rejects_failing_describe() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "gh-jira/gh-jira", "#!/bin/sh\necho broken >&2\nexit 3\n");

        let err = ExternalCommand::load("jira", Some(temp.path())).await.unwrap_err();
        assert!(err.to_string().contains("broken"), "{err}");
    }

    #[tokio::test]
    async fn load_missing_plugin() {
        let temp = TempDir::new().unwrap();
        let result = ExternalCommand::load("jira", Some(temp.path())).await;
        assert!(matches!(result, Err(CommandError::PluginLoad { .. })));
    }

    #[tokio::test]
    async fn run_sends_request_on_stdin() {
        let temp = TempDir::new().unwrap();
        let exe = install(temp.path(), "gh-jira/gh-jira", &script(DESCRIBE));
        let command = ExternalCommand::load("jira", Some(temp.path())).await.unwrap();

        let config = Config::from_value(json!({
            "plugins": {"jira": {"host": "jira.example.com"}}
        }))
        .unwrap();
        let mut options = ResolvedOptions::new();
        options.set_flag("browser", true);
        options.push_positional("ABC-1");

        command
            .run(&RunContext::new(Arc::new(config)), options)
            .await
            .unwrap();

        let written = std::fs::read_to_string(exe.parent().unwrap().join("request.json")).unwrap();
        let request: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            request,
            json!({
                "command": "jira",
                "options": {"browser": true},
                "positional": ["ABC-1"],
                "config": {"host": "jira.example.com"}
            })
        );
    }

    #[tokio::test]
    async fn run_reports_non_zero_exit() {
        let temp = TempDir::new().unwrap();
        let body = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--describe\" ]; then\n  echo '{DESCRIBE}'\n  exit 0\nfi\ncat > /dev/null\nexit 1\n"
        );
        install(temp.path(), "gh-jira/gh-jira", &body);
        let command = ExternalCommand::load("jira", Some(temp.path())).await.unwrap();

        let result = command
            .run(&RunContext::new(Arc::new(Config::new())), ResolvedOptions::new())
            .await;
        assert!(matches!(result, Err(CommandError::Execution { .. })));
    }
}
