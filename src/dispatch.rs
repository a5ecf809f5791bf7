//! Maps an argument vector to a command and runs it.
//!
//! Resolution order for `gh <name> [args...]`:
//!
//! 1. `help`, or no name at all: the help listing.
//! 2. A built-in command or installed, non-ignored plugin whose name or
//!    alias is `name`. Both share one namespace, so a name claimed by two
//!    commands is ambiguous.
//! 3. An executable `gh-<name>` on `PATH`.
//!
//! Plugins run with their configuration loaded under the plugin's scope.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use gh_command::{
    Command, CommandCatalog, CommandError, ExternalCommand, HELP_COMMAND, OptionExpander,
    RunContext,
};
use gh_config::{ConfigStore, plugin_basename};
use tracing::{debug, instrument, warn};

use crate::commands::{HelpCommand, builtin_catalog};

/// Flags that ask for help on a single command, e.g. `gh repo --help`.
const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// A plugin together with the outcome of describing it.
type LoadedPlugin = (String, gh_command::Result<ExternalCommand>);

/// Owns the config store and the command catalog for one invocation.
pub struct Dispatcher {
    store: ConfigStore,
    catalog: CommandCatalog,
}

impl Dispatcher {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            catalog: builtin_catalog(),
        }
    }

    /// Resolves and runs the command named by `argv[0]`.
    #[instrument(skip(self))]
    pub async fn dispatch(&mut self, argv: &[String]) -> anyhow::Result<()> {
        let Some((name, rest)) = argv.split_first() else {
            return self.help(None).await;
        };

        if name == HELP_COMMAND {
            return self.help(rest.first().map(String::as_str)).await;
        }
        if wants_help(rest) {
            return self.help(Some(name)).await;
        }

        let command = self.resolve(name).await?;
        let scope = command.plugin_scope().map(str::to_string);
        self.run(command, scope.as_deref(), rest).await
    }

    /// Prints the help listing, optionally narrowed to one command.
    pub async fn help(&mut self, only: Option<&str>) -> anyhow::Result<()> {
        let mut entries: Vec<_> = self.catalog.discover().into_iter().cloned().collect();
        for (plugin, loaded) in self.installed_commands().await? {
            match loaded {
                Ok(command) => entries.push(command.descriptor().clone()),
                Err(err) => warn!(%plugin, error = %err, "skipping plugin"),
            }
        }

        let help: Arc<dyn Command> = Arc::new(HelpCommand::new(entries));
        let argv: Vec<String> = only.into_iter().map(str::to_string).collect();
        self.run(help, None, &argv).await
    }

    /// Finds the command answering to `name` among built-ins and plugins.
    ///
    /// An installed plugin that fails to describe itself is reported when
    /// it is asked for by name.
    async fn resolve(&mut self, name: &str) -> anyhow::Result<Arc<dyn Command>> {
        let mut catalog = self.catalog.clone();
        let mut failed = Vec::new();
        for (plugin, loaded) in self.installed_commands().await? {
            match loaded {
                Ok(command) => catalog.register(Arc::new(command)),
                Err(err) => failed.push((plugin, err)),
            }
        }

        match catalog.resolve(name) {
            Ok(command) => return Ok(command),
            Err(CommandError::CommandNotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        let plugin = plugin_basename(name);
        if let Some(index) = failed.iter().position(|(candidate, _)| candidate == plugin) {
            let (_, err) = failed.swap_remove(index);
            return Err(err.into());
        }

        let command = self.load_from_path(plugin).await?;
        Ok(Arc::new(command))
    }

    /// Loads a plugin that is not installed but may be on `PATH`.
    ///
    /// Ignored plugins and plugins that cannot be found are reported as
    /// unknown commands.
    async fn load_from_path(&mut self, plugin: &str) -> anyhow::Result<ExternalCommand> {
        let not_found = || CommandError::CommandNotFound {
            name: plugin.to_string(),
        };

        if self.store.is_plugin_ignored(plugin).await? {
            debug!(plugin, "plugin is ignored");
            return Err(not_found().into());
        }

        let plugins_dir = self.plugins_dir().await?;
        ExternalCommand::load(plugin, plugins_dir.as_deref())
            .await
            .map_err(|err| {
                debug!(plugin, error = %err, "no such plugin");
                anyhow::Error::from(not_found())
            })
    }

    /// Describes every installed, non-ignored plugin.
    async fn installed_commands(&mut self) -> anyhow::Result<Vec<LoadedPlugin>> {
        let plugins_dir = self.plugins_dir().await?;
        let mut loaded = Vec::new();

        for plugin in self.store.installed_plugins().await? {
            if self.store.is_plugin_ignored(&plugin).await? {
                debug!(%plugin, "plugin is ignored");
                continue;
            }
            let command = ExternalCommand::load(&plugin, plugins_dir.as_deref()).await;
            loaded.push((plugin, command));
        }

        Ok(loaded)
    }

    async fn plugins_dir(&mut self) -> anyhow::Result<Option<PathBuf>> {
        Ok(self.store.resolve_plugins_directory().await?)
    }

    /// Expands options against the command's schema and runs its body.
    async fn run(
        &mut self,
        command: Arc<dyn Command>,
        scope: Option<&str>,
        args: &[String],
    ) -> anyhow::Result<()> {
        let config = self
            .store
            .load(scope)
            .await
            .context("failed to load configuration")?;

        let descriptor = command.descriptor();
        let mut options = OptionExpander::expand(descriptor, args)?;
        OptionExpander::inject_defaults(descriptor, &mut options, config.github_user());

        debug!(command = %descriptor.name, ?scope, "running command");
        command.run(&RunContext::new(config), options).await?;
        Ok(())
    }
}

/// Returns whether a help flag appears before any `--`.
fn wants_help(args: &[String]) -> bool {
    args.iter()
        .take_while(|arg| arg.as_str() != "--")
        .any(|arg| HELP_FLAGS.contains(&arg.as_str()))
}
