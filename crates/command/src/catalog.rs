//! The command catalog: registration, resolution and help grouping.

use std::sync::Arc;

use async_trait::async_trait;
use gh_config::Config;
use tracing::debug;

use crate::descriptor::CommandDescriptor;
use crate::error::{CommandError, Result};
use crate::options::ResolvedOptions;

/// Name of the help command, left out of [`CommandCatalog::discover`].
pub const HELP_COMMAND: &str = "help";

/// Everything a command body receives besides its options.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The merged configuration, loaded under the command's plugin scope
    /// for external plugins.
    pub config: Arc<Config>,
}

impl RunContext {
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

/// A runnable command: a descriptor plus a body.
///
/// Built-in commands and external plugins implement this the same way, so
/// the dispatcher never needs to know where a command came from.
#[async_trait]
pub trait Command: Send + Sync {
    /// Returns the command's metadata.
    fn descriptor(&self) -> &CommandDescriptor;

    /// Runs the command body with fully resolved options.
    ///
    /// # Errors
    ///
    /// Implementations report body failures as
    /// [`CommandError::Execution`].
    async fn run(&self, ctx: &RunContext, options: ResolvedOptions) -> Result<()>;

    /// Returns the plugin whose configuration scope the command runs under.
    ///
    /// Built-in commands run unscoped.
    fn plugin_scope(&self) -> Option<&str> {
        None
    }
}

/// One row of a command's help listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub option: String,
    pub shorthand: Option<String>,
    pub type_label: String,
}

/// Every command known to this invocation, in registration order.
#[derive(Clone, Default)]
pub struct CommandCatalog {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command to the catalog.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        debug!(command = %command.descriptor().name, "registering command");
        self.commands.push(command);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.register(Arc::new(command));
        self
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Lists the descriptor of every registered command except `help`, in
    /// registration order.
    pub fn discover(&self) -> Vec<&CommandDescriptor> {
        self.commands
            .iter()
            .map(|command| command.descriptor())
            .filter(|descriptor| descriptor.name != HELP_COMMAND)
            .collect()
    }

    /// Finds the command whose name or alias is `name`.
    ///
    /// Names and aliases share one namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::CommandNotFound`] when nothing matches and
    /// [`CommandError::AmbiguousCommand`] when several commands do.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_command::{CommandCatalog, CommandError};
    ///
    /// let catalog = CommandCatalog::new();
    /// assert!(matches!(
    ///     catalog.resolve("repo"),
    ///     Err(CommandError::CommandNotFound { .. })
    /// ));
    /// ```
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Command>> {
        let mut matches = self
            .commands
            .iter()
            .filter(|command| command.descriptor().answers_to(name));

        let Some(first) = matches.next() else {
            return Err(CommandError::CommandNotFound {
                name: name.to_string(),
            });
        };

        let rest: Vec<_> = matches.collect();
        if !rest.is_empty() {
            let candidates = std::iter::once(first)
                .chain(rest)
                .map(|command| command.descriptor().name.clone())
                .collect();
            return Err(CommandError::AmbiguousCommand {
                name: name.to_string(),
                candidates,
            });
        }

        Ok(Arc::clone(first))
    }

    /// Returns whether any command answers to `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands
            .iter()
            .any(|command| command.descriptor().answers_to(name))
    }
}

/// Pairs every declared option with its shorthand and type label.
///
/// A shorthand belongs to an option when the first token of its expansion,
/// with the leading `--` removed, is exactly the option name.
///
/// # Examples
///
/// ```
/// use gh_command::{CommandDescriptor, OptionGroup, OptionType, group_options};
///
/// let hello = CommandDescriptor::new("hello")
///     .option("world", OptionType::Boolean)
///     .shorthand("w", ["--world"]);
///
/// assert_eq!(
///     group_options(&hello),
///     vec![OptionGroup {
///         option: "world".to_string(),
///         shorthand: Some("w".to_string()),
///         type_label: "Boolean".to_string(),
///     }]
/// );
/// ```
#[must_use]
pub fn group_options(descriptor: &CommandDescriptor) -> Vec<OptionGroup> {
    descriptor
        .options
        .iter()
        .map(|spec| OptionGroup {
            option: spec.name.clone(),
            shorthand: descriptor
                .shorthands
                .iter()
                .find(|shorthand| shorthand.target() == Some(spec.name.as_str()))
                .map(|shorthand| shorthand.flag.clone()),
            type_label: spec.kind.label(),
        })
        .collect()
}
