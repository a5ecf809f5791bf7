//! Error types for command resolution, option parsing and plugin loading.

/// A boxed error raised by a command body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving or running a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No command or alias matches the requested name.
    #[error("command not found: {name}")]
    CommandNotFound {
        /// The name that was requested.
        name: String,
    },

    /// More than one command answers to the requested name.
    #[error("command {name:?} is ambiguous, it matches: {}", .candidates.join(", "))]
    AmbiguousCommand {
        /// The name that was requested.
        name: String,
        /// Full names of every matching command.
        candidates: Vec<String>,
    },

    /// A flag is unknown, lacks a value, or its value violates the declared
    /// type.
    #[error("invalid option --{option}: {reason}")]
    InvalidOption {
        /// The canonical option name (or the raw flag for unknown options).
        option: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A plugin could not be located, described or parsed.
    #[error("failed to load plugin {plugin}: {reason}")]
    PluginLoad {
        /// The plugin name, prefix stripped.
        plugin: String,
        /// What went wrong.
        reason: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// A command body failed.
    #[error("{command} failed: {source}")]
    Execution {
        /// The command that failed.
        command: String,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] gh_config::ConfigError),
}

impl CommandError {
    /// Creates an [`CommandError::InvalidOption`].
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`CommandError::PluginLoad`] without an underlying error.
    pub fn plugin_load(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PluginLoad {
            plugin: plugin.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Wraps a command body failure.
    pub fn execution(command: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Execution {
            command: command.into(),
            source: source.into(),
        }
    }
}

/// A specialized Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_ambiguous() {
        let err = CommandError::AmbiguousCommand {
            name: "re".to_string(),
            candidates: vec!["repo".to_string(), "release".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"command "re" is ambiguous, it matches: repo, release"#
        );
    }

    #[test]
    fn error_display_invalid_option() {
        let err = CommandError::invalid_option("type", "expected one of: all, owner");
        assert_eq!(
            err.to_string(),
            "invalid option --type: expected one of: all, owner"
        );
    }

    #[test]
    fn error_display_execution() {
        let err = CommandError::execution("repo", "boom");
        assert_eq!(err.to_string(), "repo failed: boom");
    }
}
