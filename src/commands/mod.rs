//! Built-in commands.
//!
//! Each command is a [`Command`](gh_command::Command) implementation holding
//! its own descriptor. Bodies are thin: they translate resolved options into
//! GitHub API calls and print the result.

pub mod hello;
pub mod help;
pub mod issue;
pub mod repo;

use gh_api::GitHubClient;
use gh_command::{CommandCatalog, CommandError, ResolvedOptions};
use gh_config::Config;
use secrecy::SecretString;

pub use help::HelpCommand;

/// Builds the catalog of built-in commands, help excluded.
///
/// Help is registered by the dispatcher once it knows the full listing.
pub fn builtin_catalog() -> CommandCatalog {
    CommandCatalog::new()
        .with(hello::HelloCommand::new())
        .with(repo::RepoCommand::new())
        .with(issue::IssueCommand::new())
}

/// Creates an API client from the configured host and credentials.
pub async fn client(command: &str, config: &Config) -> gh_command::Result<GitHubClient> {
    let token = config
        .github_token()
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::from(token.to_string()));

    GitHubClient::new(token, &config.api_base_url())
        .await
        .map_err(|e| CommandError::execution(command, e))
}

/// Returns a string option or fails naming the missing flag.
pub fn required<'a>(options: &'a ResolvedOptions, name: &str) -> gh_command::Result<&'a str> {
    options
        .string(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CommandError::invalid_option(name, "is required"))
}
