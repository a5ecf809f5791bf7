//! Command resolution for gh.
//!
//! This crate turns a command name and a raw argument vector into a
//! runnable [`Command`] and its [`ResolvedOptions`].
//!
//! # Overview
//!
//! - [`descriptor`]: [`CommandDescriptor`], option types and shorthands
//! - [`catalog`]: [`CommandCatalog`], the [`Command`] trait and help grouping
//! - [`expand`]: [`OptionExpander`], shorthand expansion and coercion
//! - [`options`]: [`ResolvedOptions`], the typed result of expansion
//! - [`external`]: [`ExternalCommand`], commands backed by plugin executables
//! - [`error`]: Error types for command operations
//!
//! # Examples
//!
//! ```
//! use gh_command::{CommandDescriptor, OptionExpander, OptionType, group_options};
//!
//! let hello = CommandDescriptor::new("hello")
//!     .alias("he")
//!     .option("world", OptionType::Boolean)
//!     .shorthand("w", ["--world"]);
//!
//! let options = OptionExpander::expand(&hello, &["-w".to_string()]).unwrap();
//! assert!(options.flag("world"));
//!
//! let groups = group_options(&hello);
//! assert_eq!(groups[0].shorthand.as_deref(), Some("w"));
//! ```

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod expand;
pub mod external;
pub mod options;

// Re-export primary types at crate root for convenience
pub use catalog::{Command, CommandCatalog, HELP_COMMAND, OptionGroup, RunContext, group_options};
pub use descriptor::{CommandDescriptor, DescriptorManifest, OptionSpec, OptionType, Shorthand};
pub use error::{CommandError, Result};
pub use expand::OptionExpander;
pub use external::ExternalCommand;
pub use options::{OptionValue, ResolvedOptions, StreamSource};
