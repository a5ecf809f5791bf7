//! Global command-line flags.
//!
//! Only the flags shared by every command are parsed here. Everything from
//! the command name on is passed through untouched, since each command
//! declares its own options.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "gh",
    version,
    about = "GitHub command line tools",
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// List commands and their options.
    #[arg(long, short = 'h')]
    pub help: bool,

    /// The command to run and its arguments.
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_command_arguments_through() {
        let cli = Cli::parse_from(["gh", "--verbose", "repo", "-l", "--type", "owner"]);
        assert!(cli.verbose);
        assert_eq!(cli.args, ["repo", "-l", "--type", "owner"]);
    }

    #[test]
    fn help_flag_is_ours() {
        let cli = Cli::parse_from(["gh", "-h"]);
        assert!(cli.help);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn flags_after_command_belong_to_command() {
        let cli = Cli::parse_from(["gh", "hello", "--help"]);
        assert!(!cli.help);
        assert_eq!(cli.args, ["hello", "--help"]);
    }

    #[test]
    fn no_arguments() {
        let cli = Cli::parse_from(["gh"]);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
