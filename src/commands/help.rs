//! `gh help`: lists every command and its options.

use async_trait::async_trait;
use gh_command::{
    Command, CommandDescriptor, CommandError, HELP_COMMAND, ResolvedOptions, Result, RunContext,
    group_options,
};

pub struct HelpCommand {
    descriptor: CommandDescriptor,
    entries: Vec<CommandDescriptor>,
}

impl HelpCommand {
    /// Creates the help command listing `entries` in the given order.
    pub fn new(entries: Vec<CommandDescriptor>) -> Self {
        Self {
            descriptor: CommandDescriptor::new(HELP_COMMAND)
                .description("List commands and their options."),
            entries,
        }
    }

    /// Renders the listing, narrowed to the command answering to `only`.
    fn render(&self, only: Option<&str>, user: Option<&str>) -> Result<String> {
        let entries: Vec<&CommandDescriptor> = match only {
            Some(name) => {
                let found: Vec<_> = self.entries.iter().filter(|d| d.answers_to(name)).collect();
                if found.is_empty() {
                    return Err(CommandError::CommandNotFound {
                        name: name.to_string(),
                    });
                }
                found
            }
            None => self.entries.iter().collect(),
        };

        let mut lines = Vec::new();
        if let Some(user) = user {
            lines.push(format!("Hi {user}!"));
        }
        lines.push("usage: gh <command> [payload] [--flags]".to_string());
        lines.push(String::new());

        for descriptor in entries {
            lines.push(match &descriptor.alias {
                Some(alias) => format!("{} ({alias})", descriptor.name),
                None => descriptor.name.clone(),
            });
            if !descriptor.description.is_empty() {
                lines.push(format!("  {}", descriptor.description));
            }
            for group in group_options(descriptor) {
                let flag = match &group.shorthand {
                    Some(short) => format!("-{short}, --{}", group.option),
                    None => format!("    --{}", group.option),
                };
                lines.push(format!("    {flag:<24} {}", group.type_label));
            }
            lines.push(String::new());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &RunContext, options: ResolvedOptions) -> Result<()> {
        let only = options.positional().first().map(String::as_str);
        print!("{}", self.render(only, ctx.config.github_user())?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builtin_catalog;

    fn help() -> HelpCommand {
        let catalog = builtin_catalog();
        HelpCommand::new(catalog.discover().into_iter().cloned().collect())
    }

    #[test]
    fn lists_every_command_with_options() {
        let listing = help().render(None, Some("octocat")).unwrap();
        assert!(listing.starts_with("Hi octocat!\n"));
        assert!(listing.contains("hello (he)\n"));
        assert!(listing.contains("repo (re)\n"));
        assert!(listing.contains("issue (is)\n"));
        assert!(listing.contains("-w, --world"));
        assert!(listing.contains("all|member|owner|public|private"));
    }

    #[test]
    fn narrows_to_one_command() {
        let listing = help().render(Some("he"), None).unwrap();
        assert!(listing.contains("hello (he)"));
        assert!(!listing.contains("repo (re)"));
    }

    #[test]
    fn entry_layout() {
        let listing = help().render(Some("hello"), None).unwrap();
        let expected = format!(
            "usage: gh <command> [payload] [--flags]\n\nhello (he)\n  {}\n    {:<24} Boolean\n\n",
            "Hello world example. Copy to start a new command.", "-w, --world"
        );
        assert_eq!(listing, expected);
    }

    #[test]
    fn unknown_command() {
        let result = help().render(Some("nope"), None);
        assert!(matches!(result, Err(CommandError::CommandNotFound { .. })));
    }
}
