//! `gh issue`: issue assignment.

use async_trait::async_trait;
use gh_command::{
    Command, CommandDescriptor, CommandError, OptionType, ResolvedOptions, Result, RunContext,
};

use crate::commands::{client, required};
use crate::hooks::{self, Phase};

const NAME: &str = "issue";

pub struct IssueCommand {
    descriptor: CommandDescriptor,
}

impl IssueCommand {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(NAME)
                .alias("is")
                .description("Provides a set of util commands to work with Issues.")
                .option("assign", OptionType::Boolean)
                .option("number", OptionType::String)
                .option("assignee", OptionType::String)
                .option("user", OptionType::String)
                .option("repo", OptionType::String)
                .shorthand("a", ["--assign"])
                .shorthand("N", ["--number"])
                .shorthand("A", ["--assignee"])
                .shorthand("u", ["--user"])
                .shorthand("r", ["--repo"]),
        }
    }
}

/// Parses a comma separated list of issue numbers such as `12,15`.
fn issue_numbers(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_start_matches('#').parse::<u64>().map_err(|_| {
                CommandError::invalid_option("number", format!("{part:?} is not an issue number"))
            })
        })
        .collect::<Result<Vec<_>>>()
        .and_then(|numbers| {
            if numbers.is_empty() {
                Err(CommandError::invalid_option("number", "is required"))
            } else {
                Ok(numbers)
            }
        })
}

#[async_trait]
impl Command for IssueCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &RunContext, options: ResolvedOptions) -> Result<()> {
        if !options.flag("assign") {
            return Ok(());
        }

        let numbers = issue_numbers(required(&options, "number")?)?;
        let assignee = required(&options, "assignee")?;
        let user = required(&options, "user")?;
        let repo = required(&options, "repo")?;

        hooks::invoke(&ctx.config, "issue.assign", Phase::Before, &options).await;

        let client = client(NAME, &ctx.config).await?;
        for number in numbers {
            println!("Assigning issue #{number} on {user}/{repo} to {assignee}");
            let issue = client
                .assign_issue(user, repo, number, assignee)
                .await
                .map_err(|e| CommandError::execution(NAME, e))?;
            println!("{}", issue.html_url);
        }

        hooks::invoke(&ctx.config, "issue.assign", Phase::After, &options).await;
        Ok(())
    }
}
