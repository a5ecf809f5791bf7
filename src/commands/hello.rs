//! `gh hello`: the smallest possible command, kept as a template.

use async_trait::async_trait;
use gh_command::{Command, CommandDescriptor, OptionType, ResolvedOptions, Result, RunContext};

pub struct HelloCommand {
    descriptor: CommandDescriptor,
}

impl HelloCommand {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new("hello")
                .alias("he")
                .description("Hello world example. Copy to start a new command.")
                .option("world", OptionType::Boolean)
                .shorthand("w", ["--world"])
                .payload(|_, options| options.set_flag("world", true)),
        }
    }

    fn greeting(options: &ResolvedOptions) -> Option<&'static str> {
        options.flag("world").then_some("hello world :)")
    }
}

#[async_trait]
impl Command for HelloCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, _ctx: &RunContext, options: ResolvedOptions) -> Result<()> {
        if let Some(greeting) = Self::greeting(&options) {
            println!("{greeting}");
        }
        Ok(())
    }
}
