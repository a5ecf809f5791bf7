//! `gh repo`: open, create, delete and list repositories.

use async_trait::async_trait;
use gh_api::{NewRepo, Repo, RepoListType};
use gh_command::{
    Command, CommandDescriptor, CommandError, OptionType, ResolvedOptions, Result, RunContext,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::commands::{client, required};
use crate::hooks::{self, Phase};

const NAME: &str = "repo";

pub struct RepoCommand {
    descriptor: CommandDescriptor,
}

impl RepoCommand {
    pub fn new() -> Self {
        let types = RepoListType::ALL
            .into_iter()
            .map(|kind| kind.as_str().to_string())
            .collect();

        Self {
            descriptor: CommandDescriptor::new(NAME)
                .alias("re")
                .description("Provides a set of util commands to work with Repositories.")
                .option("browser", OptionType::Boolean)
                .option("clone", OptionType::Boolean)
                .option("delete", OptionType::String)
                .option("description", OptionType::String)
                .option("detailed", OptionType::Boolean)
                .option("gitignore", OptionType::String)
                .option("homepage", OptionType::String)
                .option("init", OptionType::Boolean)
                .option("list", OptionType::Boolean)
                .option("new", OptionType::String)
                .option("private", OptionType::Boolean)
                .option("repo", OptionType::String)
                .option("type", OptionType::OneOf(types))
                .option("user", OptionType::String)
                .shorthand("B", ["--browser"])
                .shorthand("c", ["--clone"])
                .shorthand("D", ["--delete"])
                .shorthand("d", ["--detailed"])
                .shorthand("l", ["--list"])
                .shorthand("n", ["--new"])
                .shorthand("p", ["--private"])
                .shorthand("r", ["--repo"])
                .shorthand("t", ["--type"])
                .shorthand("u", ["--user"])
                .payload(|_, options| options.set_flag("browser", true)),
        }
    }
}

#[async_trait]
impl Command for RepoCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &RunContext, options: ResolvedOptions) -> Result<()> {
        if options.flag("browser") {
            browse(ctx, &options)?;
        }

        if options.is_set("delete") {
            delete(ctx, &options).await?;
        }

        if options.flag("list") {
            list(ctx, &options).await?;
        }

        if options.is_set("new") {
            create(ctx, &options).await?;
        }

        Ok(())
    }
}

fn logged_user(options: &ResolvedOptions) -> Result<&str> {
    options.logged_user().ok_or_else(|| {
        CommandError::execution(NAME, "github_user is not set, add it to your config")
    })
}

/// The repository named by `--repo`, or else the first bare argument.
fn target_repo(options: &ResolvedOptions) -> Result<&str> {
    options
        .string("repo")
        .or_else(|| options.positional().first().map(String::as_str))
        .ok_or_else(|| CommandError::invalid_option("repo", "is required"))
}

/// Returns the web URL of `user/repo` under `github_host`.
fn web_url(github_host: &str, user: &str, repo: &str) -> String {
    format!("{}/{user}/{repo}", github_host.trim_end_matches('/'))
}

fn browse(ctx: &RunContext, options: &ResolvedOptions) -> Result<()> {
    let user = required(options, "user")?;
    let repo = target_repo(options)?;
    let host = ctx.config.github_host().unwrap_or("https://github.com/");

    let url = web_url(host, user, repo);
    debug!(%url, "opening repository in browser");
    open::that(&url).map_err(|e| CommandError::execution(NAME, e))
}

async fn delete(ctx: &RunContext, options: &ResolvedOptions) -> Result<()> {
    let owner = logged_user(options)?;
    let repo = required(options, "delete")?;

    hooks::invoke(&ctx.config, "repo.delete", Phase::Before, options).await;
    println!("Deleting repo {owner}/{repo}");

    let confirmed = confirm("Are you sure? This action CANNOT be undone. [y/N] ")
        .await
        .map_err(|e| CommandError::execution(NAME, e))?;
    if !confirmed {
        println!("Not deleted.");
        return Ok(());
    }

    client(NAME, &ctx.config)
        .await?
        .delete_repo(owner, repo)
        .await
        .map_err(|e| CommandError::execution(NAME, e))?;
    println!("Deleted {owner}/{repo}");

    hooks::invoke(&ctx.config, "repo.delete", Phase::After, options).await;
    Ok(())
}

async fn list(ctx: &RunContext, options: &ResolvedOptions) -> Result<()> {
    let user = required(options, "user")?;
    let kind: RepoListType = options
        .string("type")
        .unwrap_or_default()
        .parse()
        .unwrap_or_default();

    info!(%kind, %user, "listing repositories");
    let repos = client(NAME, &ctx.config)
        .await?
        .list_repos(user, kind, options.logged_user())
        .await
        .map_err(|e| CommandError::execution(NAME, e))?;

    for repo in &repos {
        println!("{}", format_repo(repo, options.flag("detailed")));
    }
    Ok(())
}

fn format_repo(repo: &Repo, detailed: bool) -> String {
    let mut line = repo.full_name.clone();
    if repo.private {
        line.push_str(" (private)");
    }
    if detailed {
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!("\n    {description}"));
        }
        line.push_str(&format!("\n    {}", repo.html_url));
    }
    line
}

/// Builds the creation request; a gitignore template implies an initial
/// commit.
fn new_repo(options: &ResolvedOptions) -> Result<NewRepo> {
    let mut repo = NewRepo::new(required(options, "new")?)
        .description(options.string("description").unwrap_or_default())
        .homepage(options.string("homepage").unwrap_or_default())
        .private(options.flag("private"))
        .init(options.flag("init"));
    if let Some(template) = options.string("gitignore").filter(|t| !t.is_empty()) {
        repo = repo.gitignore(template);
    }
    Ok(repo)
}

async fn create(ctx: &RunContext, options: &ResolvedOptions) -> Result<()> {
    let owner = logged_user(options)?;
    let request = new_repo(options)?;

    hooks::invoke(&ctx.config, "repo.new", Phase::Before, options).await;
    println!("Creating a new repo on {owner}/{}", request.name);

    let created = client(NAME, &ctx.config)
        .await?
        .create_repo(&request)
        .await
        .map_err(|e| CommandError::execution(NAME, e))?;
    println!("{}", created.html_url);

    if options.flag("clone") {
        if let Some(url) = created.ssh_url.as_deref() {
            git_clone(url).await?;
        }
    }

    hooks::invoke(&ctx.config, "repo.new", Phase::After, options).await;
    Ok(())
}

async fn git_clone(url: &str) -> Result<()> {
    debug!(%url, "cloning repository");
    let status = tokio::process::Command::new("git")
        .args(["clone", url])
        .status()
        .await
        .map_err(|e| CommandError::execution(NAME, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::execution(NAME, format!("git clone exited with {status}")))
    }
}

async fn confirm(prompt: &str) -> std::io::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
