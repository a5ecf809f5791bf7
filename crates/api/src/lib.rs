//! GitHub API client for gh.
//!
//! This crate wraps the handful of REST calls the built-in commands make:
//! repository creation, deletion and listing, and issue assignment.
//!
//! # Overview
//!
//! - [`GitHubClient`]: The API client with optional authentication
//! - [`NewRepo`], [`Repo`] and [`RepoListType`]: Repository operations
//! - [`Issue`]: Issue assignment
//! - [`Error`]: Error types for GitHub API operations
//!
//! # Authentication
//!
//! Tokens are handled using [`secrecy::SecretString`] to prevent accidental
//! logging of credentials. Without a token only read operations work.
//!
//! # Examples
//!
//! ```no_run
//! use gh_api::{GitHubClient, RepoListType};
//!
//! # async fn example() -> gh_api::Result<()> {
//! let client = GitHubClient::new(None, gh_api::PUBLIC_API_URL).await?;
//! for repo in client.list_repos("octocat", RepoListType::Owner, None).await? {
//!     println!("{}", repo.html_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod issue;
pub mod repo;

pub use client::{GitHubClient, PUBLIC_API_URL};
pub use error::{Error, Result};
pub use issue::Issue;
pub use repo::{NewRepo, Repo, RepoListType};
