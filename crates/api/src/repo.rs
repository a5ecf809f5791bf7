//! Repository creation, deletion and listing.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::GitHubClient;
use crate::error::{Error, Result};

/// Characters escaped in a user name used as a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Which repositories to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepoListType {
    #[default]
    All,
    Member,
    Owner,
    Public,
    Private,
}

impl RepoListType {
    /// Every variant, in the order shown in help output.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Member,
        Self::Owner,
        Self::Public,
        Self::Private,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Member => "member",
            Self::Owner => "owner",
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Returns whether the listing only makes sense for the logged user.
    #[must_use]
    pub fn is_own_only(self) -> bool {
        matches!(self, Self::Public | Self::Private)
    }
}

impl fmt::Display for RepoListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoListType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown repository type {s:?}"))
    }
}

/// The body of a repository creation request.
///
/// # Examples
///
/// ```
/// use gh_api::NewRepo;
///
/// let repo = NewRepo::new("dotfiles").gitignore("Rust").private(true);
/// assert!(repo.auto_init);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewRepo {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub private: bool,
    pub auto_init: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitignore_template: Option<String>,
}

impl NewRepo {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    #[must_use]
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Creates the repository with an initial commit.
    #[must_use]
    pub fn init(mut self, init: bool) -> Self {
        self.auto_init = self.auto_init || init;
        self
    }

    /// Seeds a `.gitignore` from a GitHub template. Implies [`init`](Self::init).
    #[must_use]
    pub fn gitignore(mut self, template: impl Into<String>) -> Self {
        self.gitignore_template = Some(template.into());
        self.auto_init = true;
        self
    }
}

/// A repository as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub ssh_url: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Serialize)]
struct ListParams {
    #[serde(rename = "type")]
    kind: &'static str,
    per_page: u8,
}

impl GitHubClient {
    /// Creates a repository owned by the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] without a token and
    /// [`Error::Api`] if the request fails.
    #[instrument(skip(self, repo), fields(name = %repo.name))]
    pub async fn create_repo(&self, repo: &NewRepo) -> Result<Repo> {
        self.require_token("creating a repository")?;
        debug!(private = repo.private, auto_init = repo.auto_init, "creating repository");

        let created: Repo = self
            .inner()
            .post("/user/repos", Some(repo))
            .await
            .map_err(Error::Api)?;

        debug!(url = %created.html_url, "created repository");
        Ok(created)
    }

    /// Deletes `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] without a token and
    /// [`Error::Api`] if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_repo(&self, owner: &str, repo: &str) -> Result<()> {
        self.require_token("deleting a repository")?;
        self.inner()
            .repos(owner, repo)
            .delete()
            .await
            .map_err(Error::Api)?;
        debug!("deleted repository");
        Ok(())
    }

    /// Lists repositories of `user`.
    ///
    /// Public and private listings go through the authenticated endpoint
    /// and are only available for the logged user's own repositories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] when asking for another user's public
    /// or private listing, and [`Error::Api`] if the request fails.
    #[instrument(skip(self, logged_user))]
    pub async fn list_repos(
        &self,
        user: &str,
        kind: RepoListType,
        logged_user: Option<&str>,
    ) -> Result<Vec<Repo>> {
        let route = list_route(user, kind, logged_user)?;
        let params = ListParams {
            kind: kind.as_str(),
            per_page: 100,
        };

        debug!(%route, "listing repositories");
        let repos: Vec<Repo> = self
            .inner()
            .get(&route, Some(&params))
            .await
            .map_err(Error::Api)?;

        debug!(count = repos.len(), "listed repositories");
        Ok(repos)
    }
}

/// Picks the listing endpoint for `user`.
fn list_route(user: &str, kind: RepoListType, logged_user: Option<&str>) -> Result<String> {
    if kind.is_own_only() {
        if logged_user != Some(user) {
            return Err(Error::Forbidden {
                reason: format!("you can only list {kind} repositories of your own"),
            });
        }
        return Ok("/user/repos".to_string());
    }

    let user = utf8_percent_encode(user, PATH_SEGMENT);
    Ok(format!("/users/{user}/repos"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_type_round_trips_through_str() {
        for kind in RepoListType::ALL {
            assert_eq!(kind.as_str().parse::<RepoListType>(), Ok(kind));
        }
        assert!("forks".parse::<RepoListType>().is_err());
    }

    #[test]
    fn new_repo_body() {
        let repo = NewRepo::new("dotfiles")
            .description("my dotfiles")
            .gitignore("Rust");
        assert_eq!(
            serde_json::to_value(&repo).unwrap(),
            json!({
                "name": "dotfiles",
                "description": "my dotfiles",
                "homepage": "",
                "private": false,
                "auto_init": true,
                "gitignore_template": "Rust"
            })
        );
    }

    #[test]
    fn new_repo_without_gitignore_omits_template() {
        let body = serde_json::to_value(NewRepo::new("gh").init(false)).unwrap();
        assert_eq!(body["auto_init"], json!(false));
        assert!(body.get("gitignore_template").is_none());
    }

    #[test]
    fn list_route_for_other_user() {
        assert_eq!(
            list_route("hubot", RepoListType::Owner, Some("octocat")).unwrap(),
            "/users/hubot/repos"
        );
        assert_eq!(
            list_route("my-org", RepoListType::All, None).unwrap(),
            "/users/my-org/repos"
        );
        assert_eq!(
            list_route("odd name", RepoListType::All, None).unwrap(),
            "/users/odd%20name/repos"
        );
    }

    #[test]
    fn private_listing_only_for_logged_user() {
        assert_eq!(
            list_route("octocat", RepoListType::Private, Some("octocat")).unwrap(),
            "/user/repos"
        );
        assert!(matches!(
            list_route("hubot", RepoListType::Public, Some("octocat")),
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            list_route("hubot", RepoListType::Private, None),
            Err(Error::Forbidden { .. })
        ));
    }

    #[test]
    fn repo_deserializes_with_missing_optionals() {
        let repo: Repo = serde_json::from_value(json!({
            "name": "gh",
            "full_name": "octocat/gh",
            "html_url": "https://github.com/octocat/gh"
        }))
        .unwrap();
        assert_eq!(repo.full_name, "octocat/gh");
        assert!(!repo.private);
        assert_eq!(repo.ssh_url, None);
    }
}
