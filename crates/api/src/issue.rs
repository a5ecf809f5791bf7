//! Issue assignment.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::GitHubClient;
use crate::error::{Error, Result};

/// An issue as returned by the API, trimmed to what gh prints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
}

#[derive(Debug, Serialize)]
struct AssignRequest<'a> {
    assignees: [&'a str; 1],
}

impl GitHubClient {
    /// Makes `assignee` the sole assignee of issue `number` in
    /// `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] without a token and
    /// [`Error::Api`] if the request fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gh_api::GitHubClient;
    /// use secrecy::SecretString;
    ///
    /// # async fn example() -> gh_api::Result<()> {
    /// let token = SecretString::from("ghp_xxx".to_string());
    /// let client = GitHubClient::new(Some(token), gh_api::PUBLIC_API_URL).await?;
    ///
    /// let issue = client.assign_issue("octocat", "hello-world", 42, "hubot").await?;
    /// println!("{}", issue.html_url);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub async fn assign_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignee: &str,
    ) -> Result<Issue> {
        self.require_token("assigning an issue")?;

        let url = format!("/repos/{owner}/{repo}/issues/{number}");
        let body = AssignRequest {
            assignees: [assignee],
        };

        let issue: Issue = self
            .inner()
            .patch(&url, Some(&body))
            .await
            .map_err(Error::Api)?;

        debug!(title = %issue.title, "assigned issue");
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assign_request_body() {
        let body = AssignRequest {
            assignees: ["hubot"],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"assignees": ["hubot"]})
        );
    }

    #[tokio::test]
    async fn assign_requires_token() {
        let client = GitHubClient::new(None, crate::PUBLIC_API_URL).await.unwrap();
        let result = client.assign_issue("octocat", "gh", 1, "hubot").await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }
}
