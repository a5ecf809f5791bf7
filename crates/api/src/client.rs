//! GitHub API client implementation.
//!
//! This module provides the [`GitHubClient`] struct, a thin wrapper over
//! [`Octocrab`] pointed at either github.com or a GitHub Enterprise host.

use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Base URL of the public GitHub API.
pub const PUBLIC_API_URL: &str = "https://api.github.com";

/// GitHub API client with optional authentication.
///
/// Read operations work without a token. Creating, deleting and assigning
/// need one and fail with [`Error::Unauthenticated`] otherwise.
///
/// # Security
///
/// Tokens are stored using [`SecretString`] to prevent accidental logging
/// or exposure in debug output.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use gh_api::GitHubClient;
///
/// # async fn example() -> gh_api::Result<()> {
/// let token = SecretString::from("ghp_your_token".to_string());
/// let client = GitHubClient::new(Some(token), "https://github.example.com/api/v3").await?;
/// assert!(client.is_authenticated());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitHubClient {
    /// The underlying octocrab client.
    inner: Octocrab,
    /// Whether this client is authenticated.
    authenticated: bool,
}

impl GitHubClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if `base_url` is not a valid URI or the
    /// octocrab client fails to initialize.
    #[instrument(skip(token), fields(authenticated = token.is_some()))]
    pub async fn new(token: Option<SecretString>, base_url: &str) -> Result<Self> {
        let builder = Octocrab::builder().base_uri(base_url).map_err(Error::Api)?;

        let (inner, authenticated) = match token {
            Some(token) => {
                debug!("creating authenticated GitHub client");
                let client = builder
                    .personal_token(token.expose_secret())
                    .build()
                    .map_err(Error::Api)?;
                (client, true)
            }
            None => {
                debug!("creating unauthenticated GitHub client");
                (builder.build().map_err(Error::Api)?, false)
            }
        };

        Ok(Self {
            inner,
            authenticated,
        })
    }

    /// Returns whether this client was created with a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns a reference to the underlying octocrab client.
    #[must_use]
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }

    pub(crate) fn require_token(&self, operation: &'static str) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::Unauthenticated { operation })
        }
    }
}
