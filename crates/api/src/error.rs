//! Error types for GitHub API operations.

/// Errors that can occur during GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error occurred while calling the GitHub API.
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// The operation needs a token and the client has none.
    #[error("{operation} requires authentication, set github_token in your config")]
    Unauthenticated {
        /// What was attempted.
        operation: &'static str,
    },

    /// The request is not allowed for the current user.
    ///
    /// Raised before any call is made, for example when listing another
    /// user's private repositories.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the request was refused.
        reason: String,
    },
}

/// A specialized Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, Error>;
