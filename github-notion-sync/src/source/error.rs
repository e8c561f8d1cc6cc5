//! Issue fetch error types.

use thiserror::Error;

/// Errors that can occur while fetching issues from GitHub.
#[derive(Debug, Error)]
pub enum SourceError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// Owner or repository name is empty.
    #[error("Invalid repository '{owner}/{repo}': owner and name must be non-empty")]
    InvalidRepository { owner: String, repo: String },

    /// The GraphQL endpoint reported errors.
    #[error("GitHub GraphQL error: {messages}")]
    GraphQl { messages: String },

    /// The response carried no repository.
    #[error("Repository {owner}/{repo} not found or not accessible")]
    RepositoryNotFound { owner: String, repo: String },

    /// The response did not have the expected shape.
    #[error("Malformed GitHub response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The source reported more pages but gave no cursor.
    #[error("GitHub reported more issues but returned no cursor")]
    MissingCursor,

    /// The source handed back the cursor it was given.
    #[error("Pagination did not advance past cursor {cursor}")]
    CursorDidNotAdvance { cursor: String },
}
