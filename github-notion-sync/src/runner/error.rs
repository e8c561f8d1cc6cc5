//! Runner error types.

/// Errors that can occur during an import run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The comment header template does not compile.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Fetching issues failed.
    #[error(transparent)]
    Source(#[from] crate::source::SourceError),

    /// Reading or writing the database schema failed, or the Notion client
    /// could not be built.
    #[error(transparent)]
    Destination(#[from] crate::destination::DestinationError),

    /// Importing an issue failed.
    #[error("Failed to import {url}: {source}")]
    Upsert {
        url: String,
        #[source]
        source: crate::records::UpsertError,
    },
}

impl RunnerError {
    /// Returns true if the run failed before any network call.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Template(_))
    }
}
