//! Orchestrates issue imports.
//!
//! [`SyncDriver`] runs the import against any source and destination;
//! [`Runner`] wires it to GitHub and Notion from a [`SyncConfig`].

mod driver;
mod error;

pub use driver::SyncDriver;
pub use error::RunnerError;

use crate::config::SyncConfig;
use crate::destination::NotionClient;
use crate::source::GitHubIssueSource;
use crate::summary::RunSummary;
use octocrab::Octocrab;

/// Imports GitHub issues into the configured Notion database.
pub struct Runner {
    config: SyncConfig,
    source: GitHubIssueSource,
    destination: NotionClient,
}

impl Runner {
    /// Loads [`SyncConfig`] from the process environment and builds the
    /// clients from it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if a setting is missing or invalid.
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::new(SyncConfig::from_env()?)
    }

    /// Builds the GitHub and Notion clients from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if either client cannot be built.
    pub fn new(config: SyncConfig) -> Result<Self, RunnerError> {
        let octocrab = Octocrab::builder()
            .personal_token(config.github_token().to_string())
            .build()?;
        let source = GitHubIssueSource::new(octocrab, config.limits());
        let destination = NotionClient::new(&config)?;
        Ok(Self {
            config,
            source,
            destination,
        })
    }

    /// Imports every issue of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first failure; see [`SyncDriver::run`].
    pub async fn run(
        &self,
        owner: &str,
        repo: &str,
        dry_run: bool,
    ) -> Result<RunSummary, RunnerError> {
        SyncDriver::new(&self.source, &self.destination, &self.config)?
            .dry_run(dry_run)
            .run(owner, repo)
            .await
    }
}
