//! GitHub GraphQL issue fetcher.

use crate::config::FetchLimits;
use crate::source::response::parse_page;
use crate::source::{IssuePage, IssueSource, SourceError};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::json;
use tracing::debug;

/// Issues are walked from the newest backwards: `last: N, before: cursor`,
/// with `startCursor`/`hasPreviousPage` pointing at the next page.
const ISSUES_QUERY: &str = r"
query issues($repoName: String!, $repoOwner: String!, $before: String, $issuePagination: Int!, $labelCutoff: Int!, $commentCutoff: Int!, $assigneeCutoff: Int!) {
  repository(name: $repoName, owner: $repoOwner) {
    issues(last: $issuePagination, before: $before) {
      pageInfo {
        startCursor
        hasPreviousPage
      }
      edges {
        node {
          assignees(last: $assigneeCutoff) {
            nodes {
              login
            }
          }
          labels(last: $labelCutoff) {
            nodes {
              name
            }
          }
          body
          title
          url
          state
          comments(last: $commentCutoff) {
            nodes {
              author {
                login
                url
              }
              body
              url
            }
          }
        }
      }
    }
  }
}
";

/// Fetches issue pages through the GitHub GraphQL API.
#[derive(Debug, Clone)]
pub struct GitHubIssueSource {
    octocrab: Octocrab,
    limits: FetchLimits,
}

impl GitHubIssueSource {
    /// Creates a fetcher using an authenticated client.
    pub fn new(octocrab: Octocrab, limits: FetchLimits) -> Self {
        Self { octocrab, limits }
    }
}

/// Builds the GraphQL request body for one page.
fn issues_payload(
    owner: &str,
    repo: &str,
    cursor: Option<&str>,
    limits: &FetchLimits,
) -> serde_json::Value {
    json!({
        "query": ISSUES_QUERY,
        "variables": {
            "repoName": repo,
            "repoOwner": owner,
            "before": cursor,
            "issuePagination": limits.page_size,
            "labelCutoff": limits.labels,
            "commentCutoff": limits.comments,
            "assigneeCutoff": limits.assignees,
        }
    })
}

fn check_repository(owner: &str, repo: &str) -> Result<(), SourceError> {
    if owner.trim().is_empty() || repo.trim().is_empty() {
        return Err(SourceError::InvalidRepository {
            owner: owner.to_string(),
            repo: repo.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl IssueSource for GitHubIssueSource {
    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        cursor: Option<&str>,
    ) -> Result<IssuePage, SourceError> {
        check_repository(owner, repo)?;

        debug!(owner, repo, cursor, "Fetching issue page");
        let raw: serde_json::Value = self
            .octocrab
            .graphql(&issues_payload(owner, repo, cursor, &self.limits))
            .await?;
        parse_page(raw, owner, repo, &self.limits)
    }
}
