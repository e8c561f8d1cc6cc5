//! GraphQL fetch limits.

/// Largest `first`/`last` argument GitHub accepts on a connection.
pub const MAX_CONNECTION_SIZE: u32 = 100;

/// Page size and nested-collection cutoffs used when fetching issues.
///
/// Issues carrying more assignees, labels or comments than the matching
/// cutoff are truncated to the most recent items. The fetcher reports
/// collections that hit a cutoff exactly, since they were likely truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Issues per page.
    pub page_size: u32,
    /// Assignees fetched per issue.
    pub assignees: u32,
    /// Labels fetched per issue.
    pub labels: u32,
    /// Comments fetched per issue.
    pub comments: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            page_size: 50,
            assignees: 50,
            labels: 50,
            comments: 100,
        }
    }
}
