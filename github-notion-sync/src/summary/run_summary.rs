//! Run summary types.

use crate::records::UpsertOutcome;
use serde::Serialize;
use std::fmt;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of issue pages fetched.
    pub pages_fetched: usize,

    /// Number of issues seen across all pages.
    pub issues_seen: usize,

    /// Number of records created.
    pub records_created: usize,

    /// Number of issues skipped because their record already exists.
    pub records_skipped: usize,

    /// Number of records a dry run would have created.
    pub records_would_create: usize,

    /// Number of comments replayed onto new records.
    pub comments_replayed: usize,

    /// Number of label options added to the database.
    pub labels_added: usize,

    /// Assignee logins with no Notion user, counted per issue.
    pub unresolved_assignees: usize,

    /// Nested collections that may have been cut off at the fetch limit.
    pub possibly_truncated: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with the outcome of one issue.
    pub fn record_outcome(&mut self, outcome: &UpsertOutcome) {
        self.unresolved_assignees += outcome.unresolved_assignees().len();
        match outcome {
            UpsertOutcome::Created { comments, .. } => {
                self.records_created += 1;
                self.comments_replayed += comments;
            }
            UpsertOutcome::Skipped { .. } => self.records_skipped += 1,
            UpsertOutcome::WouldCreate { .. } => self.records_would_create += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "[DRY RUN] " } else { "" };
        writeln!(f, "{prefix}Run complete")?;
        writeln!(f, "  Pages fetched:        {}", self.pages_fetched)?;
        writeln!(f, "  Issues seen:          {}", self.issues_seen)?;
        if self.dry_run {
            writeln!(f, "  Records to create:    {}", self.records_would_create)?;
        } else {
            writeln!(f, "  Records created:      {}", self.records_created)?;
            writeln!(f, "  Comments replayed:    {}", self.comments_replayed)?;
        }
        writeln!(f, "  Records skipped:      {}", self.records_skipped)?;
        writeln!(f, "  Labels added:         {}", self.labels_added)?;
        writeln!(f, "  Unmapped assignees:   {}", self.unresolved_assignees)?;
        write!(f, "  Possibly truncated:   {}", self.possibly_truncated)
    }
}
