//! Label and repository option reconciliation.
//!
//! The destination's option sets only ever grow: values observed on the
//! source are appended in first-seen order, existing options keep their
//! position, and nothing is removed.

use crate::destination::{Destination, DestinationError, RepositoryRef, Taxonomy};
use crate::source::Issue;
use tracing::{debug, info};

/// Result of merging observed values into a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The merged taxonomy.
    pub taxonomy: Taxonomy,
    /// Labels that were not present before, in first-seen order.
    pub added_labels: Vec<String>,
    /// Whether the repository option was added.
    pub added_repo: bool,
}

impl Reconciliation {
    /// Returns true when the merge added anything.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.added_repo || !self.added_labels.is_empty()
    }
}

/// Unions `labels` (and the repository option, if any) into `current`.
pub fn reconcile<'a, I>(current: &Taxonomy, labels: I, repo: Option<&str>) -> Reconciliation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taxonomy = current.clone();
    let mut added_labels = Vec::new();

    for label in labels {
        if !taxonomy.labels.iter().any(|known| known == label) {
            taxonomy.labels.push(label.to_string());
            added_labels.push(label.to_string());
        }
    }

    let added_repo = match repo {
        Some(repo) if !taxonomy.repos.iter().any(|known| known == repo) => {
            taxonomy.repos.push(repo.to_string());
            true
        }
        _ => false,
    };

    Reconciliation {
        taxonomy,
        added_labels,
        added_repo,
    }
}

/// Keeps the destination's option sets in step with the issues being
/// imported.
pub struct TaxonomyReconciler<'a, D: ?Sized> {
    destination: &'a D,
    dry_run: bool,
}

impl<'a, D> TaxonomyReconciler<'a, D>
where
    D: Destination + ?Sized,
{
    /// Creates a reconciler writing to `destination`.
    pub fn new(destination: &'a D) -> Self {
        Self {
            destination,
            dry_run: false,
        }
    }

    /// Computes changes without writing them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reads the taxonomy, adds the repository option and writes the full
    /// schema back so a fresh database gains the properties the import needs.
    ///
    /// Returns the snapshot later pages are folded into.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError`] if reading or writing the schema fails.
    pub async fn prepare(&self, repository: &RepositoryRef) -> Result<Taxonomy, DestinationError> {
        let current = self.destination.read_taxonomy().await?;
        debug!(
            labels = current.labels.len(),
            repos = current.repos.len(),
            "Read destination taxonomy"
        );

        let merged = reconcile(&current, std::iter::empty(), repository.option_name());
        if merged.added_repo {
            info!(repo = ?repository.option_name(), "Adding repository option");
        }

        if self.dry_run {
            info!("[DRY RUN] Would update database schema");
        } else {
            self.destination.ensure_schema(&merged.taxonomy).await?;
        }
        Ok(merged.taxonomy)
    }

    /// Unions the labels of `issues` into `snapshot`, writing the option
    /// sets only when something was added.
    ///
    /// Returns the labels that were added.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError`] if writing the options fails; `snapshot`
    /// is left unchanged in that case.
    pub async fn fold(
        &self,
        snapshot: &mut Taxonomy,
        issues: &[Issue],
    ) -> Result<Vec<String>, DestinationError> {
        let labels = issues
            .iter()
            .flat_map(|issue| issue.labels.iter().map(String::as_str));
        let merged = reconcile(snapshot, labels, None);
        if !merged.changed() {
            return Ok(Vec::new());
        }

        info!(added = ?merged.added_labels, "Adding label options");
        if !self.dry_run {
            self.destination.write_taxonomy(&merged.taxonomy).await?;
        }
        *snapshot = merged.taxonomy;
        Ok(merged.added_labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy(labels: &[&str], repos: &[&str]) -> Taxonomy {
        Taxonomy {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            repos: repos.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn appends_new_labels_in_first_seen_order() {
        let merged = reconcile(
            &taxonomy(&["enhancement"], &[]),
            ["bug", "enhancement", "docs", "bug"],
            None,
        );

        assert_eq!(merged.taxonomy.labels, ["enhancement", "bug", "docs"]);
        assert_eq!(merged.added_labels, ["bug", "docs"]);
        assert!(!merged.added_repo);
        assert!(merged.changed());
    }

    #[test]
    fn known_values_change_nothing() {
        let current = taxonomy(&["bug"], &["widgets"]);
        let merged = reconcile(&current, ["bug"], Some("widgets"));

        assert_eq!(merged.taxonomy, current);
        assert!(!merged.changed());
    }

    #[test]
    fn adds_repository_option() {
        let merged = reconcile(&taxonomy(&[], &["gadgets"]), [], Some("widgets"));

        assert_eq!(merged.taxonomy.repos, ["gadgets", "widgets"]);
        assert!(merged.added_repo);
        assert!(merged.changed());
    }

    #[test]
    fn union_never_removes_existing_options() {
        let current = taxonomy(&["a", "b", "c"], &["r"]);
        let merged = reconcile(&current, ["z"], None);

        assert!(current
            .labels
            .iter()
            .all(|label| merged.taxonomy.labels.contains(label)));
        assert_eq!(merged.taxonomy.labels[..3], current.labels[..]);
        assert_eq!(merged.taxonomy.repos, current.repos);
    }
}
