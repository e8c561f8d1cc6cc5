//! The sync loop: pages in, records out.

use crate::config::SyncConfig;
use crate::destination::{Destination, RepositoryRef};
use crate::records::RecordUpserter;
use crate::runner::RunnerError;
use crate::source::{issue_pages, IssueSource};
use crate::summary::RunSummary;
use crate::taxonomy::TaxonomyReconciler;
use crate::templates::{TemplateError, TemplateRenderer};
use futures::{pin_mut, TryStreamExt};
use tracing::{info, info_span, Instrument};

/// Drives one import from an [`IssueSource`] into a [`Destination`].
///
/// Everything is sequential: one page in flight, one issue at a time, one
/// comment at a time. The first error ends the run.
pub struct SyncDriver<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    destination: &'a D,
    config: &'a SyncConfig,
    renderer: TemplateRenderer,
    dry_run: bool,
}

impl<'a, S, D> SyncDriver<'a, S, D>
where
    S: IssueSource + ?Sized,
    D: Destination + ?Sized,
{
    /// Creates a driver, compiling the configured comment header.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the comment header template is invalid.
    pub fn new(
        source: &'a S,
        destination: &'a D,
        config: &'a SyncConfig,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            source,
            destination,
            config,
            renderer: TemplateRenderer::new(config.comment_header_template())?,
            dry_run: false,
        })
    }

    /// Reads from both sides but writes nothing.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Imports every issue of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] hit. Records created before the
    /// failure stay in the destination; running again resumes after them.
    pub async fn run(&self, owner: &str, repo: &str) -> Result<RunSummary, RunnerError> {
        let span = info_span!("sync", owner, repo, dry_run = self.dry_run);

        async {
            let repository = RepositoryRef::for_mode(self.config.repository_mode(), repo);
            let reconciler = TaxonomyReconciler::new(self.destination).dry_run(self.dry_run);
            let upserter = RecordUpserter::new(self.destination, self.config, &self.renderer)
                .dry_run(self.dry_run);
            let mut summary = RunSummary::new(self.dry_run);

            info!("Preparing database");
            let mut taxonomy = reconciler.prepare(&repository).await?;

            let pages = issue_pages(self.source, owner, repo);
            pin_mut!(pages);

            while let Some(page) = pages.try_next().await? {
                summary.pages_fetched += 1;
                summary.issues_seen += page.issues.len();
                summary.possibly_truncated += page.possibly_truncated;
                info!(
                    page = summary.pages_fetched,
                    issues = page.issues.len(),
                    "Fetched issue page"
                );

                let added = reconciler.fold(&mut taxonomy, &page.issues).await?;
                summary.labels_added += added.len();

                for issue in &page.issues {
                    let outcome = upserter
                        .upsert(issue, &repository)
                        .await
                        .map_err(|source| RunnerError::Upsert {
                            url: issue.url.clone(),
                            source,
                        })?;
                    summary.record_outcome(&outcome);
                }
            }

            info!(
                pages = summary.pages_fetched,
                created = summary.records_created,
                skipped = summary.records_skipped,
                "Import finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
