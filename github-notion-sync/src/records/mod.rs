//! Per-issue record creation.
//!
//! Each issue becomes one Notion page, keyed by the issue URL. An issue whose
//! URL already has a page is skipped, so re-running an import only adds what
//! is missing.

mod error;
mod outcome;

pub use error::UpsertError;
pub use outcome::UpsertOutcome;

use crate::config::{PropertyNames, SyncConfig, UserMap};
use crate::content::{markdown_to_blocks, markdown_to_rich_text, RichText};
use crate::destination::{Destination, NewRecord, RepositoryRef, MAX_BLOCKS_PER_REQUEST};
use crate::source::Issue;
use crate::templates::TemplateRenderer;
use tracing::{debug, info, info_span, warn, Instrument};

/// Imports issues into a destination, one at a time.
pub struct RecordUpserter<'a, D: ?Sized> {
    destination: &'a D,
    properties: &'a PropertyNames,
    user_map: &'a UserMap,
    renderer: &'a TemplateRenderer,
    icon_url: &'a str,
    dry_run: bool,
}

impl<'a, D> RecordUpserter<'a, D>
where
    D: Destination + ?Sized,
{
    /// Creates an upserter using the property names, user map and icon of
    /// `config`.
    pub fn new(
        destination: &'a D,
        config: &'a SyncConfig,
        renderer: &'a TemplateRenderer,
    ) -> Self {
        Self {
            destination,
            properties: config.properties(),
            user_map: config.user_map(),
            renderer,
            icon_url: config.icon_url(),
            dry_run: false,
        }
    }

    /// Checks for existing records but writes nothing.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Imports one issue with its body and comments.
    ///
    /// This function:
    /// 1. Looks up an existing record by the issue URL and skips if found
    /// 2. Renders every comment up front
    /// 3. Creates the record with properties and the first batch of blocks
    /// 4. Appends remaining blocks, then replays comments in order
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::Destination`] or [`UpsertError::Template`] if
    /// nothing was written, and [`UpsertError::PartialBody`] or
    /// [`UpsertError::PartialReplay`] if the record was created but left
    /// incomplete. Incomplete records are not rolled back; a later run skips
    /// them.
    pub async fn upsert(
        &self,
        issue: &Issue,
        repository: &RepositoryRef,
    ) -> Result<UpsertOutcome, UpsertError> {
        let span = info_span!("upsert_issue", url = %issue.url);

        async {
            if let Some(existing) = self.destination.find_record(&issue.url).await? {
                info!(record_id = %existing, "Record already exists, skipping");
                return Ok(UpsertOutcome::Skipped {
                    record_id: existing,
                    reason: "record with this link already exists".to_string(),
                });
            }

            let comments = self.render_comments(issue)?;
            let (assignees, unresolved_assignees) = self.resolve_assignees(&issue.assignees);
            let status = if issue.is_open {
                &self.properties.status_default
            } else {
                &self.properties.status_done
            };

            let mut blocks = markdown_to_blocks(&issue.body);
            let remaining = blocks.split_off(blocks.len().min(MAX_BLOCKS_PER_REQUEST));

            if self.dry_run {
                info!(
                    title = %issue.title,
                    status = %status,
                    blocks = blocks.len() + remaining.len(),
                    comments = comments.len(),
                    "[DRY RUN] Would create record"
                );
                return Ok(UpsertOutcome::WouldCreate {
                    comments: comments.len(),
                    unresolved_assignees,
                });
            }

            let record = NewRecord {
                title: issue.title.clone(),
                link: issue.url.clone(),
                status: status.clone(),
                labels: issue.labels.clone(),
                assignees,
                repository: repository.clone(),
                icon_url: self.icon_url.to_string(),
                body: blocks,
            };
            let record_id = self.destination.create_record(&record).await?;
            info!(record_id = %record_id, "Record created");

            for chunk in remaining.chunks(MAX_BLOCKS_PER_REQUEST) {
                if let Err(source) = self.destination.append_blocks(&record_id, chunk).await {
                    return Err(UpsertError::PartialBody { record_id, source });
                }
                debug!(blocks = chunk.len(), "Appended content");
            }

            let total = comments.len();
            for (replayed, rich_text) in comments.iter().enumerate() {
                if let Err(source) = self.destination.append_comment(&record_id, rich_text).await {
                    warn!(
                        record_id = %record_id,
                        replayed,
                        total,
                        "Comment replay failed, record left incomplete"
                    );
                    return Err(UpsertError::PartialReplay {
                        record_id,
                        replayed,
                        total,
                        source,
                    });
                }
            }
            if total > 0 {
                debug!(comments = total, "Replayed comments");
            }

            Ok(UpsertOutcome::Created {
                record_id,
                comments: total,
                unresolved_assignees,
            })
        }
        .instrument(span)
        .await
    }

    fn render_comments(&self, issue: &Issue) -> Result<Vec<Vec<RichText>>, UpsertError> {
        issue
            .comments
            .iter()
            .map(|comment| {
                let markdown = self.renderer.render_comment(comment)?;
                Ok::<_, UpsertError>(markdown_to_rich_text(&markdown))
            })
            .collect()
    }

    /// Splits assignees into Notion user ids and logins with no mapping.
    fn resolve_assignees(&self, logins: &[String]) -> (Vec<String>, Vec<String>) {
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for login in logins {
            match self.user_map.resolve(login) {
                Some(id) => resolved.push(id.to_string()),
                None => {
                    info!(login = %login, "No Notion user mapped, leaving unassigned");
                    unresolved.push(login.clone());
                }
            }
        }
        (resolved, unresolved)
    }
}
