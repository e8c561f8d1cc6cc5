//! Cursor-paginated issue retrieval.
//!
//! [`IssueSource`] fetches one page at a time; [`issue_pages`] turns a source
//! into a stream that walks every page of a repository exactly once.

mod error;
mod github;
mod issue;
mod response;

pub use error::SourceError;
pub use github::GitHubIssueSource;
pub use issue::{Comment, Issue, IssuePage, User};

use async_trait::async_trait;
use futures::stream::{self, Stream};

/// A paginated source of issues.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetches the page of issues that precedes `cursor`, or the newest page
    /// when `cursor` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failures or malformed responses.
    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        cursor: Option<&str>,
    ) -> Result<IssuePage, SourceError>;
}

/// Pagination state: the cursor to fetch next, or done.
enum Traversal {
    Paginating(Option<String>),
    Done,
}

/// Streams every page of issues from `source`.
///
/// The stream fetches lazily, one page per poll, and ends after the page
/// without a next cursor or after the first error.
pub fn issue_pages<'a, S>(
    source: &'a S,
    owner: &'a str,
    repo: &'a str,
) -> impl Stream<Item = Result<IssuePage, SourceError>> + 'a
where
    S: IssueSource + ?Sized,
{
    stream::try_unfold(Traversal::Paginating(None), move |state| async move {
        let cursor = match state {
            Traversal::Done => return Ok(None),
            Traversal::Paginating(cursor) => cursor,
        };

        let page = source.fetch_page(owner, repo, cursor.as_deref()).await?;
        let next = match &page.next {
            Some(next) if cursor.as_ref() == Some(next) => {
                return Err(SourceError::CursorDidNotAdvance {
                    cursor: next.clone(),
                })
            }
            Some(next) => Traversal::Paginating(Some(next.clone())),
            None => Traversal::Done,
        };
        Ok(Some((page, next)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};
    use std::sync::Mutex;

    /// Serves pages keyed by cursor and records every cursor requested.
    struct PagedSource {
        pages: Vec<(Option<&'static str>, IssuePage)>,
        requested: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl IssueSource for PagedSource {
        async fn fetch_page(
            &self,
            _owner: &str,
            _repo: &str,
            cursor: Option<&str>,
        ) -> Result<IssuePage, SourceError> {
            self.requested.lock().unwrap().push(cursor.map(String::from));
            self.pages
                .iter()
                .find(|(key, _)| *key == cursor)
                .map(|(_, page)| page.clone())
                .ok_or(SourceError::MissingCursor)
        }
    }

    fn page(titles: &[&str], next: Option<&str>) -> IssuePage {
        IssuePage {
            issues: titles
                .iter()
                .map(|title| Issue {
                    title: title.to_string(),
                    body: String::new(),
                    url: format!("https://x/{title}"),
                    is_open: true,
                    assignees: vec![],
                    labels: vec![],
                    comments: vec![],
                })
                .collect(),
            next: next.map(String::from),
            possibly_truncated: 0,
        }
    }

    #[tokio::test]
    async fn walks_every_page_once() {
        let source = PagedSource {
            pages: vec![
                (None, page(&["5", "4"], Some("c2"))),
                (Some("c2"), page(&["3", "2"], Some("c1"))),
                (Some("c1"), page(&["1"], None)),
            ],
            requested: Mutex::new(vec![]),
        };

        let pages: Vec<IssuePage> = issue_pages(&source, "acme", "widgets")
            .try_collect()
            .await
            .unwrap();

        let titles: Vec<_> = pages
            .iter()
            .flat_map(|p| p.issues.iter().map(|i| i.title.as_str()))
            .collect();
        assert_eq!(titles, ["5", "4", "3", "2", "1"]);
        assert_eq!(
            *source.requested.lock().unwrap(),
            [None, Some("c2".to_string()), Some("c1".to_string())]
        );
    }

    #[tokio::test]
    async fn stops_after_first_error() {
        let source = PagedSource {
            pages: vec![(None, page(&["2"], Some("missing")))],
            requested: Mutex::new(vec![]),
        };

        let results: Vec<_> = issue_pages(&source, "acme", "widgets").collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(source.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_cursor_that_does_not_advance() {
        let source = PagedSource {
            pages: vec![
                (None, page(&["2"], Some("loop"))),
                (Some("loop"), page(&["1"], Some("loop"))),
            ],
            requested: Mutex::new(vec![]),
        };

        let error = issue_pages(&source, "acme", "widgets")
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(error, SourceError::CursorDidNotAdvance { .. }));
    }
}
