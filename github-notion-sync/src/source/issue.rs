//! Issue snapshot types.

use serde::Serialize;

/// A GitHub user as referenced by a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// GitHub login.
    pub login: String,
    /// Profile URL.
    pub url: String,
}

/// A comment on an issue, captured at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment author.
    pub author: User,
    /// Markdown body.
    pub body: String,
    /// Permalink to the comment.
    pub url: String,
}

/// A GitHub issue with its nested assignees, labels and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Permalink to the issue; identifies it across runs.
    pub url: String,
    /// Whether the issue is open.
    pub is_open: bool,
    /// Assignee logins, unique.
    pub assignees: Vec<String>,
    /// Label names, unique.
    pub labels: Vec<String>,
    /// Comments in chronological order.
    pub comments: Vec<Comment>,
}

/// One page of issues and the cursor for the page after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePage {
    /// Issues in the order the source returned them.
    pub issues: Vec<Issue>,
    /// Cursor of the next page, `None` once the source is exhausted.
    pub next: Option<String>,
    /// Nested collections on this page that filled their fetch limit exactly.
    pub possibly_truncated: usize,
}

/// Removes repeated values, keeping the first occurrence.
pub(crate) fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let values = ["bug", "ui", "bug", "p1", "ui"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedup_preserving_order(values), ["bug", "ui", "p1"]);
    }
}
