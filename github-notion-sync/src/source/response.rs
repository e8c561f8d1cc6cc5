//! GraphQL response shapes and their validation.

use crate::config::FetchLimits;
use crate::source::issue::dedup_preserving_order;
use crate::source::{Comment, Issue, IssuePage, SourceError, User};
use serde::Deserialize;
use tracing::warn;

/// Login GitHub shows for comments whose author account was deleted.
const GHOST_LOGIN: &str = "ghost";
const GHOST_URL: &str = "https://github.com/ghost";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<RepositoryData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueConnection {
    page_info: PageInfo,
    edges: Vec<IssueEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    start_cursor: Option<String>,
    has_previous_page: bool,
}

#[derive(Debug, Deserialize)]
struct IssueEdge {
    node: IssueNode,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    assignees: Nodes<LoginNode>,
    labels: Nodes<NameNode>,
    body: String,
    title: String,
    url: String,
    state: IssueState,
    comments: Nodes<CommentNode>,
}

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Deserialize)]
struct NameNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommentNode {
    author: Option<ActorNode>,
    body: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ActorNode {
    login: String,
    url: String,
}

/// Validates a raw GraphQL response and converts it into an [`IssuePage`].
pub(crate) fn parse_page(
    raw: serde_json::Value,
    owner: &str,
    repo: &str,
    limits: &FetchLimits,
) -> Result<IssuePage, SourceError> {
    let response: GraphQlResponse = serde_json::from_value(raw)?;

    if !response.errors.is_empty() {
        let messages = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::GraphQl { messages });
    }

    let connection = response
        .data
        .and_then(|data| data.repository)
        .ok_or_else(|| SourceError::RepositoryNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })?
        .issues;

    let next = match (connection.page_info.has_previous_page, connection.page_info.start_cursor) {
        (true, Some(cursor)) => Some(cursor),
        (true, None) => return Err(SourceError::MissingCursor),
        (false, _) => None,
    };

    let mut possibly_truncated = 0;
    let issues = connection
        .edges
        .into_iter()
        .map(|edge| {
            possibly_truncated += count_truncated(&edge.node, limits);
            issue_from_node(edge.node)
        })
        .collect();

    Ok(IssuePage {
        issues,
        next,
        possibly_truncated,
    })
}

/// Counts nested collections that filled their limit, warning for each.
fn count_truncated(node: &IssueNode, limits: &FetchLimits) -> usize {
    let collections = [
        ("assignees", node.assignees.nodes.len(), limits.assignees),
        ("labels", node.labels.nodes.len(), limits.labels),
        ("comments", node.comments.nodes.len(), limits.comments),
    ];

    let mut count = 0;
    for (collection, len, limit) in collections {
        if len >= limit as usize {
            warn!(
                issue = %node.url,
                collection,
                limit,
                "Collection reached the fetch limit; older items may be missing"
            );
            count += 1;
        }
    }
    count
}

fn issue_from_node(node: IssueNode) -> Issue {
    Issue {
        title: node.title,
        body: node.body,
        url: node.url,
        is_open: matches!(node.state, IssueState::Open),
        assignees: dedup_preserving_order(
            node.assignees.nodes.into_iter().map(|n| n.login).collect(),
        ),
        labels: dedup_preserving_order(node.labels.nodes.into_iter().map(|n| n.name).collect()),
        comments: node
            .comments
            .nodes
            .into_iter()
            .map(|comment| {
                let author = match comment.author {
                    Some(actor) => User {
                        login: actor.login,
                        url: actor.url,
                    },
                    None => User {
                        login: GHOST_LOGIN.to_string(),
                        url: GHOST_URL.to_string(),
                    },
                };
                Comment {
                    author,
                    body: comment.body,
                    url: comment.url,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_node(url: &str, state: &str) -> serde_json::Value {
        json!({
            "assignees": { "nodes": [{ "login": "alice" }, { "login": "alice" }] },
            "labels": { "nodes": [{ "name": "bug" }] },
            "body": "It breaks",
            "title": "Bug A",
            "url": url,
            "state": state,
            "comments": { "nodes": [
                {
                    "author": { "login": "bob", "url": "https://github.com/bob" },
                    "body": "repro steps",
                    "url": format!("{url}#c1")
                },
                {
                    "author": null,
                    "body": "me too",
                    "url": format!("{url}#c2")
                }
            ] }
        })
    }

    fn response(
        has_previous_page: bool,
        cursor: Option<&str>,
        nodes: Vec<serde_json::Value>,
    ) -> serde_json::Value {
        json!({
            "data": {
                "repository": {
                    "issues": {
                        "pageInfo": { "startCursor": cursor, "hasPreviousPage": has_previous_page },
                        "edges": nodes.into_iter().map(|node| json!({ "node": node })).collect::<Vec<_>>()
                    }
                }
            }
        })
    }

    #[test]
    fn parses_issues_and_next_cursor() {
        let raw = response(
            true,
            Some("Y3Vyc29yOjE="),
            vec![issue_node("https://x/1", "OPEN"), issue_node("https://x/2", "CLOSED")],
        );
        let page = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap();

        assert_eq!(page.next.as_deref(), Some("Y3Vyc29yOjE="));
        assert_eq!(page.issues.len(), 2);
        assert!(page.issues[0].is_open);
        assert!(!page.issues[1].is_open);
        assert_eq!(page.issues[0].assignees, ["alice"]);
        assert_eq!(page.issues[0].labels, ["bug"]);
        assert_eq!(page.possibly_truncated, 0);
    }

    #[test]
    fn keeps_comment_order_and_maps_deleted_authors() {
        let raw = response(false, None, vec![issue_node("https://x/1", "OPEN")]);
        let page = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap();

        let comments = &page.issues[0].comments;
        assert_eq!(comments[0].author.login, "bob");
        assert_eq!(comments[0].body, "repro steps");
        assert_eq!(comments[1].author.login, GHOST_LOGIN);
        assert_eq!(comments[1].author.url, GHOST_URL);
    }

    #[test]
    fn last_page_has_no_cursor() {
        let raw = response(false, Some("ignored"), vec![]);
        let page = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap();
        assert_eq!(page.next, None);
        assert!(page.issues.is_empty());
    }

    #[test]
    fn more_pages_without_cursor_is_an_error() {
        let raw = response(true, None, vec![]);
        let error = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap_err();
        assert!(matches!(error, SourceError::MissingCursor));
    }

    #[test]
    fn reports_graphql_errors() {
        let raw = json!({
            "data": null,
            "errors": [{ "message": "Bad credentials" }, { "message": "Try again" }]
        });
        let error = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap_err();
        match error {
            SourceError::GraphQl { messages } => assert_eq!(messages, "Bad credentials; Try again"),
            other => panic!("expected GraphQl error, got {other:?}"),
        }
    }

    #[test]
    fn missing_repository_is_reported() {
        let raw = json!({ "data": { "repository": null } });
        let error = parse_page(raw, "acme", "gone", &FetchLimits::default()).unwrap_err();
        assert!(matches!(error, SourceError::RepositoryNotFound { .. }));
    }

    #[test]
    fn unknown_state_is_malformed() {
        let raw = response(false, None, vec![issue_node("https://x/1", "MERGED")]);
        let error = parse_page(raw, "acme", "widgets", &FetchLimits::default()).unwrap_err();
        assert!(matches!(error, SourceError::Malformed(_)));
    }

    #[test]
    fn counts_collections_at_the_limit() {
        let limits = FetchLimits {
            page_size: 50,
            assignees: 2,
            labels: 50,
            comments: 2,
        };
        let raw = response(false, None, vec![issue_node("https://x/1", "OPEN")]);
        let page = parse_page(raw, "acme", "widgets", &limits).unwrap();

        assert_eq!(page.possibly_truncated, 2);
    }
}
