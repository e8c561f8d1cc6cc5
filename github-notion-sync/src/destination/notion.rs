//! Notion REST client.

use crate::config::{PropertyNames, RepositoryMode, SyncConfig};
use crate::content::{Block, RichText};
use crate::destination::payload::{self, SchemaNames};
use crate::destination::{Destination, DestinationError, NewRecord, RecordId, Taxonomy};
use crate::rate_limit::{retry_after_secs, wait_for_retry_after, MAX_RATE_LIMIT_RETRIES};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Base URL of the Notion API.
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// [`Destination`] backed by one Notion database.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
    database_id: String,
    properties: PropertyNames,
    repository_select: Option<String>,
}

impl NotionClient {
    /// Creates a client for the database named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, DestinationError> {
        let client = Client::builder().timeout(config.notion_timeout()).build()?;
        let repository_select = match config.repository_mode() {
            RepositoryMode::Select { property } => Some(property.clone()),
            RepositoryMode::Relation { .. } => None,
        };
        Ok(Self {
            client,
            base_url: NOTION_API_URL.to_string(),
            api_key: config.notion_api_key().to_string(),
            database_id: config.database_id().to_string(),
            properties: config.properties().clone(),
            repository_select,
        })
    }

    /// Points the client at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn schema_names(&self) -> SchemaNames<'_> {
        SchemaNames {
            properties: &self.properties,
            repository_select: self.repository_select.as_deref(),
        }
    }

    /// Sends one request, retrying rate limited responses.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, DestinationError> {
        let url = format!("{}/{path}", self.base_url);
        let mut attempt = 0;

        loop {
            debug!(%method, path, attempt, "Sending Notion request");
            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.api_key)
                .header("Notion-Version", NOTION_VERSION);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < MAX_RATE_LIMIT_RETRIES {
                    attempt += 1;
                    wait_for_retry_after(retry_after_secs(response.headers()), attempt).await;
                    continue;
                }
                warn!(path, attempts = attempt, "Still rate limited, giving up");
            }

            let text = response.text().await?;
            if !status.is_success() {
                return Err(payload::api_error(status.as_u16(), &text));
            }
            return serde_json::from_str(&text).map_err(|source| DestinationError::Malformed {
                context: "response body",
                source,
            });
        }
    }
}

#[async_trait]
impl Destination for NotionClient {
    async fn read_taxonomy(&self) -> Result<Taxonomy, DestinationError> {
        let raw = self
            .send(Method::GET, &format!("databases/{}", self.database_id), None)
            .await?;
        payload::parse_taxonomy(raw, self.schema_names())
    }

    async fn ensure_schema(&self, taxonomy: &Taxonomy) -> Result<(), DestinationError> {
        let body = payload::schema_update(self.schema_names(), taxonomy);
        self.send(
            Method::PATCH,
            &format!("databases/{}", self.database_id),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn write_taxonomy(&self, taxonomy: &Taxonomy) -> Result<(), DestinationError> {
        let body = payload::taxonomy_update(self.schema_names(), taxonomy);
        self.send(
            Method::PATCH,
            &format!("databases/{}", self.database_id),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn find_record(&self, link: &str) -> Result<Option<RecordId>, DestinationError> {
        let body = payload::existence_query(&self.properties.link, link);
        let raw = self
            .send(
                Method::POST,
                &format!("databases/{}/query", self.database_id),
                Some(&body),
            )
            .await?;
        payload::parse_query_result(raw)
    }

    async fn create_record(&self, record: &NewRecord) -> Result<RecordId, DestinationError> {
        let body = payload::create_page(&self.database_id, &self.properties, record);
        let raw = self.send(Method::POST, "pages", Some(&body)).await?;
        payload::parse_created_page(raw)
    }

    async fn append_blocks(
        &self,
        record: &RecordId,
        blocks: &[Block],
    ) -> Result<(), DestinationError> {
        let body = payload::append_children(blocks);
        self.send(
            Method::PATCH,
            &format!("blocks/{record}/children"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn append_comment(
        &self,
        record: &RecordId,
        rich_text: &[RichText],
    ) -> Result<(), DestinationError> {
        let body = payload::comment(record, rich_text);
        self.send(Method::POST, "comments", Some(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        SyncConfig::new(
            "gh-token".to_string(),
            "secret_key".to_string(),
            "db-1".to_string(),
        )
    }

    #[test]
    fn select_mode_reads_repository_options() {
        let client = NotionClient::new(&config()).unwrap();
        assert_eq!(client.schema_names().repository_select, Some("Repository"));
        assert_eq!(client.base_url, NOTION_API_URL);
    }

    #[test]
    fn relation_mode_has_no_repository_options() {
        let config = config().with_repository_mode(RepositoryMode::Relation {
            property: "Project".to_string(),
            page_id: "page-1".to_string(),
        });
        let client = NotionClient::new(&config).unwrap();
        assert_eq!(client.schema_names().repository_select, None);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = NotionClient::new(&config())
            .unwrap()
            .with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.base_url, "http://localhost:9000/v1");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let client = NotionClient::new(&config())
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let error = client.read_taxonomy().await.unwrap_err();
        assert!(matches!(error, DestinationError::Http(_)));
    }
}
