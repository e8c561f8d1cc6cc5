//! Notion request bodies and response parsing.
//!
//! Everything here is pure so the wire format can be tested without a
//! server. Requests are built as JSON values; responses are parsed through
//! private DTOs that only name the fields the importer reads.

use crate::config::PropertyNames;
use crate::content::{Block, RichText};
use crate::destination::{DestinationError, NewRecord, RecordId, RepositoryRef, Taxonomy};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Property names the schema payloads touch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SchemaNames<'a> {
    pub properties: &'a PropertyNames,
    /// Repository select property; `None` when repositories are relations.
    pub repository_select: Option<&'a str>,
}

fn options(names: &[String]) -> Value {
    Value::Array(names.iter().map(|name| json!({ "name": name })).collect())
}

/// Body of `PATCH /databases/{id}` that writes the option sets only.
pub(crate) fn taxonomy_update(names: SchemaNames<'_>, taxonomy: &Taxonomy) -> Value {
    let mut properties = Map::new();
    properties.insert(
        names.properties.label.clone(),
        json!({ "multi_select": { "options": options(&taxonomy.labels) } }),
    );
    if let Some(repository) = names.repository_select {
        properties.insert(
            repository.to_string(),
            json!({ "select": { "options": options(&taxonomy.repos) } }),
        );
    }
    json!({ "properties": properties })
}

/// Body of `PATCH /databases/{id}` that writes the option sets and makes
/// sure the link and assignee properties exist with the right types.
pub(crate) fn schema_update(names: SchemaNames<'_>, taxonomy: &Taxonomy) -> Value {
    let mut body = taxonomy_update(names, taxonomy);
    if let Some(properties) = body["properties"].as_object_mut() {
        properties.insert(names.properties.link.clone(), json!({ "url": {} }));
        properties.insert(names.properties.assignee.clone(), json!({ "people": {} }));
    }
    body
}

/// Body of `POST /databases/{id}/query` looking up a record by link.
pub(crate) fn existence_query(link_property: &str, link: &str) -> Value {
    json!({
        "filter": {
            "property": link_property,
            "url": { "equals": link }
        },
        "page_size": 1
    })
}

/// Body of `POST /pages` creating a record in the database.
pub(crate) fn create_page(
    database_id: &str,
    properties: &PropertyNames,
    record: &NewRecord,
) -> Value {
    let mut values = Map::new();
    values.insert(
        "title".to_string(),
        json!({ "title": [RichText::plain(record.title.as_str())] }),
    );
    values.insert(properties.link.clone(), json!({ "url": record.link }));
    values.insert(
        properties.status.clone(),
        json!({ "status": { "name": record.status } }),
    );
    values.insert(
        properties.label.clone(),
        json!({ "multi_select": options(&record.labels) }),
    );
    let people: Vec<Value> = record
        .assignees
        .iter()
        .map(|id| json!({ "id": id }))
        .collect();
    values.insert(properties.assignee.clone(), json!({ "people": people }));
    match &record.repository {
        RepositoryRef::Select { property, name } => {
            values.insert(property.clone(), json!({ "select": { "name": name } }));
        }
        RepositoryRef::Relation { property, page_id } => {
            values.insert(property.clone(), json!({ "relation": [{ "id": page_id }] }));
        }
    }

    json!({
        "parent": { "database_id": database_id },
        "icon": { "type": "external", "external": { "url": record.icon_url } },
        "properties": values,
        "children": record.body,
    })
}

/// Body of `PATCH /blocks/{id}/children`.
pub(crate) fn append_children(blocks: &[Block]) -> Value {
    json!({ "children": blocks })
}

/// Body of `POST /comments` adding a comment to a page.
pub(crate) fn comment(page_id: &RecordId, rich_text: &[RichText]) -> Value {
    json!({
        "parent": { "page_id": page_id.as_str() },
        "rich_text": rich_text,
    })
}

#[derive(Debug, Deserialize)]
struct DatabaseResponse {
    properties: HashMap<String, PropertySchema>,
}

#[derive(Debug, Deserialize)]
struct PropertySchema {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    multi_select: Option<OptionSet>,
    #[serde(default)]
    select: Option<OptionSet>,
}

#[derive(Debug, Default, Deserialize)]
struct OptionSet {
    #[serde(default)]
    options: Vec<SelectOption>,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

fn malformed(context: &'static str) -> impl FnOnce(serde_json::Error) -> DestinationError {
    move |source| DestinationError::Malformed { context, source }
}

/// Reads the option names of one property, checking its type.
///
/// A property that does not exist yet has no options.
fn option_names(
    database: &DatabaseResponse,
    name: &str,
    expected: &'static str,
) -> Result<Vec<String>, DestinationError> {
    let Some(schema) = database.properties.get(name) else {
        return Ok(Vec::new());
    };
    if schema.kind != expected {
        return Err(DestinationError::WrongPropertyType {
            name: name.to_string(),
            expected,
            found: schema.kind.clone(),
        });
    }
    let set = match expected {
        "select" => schema.select.as_ref(),
        _ => schema.multi_select.as_ref(),
    };
    Ok(set
        .map(|set| set.options.iter().map(|o| o.name.clone()).collect())
        .unwrap_or_default())
}

/// Parses `GET /databases/{id}` into the current taxonomy.
pub(crate) fn parse_taxonomy(
    raw: Value,
    names: SchemaNames<'_>,
) -> Result<Taxonomy, DestinationError> {
    let database: DatabaseResponse =
        serde_json::from_value(raw).map_err(malformed("database schema"))?;

    let labels = option_names(&database, &names.properties.label, "multi_select")?;
    let repos = match names.repository_select {
        Some(repository) => option_names(&database, repository, "select")?,
        None => Vec::new(),
    };
    Ok(Taxonomy { labels, repos })
}

/// Parses a database query into the first matching record, if any.
pub(crate) fn parse_query_result(raw: Value) -> Result<Option<RecordId>, DestinationError> {
    let response: QueryResponse =
        serde_json::from_value(raw).map_err(malformed("database query"))?;
    Ok(response.results.into_iter().next().map(|page| RecordId::new(page.id)))
}

/// Parses `POST /pages` into the new record's id.
pub(crate) fn parse_created_page(raw: Value) -> Result<RecordId, DestinationError> {
    let page: PageRef = serde_json::from_value(raw).map_err(malformed("created page"))?;
    Ok(RecordId::new(page.id))
}

/// Builds the error for a non-success response.
///
/// Notion error bodies carry `code` and `message`; anything else is
/// reported verbatim.
pub(crate) fn api_error(status: u16, body: &str) -> DestinationError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) => DestinationError::Api {
            status,
            code: error.code,
            message: error.message,
        },
        Err(_) => DestinationError::Api {
            status,
            code: "unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}
