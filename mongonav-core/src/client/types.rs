//! Request and response bodies of the navigator backend

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a, F: Serialize + ?Sized> {
    pub database: &'a str,
    pub collection: &'a str,
    pub query: &'a F,
}

#[derive(Debug, Serialize)]
pub(crate) struct AiQueryRequest<'a> {
    pub database: &'a str,
    pub collection: &'a str,
    pub prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingsUpdateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<&'a str>,
}

/// Documents returned by `POST /query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub results: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<JsonValue>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// AI-generated filter; `query` is opaque and used as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiQuery {
    #[serde(default)]
    pub query: JsonValue,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub used_prompt: String,
    #[serde(default)]
    pub raw_response: JsonValue,
}

impl AiQuery {
    /// A null query means the model produced nothing usable
    pub fn has_query(&self) -> bool {
        !self.query.is_null()
    }
}

/// One entry of `GET /databases`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSummary {
    pub name: String,
    #[serde(default)]
    pub collections: u64,
    #[serde(default)]
    pub documents: i64,
    #[serde(default)]
    pub storage_size: i64,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub stats: JsonValue,
}

/// The listing may hold bare names or full summaries
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DatabaseEntry {
    Name(String),
    Summary(DatabaseSummary),
}

impl From<DatabaseEntry> for DatabaseSummary {
    fn from(entry: DatabaseEntry) -> Self {
        match entry {
            DatabaseEntry::Name(name) => DatabaseSummary {
                name,
                ..Default::default()
            },
            DatabaseEntry::Summary(summary) => summary,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionList {
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentList {
    #[serde(default)]
    pub documents: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexList {
    #[serde(default)]
    pub indexes: Vec<JsonValue>,
}

/// Options for browsing a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentListOptions {
    pub filter: Option<JsonValue>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl DocumentListOptions {
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn filter(mut self, filter: JsonValue) -> Self {
        self.filter = Some(filter);
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Sampled statistics for one field of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub sample: JsonValue,
}

pub type CollectionStats = BTreeMap<String, FieldStats>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertResult {
    #[serde(default)]
    pub inserted_id: JsonValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    #[serde(default)]
    pub matched: u64,
    #[serde(default)]
    pub modified: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted: u64,
}

/// `GET /dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub connected_to: String,
    #[serde(default)]
    pub totals: DashboardTotals,
    #[serde(default)]
    pub server: DashboardServer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    #[serde(default)]
    pub databases: u64,
    #[serde(default)]
    pub collections: i64,
    #[serde(default)]
    pub documents: i64,
    #[serde(default)]
    pub indexes: i64,
    #[serde(default)]
    pub storage_size_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardServer {
    #[serde(default)]
    pub uptime_seconds: f64,
    #[serde(default)]
    pub connections_current: i64,
    #[serde(default)]
    pub ops_per_second: f64,
}

/// `GET /settings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub shortened_connection_string: String,
    #[serde(default)]
    pub auth_enabled_default: bool,
    #[serde(default)]
    pub has_gemini_key: bool,
}

/// `POST /settings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub has_gemini_key: bool,
}

/// Extract a document's `_id` as a string, for plain ids and extended-JSON `{ "$oid": ... }`
pub fn document_id(doc: &JsonValue) -> Option<String> {
    match doc.get("_id")? {
        JsonValue::String(id) => Some(id.clone()),
        JsonValue::Object(obj) => obj.get("$oid").and_then(|v| v.as_str()).map(str::to_string),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
