//! HTTP client for the navigator backend
//!
//! Every call is a single attempt. Non-success responses surface the body
//! text verbatim as [`ClientError::Transport`].

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::*;
use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::logging::SlowQueryLogger;

/// Client for the navigator backend
#[derive(Debug, Clone)]
pub struct NavigatorClient {
    http: Client,
    base_url: String,
    slow_queries: Option<Arc<SlowQueryLogger>>,
}

impl NavigatorClient {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let url = Url::parse(&settings.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", settings.base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let http = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            slow_queries: None,
        })
    }

    /// Record slow `execute_query` round trips
    pub fn with_slow_query_logger(mut self, logger: Arc<SlowQueryLogger>) -> Self {
        self.slow_queries = Some(logger);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn slow_query_logger(&self) -> Option<&Arc<SlowQueryLogger>> {
        self.slow_queries.as_ref()
    }

    /// Run a filter against a collection
    #[instrument(skip(self, filter), level = "debug")]
    pub async fn execute_query<F>(
        &self,
        database: &str,
        collection: &str,
        filter: &F,
    ) -> ClientResult<QueryResult>
    where
        F: Serialize + ?Sized,
    {
        let body = QueryRequest {
            database,
            collection,
            query: filter,
        };

        let tracker = self.slow_queries.as_ref().map(|logger| {
            let rendered = serde_json::to_string(filter).unwrap_or_default();
            logger.start_query(database, collection, rendered)
        });

        let result: ClientResult<QueryResult> = self
            .send(self.http.post(self.url("/query")).json(&body), "query results")
            .await;

        if let (Some(logger), Some(tracker)) = (&self.slow_queries, tracker) {
            logger.finish_query(tracker);
        }

        let result = result?;
        debug!("Query returned {} documents", result.len());
        Ok(result)
    }

    /// Ask the backend to turn a prompt into a filter
    #[instrument(skip(self, prompt), level = "debug")]
    pub async fn generate_query(
        &self,
        database: &str,
        collection: &str,
        prompt: &str,
    ) -> ClientResult<AiQuery> {
        let body = AiQueryRequest {
            database,
            collection,
            prompt,
        };
        self.send(self.http.post(self.url("/ai/query")).json(&body), "AI query")
            .await
    }

    pub async fn list_databases(&self) -> ClientResult<Vec<DatabaseSummary>> {
        let entries: Vec<DatabaseEntry> = self
            .send(self.http.get(self.url("/databases")), "database list")
            .await?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    pub async fn list_collections(&self, database: &str) -> ClientResult<Vec<String>> {
        let path = format!("/collections/{}", segment(database));
        let list: CollectionList = self
            .send(self.http.get(self.url(&path)), "collection list")
            .await?;
        Ok(list.collections)
    }

    pub async fn list_documents(
        &self,
        database: &str,
        collection: &str,
        options: &DocumentListOptions,
    ) -> ClientResult<Vec<JsonValue>> {
        let path = format!("/collections/{}/{}", segment(database), segment(collection));
        let request = self.http.get(self.url(&path)).query(&options.query_pairs());
        let list: DocumentList = self.send(request, "document list").await?;
        Ok(list.documents)
    }

    pub async fn list_indexes(&self, database: &str, collection: &str) -> ClientResult<Vec<JsonValue>> {
        let path = format!(
            "/collections/{}/{}/indexes",
            segment(database),
            segment(collection)
        );
        let list: IndexList = self.send(self.http.get(self.url(&path)), "index list").await?;
        Ok(list.indexes)
    }

    /// Field statistics over a random sample of the collection
    pub async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
        sample: u64,
    ) -> ClientResult<CollectionStats> {
        let path = format!(
            "/collections/{}/{}/stats",
            segment(database),
            segment(collection)
        );
        let request = self
            .http
            .get(self.url(&path))
            .query(&[("sample", sample.to_string())]);
        self.send(request, "collection stats").await
    }

    /// Fetch one document; a 404 yields `None`
    pub async fn get_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
    ) -> ClientResult<Option<JsonValue>> {
        let response = self
            .http
            .get(self.url(&document_path(database, collection, Some(id))))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = read_success(response).await?;
        decode(&body, "document").map(Some)
    }

    pub async fn create_document(
        &self,
        database: &str,
        collection: &str,
        document: &JsonValue,
    ) -> ClientResult<InsertResult> {
        let url = self.url(&document_path(database, collection, None));
        self.send(self.http.post(url).json(document), "insert result")
            .await
    }

    /// Partial update; the backend applies the body with `$set`
    pub async fn update_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        document: &JsonValue,
    ) -> ClientResult<UpdateResult> {
        let url = self.url(&document_path(database, collection, Some(id)));
        self.send(self.http.put(url).json(document), "update result")
            .await
    }

    pub async fn delete_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
    ) -> ClientResult<DeleteResult> {
        let url = self.url(&document_path(database, collection, Some(id)));
        self.send(self.http.delete(url), "delete result").await
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardStats> {
        self.send(self.http.get(self.url("/dashboard")), "dashboard stats")
            .await
    }

    /// Backend liveness text, e.g. "MongoDB is up and running"
    pub async fn status(&self) -> ClientResult<String> {
        let response = self.http.get(self.url("/status")).send().await?;
        read_success(response).await
    }

    pub async fn settings(&self) -> ClientResult<Settings> {
        self.send(self.http.get(self.url("/settings")), "settings")
            .await
    }

    /// Register an AI key for the backend session; blank keys are not sent
    pub async fn update_settings(&self, gemini_api_key: Option<&str>) -> ClientResult<SettingsUpdate> {
        let body = SettingsUpdateRequest {
            gemini_api_key: gemini_api_key.map(str::trim).filter(|k| !k.is_empty()),
        };
        self.send(self.http.post(self.url("/settings")).json(&body), "settings update")
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> ClientResult<T> {
        let response = request.send().await?;
        let body = read_success(response).await?;
        decode(&body, context)
    }
}

async fn read_success(response: Response) -> ClientResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            body
        };
        return Err(ClientError::Transport {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode {
        context: context.to_string(),
        source,
    })
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn document_path(database: &str, collection: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!(
            "/documents/{}/{}/{}",
            segment(database),
            segment(collection),
            segment(id)
        ),
        None => format!("/documents/{}/{}", segment(database), segment(collection)),
    }
}
