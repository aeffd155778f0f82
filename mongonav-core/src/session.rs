//! Query builder session
//!
//! Ties the compiler to the client for one user: manual and AI-assisted runs
//! go through one request slot, metadata loads through another, so switching
//! targets never lets a stale response through.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::client::{AiQuery, LatestOnly, NavigatorClient};
use crate::error::{ClientError, ClientResult};
use crate::query::{CompileOptions, ConditionRow, FilterCompiler, FilterDocument};

/// Database and collection a query runs against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub database: String,
    pub collection: String,
}

impl Target {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> ClientResult<Self> {
        let database = database.into();
        let collection = collection.into();
        if database.trim().is_empty() || collection.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Select a database and collection first".to_string(),
            ));
        }
        Ok(Self {
            database,
            collection,
        })
    }
}

/// Where an executed filter came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Manual,
    Ai,
}

/// Outcome of an executed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRun {
    pub source: QuerySource,
    pub filter: JsonValue,
    pub results: Vec<JsonValue>,
}

/// One user's query builder state
#[derive(Debug)]
pub struct QuerySession {
    client: NavigatorClient,
    compiler: FilterCompiler,
    executions: LatestOnly,
    metadata: LatestOnly,
}

impl QuerySession {
    pub fn new(client: NavigatorClient, options: CompileOptions) -> Self {
        Self {
            client,
            compiler: FilterCompiler::new(options),
            executions: LatestOnly::new("execute"),
            metadata: LatestOnly::new("metadata"),
        }
    }

    pub fn client(&self) -> &NavigatorClient {
        &self.client
    }

    pub fn compiler(&self) -> &FilterCompiler {
        &self.compiler
    }

    pub fn compile(&self, rows: &[ConditionRow]) -> FilterDocument {
        self.compiler.compile(rows)
    }

    /// Execute a filter; a newer execution in this session cancels this one
    pub async fn execute(
        &self,
        target: &Target,
        filter: JsonValue,
        source: QuerySource,
    ) -> ClientResult<QueryRun> {
        let result = self
            .executions
            .run(
                self.client
                    .execute_query(&target.database, &target.collection, &filter),
            )
            .await?;

        info!(
            database = %target.database,
            collection = %target.collection,
            source = ?source,
            "Query returned {} documents",
            result.len()
        );

        Ok(QueryRun {
            source,
            filter,
            results: result.results,
        })
    }

    /// Compile the editor rows and execute them
    pub async fn run_manual(&self, target: &Target, rows: &[ConditionRow]) -> ClientResult<QueryRun> {
        let filter = self.compile(rows);
        debug!("Compiled {} rows into {} clauses", rows.len(), filter.len());
        self.execute(target, filter.to_value(), QuerySource::Manual)
            .await
    }

    /// Generate a filter from a natural-language prompt
    pub async fn generate_ai(&self, target: &Target, prompt: &str) -> ClientResult<AiQuery> {
        if prompt.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Describe what you want to find".to_string(),
            ));
        }
        self.client
            .generate_query(&target.database, &target.collection, prompt)
            .await
    }

    /// Execute a previously generated filter as-is
    pub async fn run_ai(&self, target: &Target, generated: &AiQuery) -> ClientResult<QueryRun> {
        if !generated.has_query() {
            return Err(ClientError::InvalidInput("Generate a query first".to_string()));
        }
        self.execute(target, generated.query.clone(), QuerySource::Ai)
            .await
    }

    /// List a database's collections; switching databases discards stale lists
    pub async fn load_collections(&self, database: &str) -> ClientResult<Vec<String>> {
        self.metadata
            .run(self.client.list_collections(database))
            .await
    }

    /// Abort everything in flight
    pub fn cancel_all(&self) {
        self.executions.cancel();
        self.metadata.cancel();
    }
}
