//! Structured logging with tracing
//!
//! Configurable compact or JSON output, plus a slow query log for round trips
//! to the query endpoint.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

const MAX_SLOW_QUERIES: usize = 1000;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,

    /// Enable JSON format output
    pub json_format: bool,

    /// Enable slow query logging
    pub slow_query_logging: bool,

    /// Slow query threshold in milliseconds
    pub slow_query_threshold_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            json_format: false,
            slow_query_logging: true,
            slow_query_threshold_ms: 1000,
        }
    }
}

impl LoggingConfig {
    /// Parse log level from string
    pub fn parse_level(&self) -> Level {
        match self.level.to_uppercase().as_str() {
            "ERROR" => Level::ERROR,
            "WARN" => Level::WARN,
            "INFO" => Level::INFO,
            "DEBUG" => Level::DEBUG,
            "TRACE" => Level::TRACE,
            _ => Level::INFO,
        }
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }
}

/// Initialize the global subscriber; `RUST_LOG` takes precedence over the configured level
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.parse_level().as_str()));

    let subscriber = Registry::default().with(env_filter);

    if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr);

        subscriber
            .with(json_layer)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact();

        subscriber
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    }

    tracing::debug!(
        "Logging initialized: level={}, json={}, slow_queries={}",
        config.level,
        config.json_format,
        config.slow_query_logging
    );

    Ok(())
}

/// Slow query record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowQuery {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub database: String,
    pub collection: String,
    pub query: String,
}

/// Slow query statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlowQueryStats {
    pub total_count: usize,
    pub avg_duration_ms: u64,
    pub max_duration_ms: u64,
    pub threshold_ms: u64,
}

/// Records query round trips that exceed a threshold
#[derive(Debug)]
pub struct SlowQueryLogger {
    threshold: Duration,
    enabled: bool,
    queries: RwLock<Vec<SlowQuery>>,
}

/// In-flight query timer
pub struct QueryTracker {
    start_time: Instant,
    database: String,
    collection: String,
    query: String,
}

impl SlowQueryLogger {
    pub fn new(threshold: Duration, enabled: bool) -> Self {
        Self {
            threshold,
            enabled,
            queries: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.slow_query_threshold(), config.slow_query_logging)
    }

    /// Start tracking a query
    pub fn start_query(&self, database: &str, collection: &str, query: String) -> QueryTracker {
        QueryTracker {
            start_time: Instant::now(),
            database: database.to_string(),
            collection: collection.to_string(),
            query,
        }
    }

    /// Finish tracking a query and log if slow
    pub fn finish_query(&self, tracker: QueryTracker) {
        let duration = tracker.start_time.elapsed();
        self.record(tracker, duration);
    }

    fn record(&self, tracker: QueryTracker, duration: Duration) {
        if !self.enabled || duration < self.threshold {
            return;
        }

        let slow_query = SlowQuery {
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            database: tracker.database,
            collection: tracker.collection,
            query: tracker.query,
        };

        tracing::warn!(
            target: "slow_query",
            duration_ms = slow_query.duration_ms,
            database = %slow_query.database,
            collection = %slow_query.collection,
            query = %slow_query.query,
            "Slow query detected"
        );

        let mut queries = self.queries.write();
        queries.push(slow_query);
        if queries.len() > MAX_SLOW_QUERIES {
            let len = queries.len();
            queries.drain(0..len - MAX_SLOW_QUERIES);
        }
    }

    /// Most recent slow queries, newest first
    pub fn get_slow_queries(&self, limit: usize) -> Vec<SlowQuery> {
        let queries = self.queries.read();
        queries.iter().rev().take(limit).cloned().collect()
    }

    pub fn get_stats(&self) -> SlowQueryStats {
        let queries = self.queries.read();
        let threshold_ms = self.threshold.as_millis() as u64;

        if queries.is_empty() {
            return SlowQueryStats {
                threshold_ms,
                ..Default::default()
            };
        }

        let total_count = queries.len();
        let total_duration: u64 = queries.iter().map(|q| q.duration_ms).sum();

        SlowQueryStats {
            total_count,
            avg_duration_ms: total_duration / total_count as u64,
            max_duration_ms: queries.iter().map(|q| q.duration_ms).max().unwrap_or(0),
            threshold_ms,
        }
    }
}
