//! MongoNav Core - Query building and backend access for the MongoDB navigator
//!
//! This crate provides:
//! - The filter compiler turning editor condition rows into MongoDB filters
//! - An HTTP client for the navigator backend with last-issued-wins cancellation
//! - Query sessions, dashboard polling and schema previews
//! - Configuration and logging shared by the CLI

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod query;
pub mod schema;
pub mod session;
pub mod uri;

pub use client::{LatestOnly, NavigatorClient};
pub use config::*;
pub use error::*;
pub use logging::*;
pub use monitor::*;
pub use query::*;
pub use schema::*;
pub use session::*;
pub use uri::shorten_uri;
