//! Client for the navigator HTTP backend

pub mod http;
pub mod latest;
pub mod types;

pub use http::NavigatorClient;
pub use latest::LatestOnly;
pub use types::{
    document_id, AiQuery, CollectionStats, DashboardServer, DashboardStats, DashboardTotals,
    DatabaseSummary, DeleteResult, DocumentListOptions, FieldStats, InsertResult, QueryResult,
    Settings, SettingsUpdate, UpdateResult,
};
