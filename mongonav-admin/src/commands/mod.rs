pub mod collection;
pub mod config;
pub mod database;
pub mod query;
pub mod schema;
pub mod stats;

pub use collection::*;
pub use config::*;
pub use database::*;
pub use query::*;
pub use schema::*;
pub use stats::*;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;

/// Parse a JSON document argument; `@path` reads it from a file
pub(crate) async fn read_document(arg: &str) -> Result<Value> {
    let content = match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path))?,
        None => arg.to_string(),
    };

    let value: Value = serde_json::from_str(&content).context("Document is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Document must be a JSON object");
    }
    Ok(value)
}

pub(crate) fn print_documents(documents: &[Value]) -> Result<()> {
    for (i, doc) in documents.iter().enumerate() {
        println!("\n[{}]", i + 1);
        println!("{}", serde_json::to_string_pretty(doc)?);
    }
    println!("\n{} document(s)", documents.len());
    Ok(())
}

/// Ask for a y/N confirmation on stdin
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N): ", prompt);
    std::io::stdout().flush()?;
    let mut confirmation = String::new();
    std::io::stdin().read_line(&mut confirmation)?;
    Ok(confirmation.trim().to_lowercase().starts_with('y'))
}
