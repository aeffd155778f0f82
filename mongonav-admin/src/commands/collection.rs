use anyhow::{Context, Result};
use clap::Subcommand;
use mongonav_core::client::{document_id, DocumentListOptions};
use mongonav_core::{NavigatorClient, QuerySettings};
use serde_json::Value;

use super::{confirm, print_documents, read_document};

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List collections of a database
    List {
        /// Database name
        database: String,
    },
    /// Browse documents of a collection
    Docs {
        database: String,
        collection: String,
        /// JSON filter applied by the backend
        #[arg(short, long)]
        filter: Option<String>,
        /// Documents to skip
        #[arg(long, default_value = "0")]
        skip: u64,
        /// Maximum documents to return (defaults to query.default_limit)
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Show the indexes of a collection
    Indexes {
        database: String,
        collection: String,
    },
    /// Field statistics over a random sample
    Stats {
        database: String,
        collection: String,
        /// Sample size (defaults to query.stats_sample_size)
        #[arg(long)]
        sample: Option<u64>,
    },
    /// Fetch a document by id
    Get {
        database: String,
        collection: String,
        id: String,
    },
    /// Insert a document (JSON, or @file)
    Insert {
        database: String,
        collection: String,
        document: String,
    },
    /// Set fields on a document (JSON, or @file)
    Update {
        database: String,
        collection: String,
        id: String,
        document: String,
    },
    /// Delete a document by id
    Delete {
        database: String,
        collection: String,
        id: String,
        /// Force deletion without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn execute_collection_command(
    client: &NavigatorClient,
    settings: &QuerySettings,
    command: CollectionCommands,
) -> Result<()> {
    match command {
        CollectionCommands::List { database } => {
            println!("Fetching collections of '{}'...", database);

            let collections = client.list_collections(&database).await?;
            if collections.is_empty() {
                println!("No collections found");
                return Ok(());
            }

            println!("\nNAME");
            println!("{}", "-".repeat(40));
            for name in &collections {
                println!("{}", name);
            }
            println!("\n{} collection(s)", collections.len());
        }

        CollectionCommands::Docs {
            database,
            collection,
            filter,
            skip,
            limit,
        } => {
            let mut options = DocumentListOptions::default()
                .skip(skip)
                .limit(limit.unwrap_or(settings.default_limit));
            if let Some(filter) = filter {
                let filter: Value = serde_json::from_str(&filter).context("Filter is not valid JSON")?;
                options = options.filter(filter);
            }

            println!("Fetching documents from '{}.{}'...", database, collection);
            let documents = client.list_documents(&database, &collection, &options).await?;
            print_documents(&documents)?;
        }

        CollectionCommands::Indexes {
            database,
            collection,
        } => {
            println!("Fetching indexes of '{}.{}'...", database, collection);

            let indexes = client.list_indexes(&database, &collection).await?;
            println!("\n{:<30} {:<40} {:<8}", "NAME", "KEYS", "UNIQUE");
            println!("{}", "-".repeat(80));
            for index in &indexes {
                let name = index.get("name").and_then(|n| n.as_str()).unwrap_or("-");
                let keys = index
                    .get("key")
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let unique = index.get("unique").and_then(|u| u.as_bool()).unwrap_or(false);
                println!(
                    "{:<30} {:<40} {:<8}",
                    name,
                    keys,
                    if unique { "Yes" } else { "No" }
                );
            }
        }

        CollectionCommands::Stats {
            database,
            collection,
            sample,
        } => {
            let sample = sample.unwrap_or(settings.stats_sample_size);
            println!(
                "Sampling {} documents from '{}.{}'...",
                sample, database, collection
            );

            let stats = client.collection_stats(&database, &collection, sample).await?;

            println!("\nField Statistics");
            println!("{}", "=".repeat(70));
            println!("{:<25} {:<8} {:<20} {:<15}", "FIELD", "COUNT", "TYPES", "SAMPLE");
            println!("{}", "-".repeat(70));
            for (field, field_stats) in &stats {
                println!(
                    "{:<25} {:<8} {:<20} {:<15}",
                    field,
                    field_stats.count,
                    field_stats.types.join(", "),
                    field_stats.sample.to_string()
                );
            }
        }

        CollectionCommands::Get {
            database,
            collection,
            id,
        } => match client.get_document(&database, &collection, &id).await? {
            Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            None => println!("Document '{}' not found", id),
        },

        CollectionCommands::Insert {
            database,
            collection,
            document,
        } => {
            let document = read_document(&document).await?;
            let result = client.create_document(&database, &collection, &document).await?;
            let id = document_id(&serde_json::json!({ "_id": result.inserted_id.clone() }))
                .unwrap_or_else(|| result.inserted_id.to_string());
            println!("✓ Inserted document {}", id);
        }

        CollectionCommands::Update {
            database,
            collection,
            id,
            document,
        } => {
            let document = read_document(&document).await?;
            let result = client
                .update_document(&database, &collection, &id, &document)
                .await?;
            if result.matched == 0 {
                println!("✗ No document with id '{}'", id);
            } else {
                println!("✓ Matched {}, modified {}", result.matched, result.modified);
            }
        }

        CollectionCommands::Delete {
            database,
            collection,
            id,
            force,
        } => {
            if !force {
                println!(
                    "⚠️  WARNING: This will permanently delete document '{}' from '{}.{}'!",
                    id, database, collection
                );
                if !confirm("Are you sure you want to continue?")? {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }

            let result = client.delete_document(&database, &collection, &id).await?;
            if result.deleted == 0 {
                println!("✗ No document with id '{}'", id);
            } else {
                println!("✓ Deleted document '{}'", id);
            }
        }
    }

    Ok(())
}
