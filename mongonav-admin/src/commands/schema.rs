use anyhow::{Context, Result};
use clap::Subcommand;
use mongonav_core::{SchemaField, SchemaPreview};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Show the fields of a schema file and the conditions they suggest
    Preview {
        /// Schema file (JSON)
        file: PathBuf,
        /// Only show this collection
        #[arg(short, long)]
        collection: Option<String>,
    },
}

pub async fn execute_schema_command(command: SchemaCommands) -> Result<()> {
    match command {
        SchemaCommands::Preview { file, collection } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read schema file {}", file.display()))?;
            let preview = SchemaPreview::parse(&content)?;

            let names: Vec<&String> = match &collection {
                Some(name) => {
                    if !preview.collections.contains_key(name) {
                        anyhow::bail!("Collection '{}' not found in {}", name, file.display());
                    }
                    vec![name]
                }
                None => preview.collections.keys().collect(),
            };

            for name in names {
                let fields = preview.fields(name).unwrap_or_default();
                print_collection(name, fields);

                let rows = preview.condition_rows(name);
                if !rows.is_empty() {
                    println!("\nSuggested conditions:");
                    for row in rows {
                        println!("  --where {}:{}:{}:", row.field, row.field_type, row.operator);
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_collection(name: &str, fields: &[SchemaField]) {
    println!("\nCollection: {}", name);
    println!("{}", "=".repeat(70));
    println!("{:<28} {:<10} {:<9} {:<8} {}", "FIELD", "TYPE", "EDITOR", "REQUIRED", "DETAILS");
    println!("{}", "-".repeat(70));

    for field in fields {
        println!(
            "{:<28} {:<10} {:<9} {:<8} {}",
            field.path,
            field.schema_type,
            field.suggested_type(),
            if field.required { "Yes" } else { "No" },
            details(field)
        );
    }
}

fn details(field: &SchemaField) -> String {
    let mut parts = Vec::new();
    if let Some(format) = &field.format {
        parts.push(format!("format: {}", format));
    }
    if !field.enum_values.is_empty() {
        let values: Vec<String> = field.enum_values.iter().map(|v| v.to_string()).collect();
        parts.push(format!("enum: {}", values.join(" | ")));
    }
    if let Some(min) = field.minimum {
        parts.push(format!("min: {}", min));
    }
    if let Some(max) = field.maximum {
        parts.push(format!("max: {}", max));
    }
    if let Some(default) = &field.default {
        parts.push(format!("default: {}", default));
    }
    parts.join(", ")
}
