use anyhow::Result;
use clap::Subcommand;
use mongonav_core::{format_bytes, NavigatorClient};

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// List databases with collection counts and sizes
    List,
}

pub async fn execute_database_command(client: &NavigatorClient, command: DatabaseCommands) -> Result<()> {
    match command {
        DatabaseCommands::List => {
            println!("Fetching database list...");

            let databases = client.list_databases().await?;
            if databases.is_empty() {
                println!("No databases found");
                return Ok(());
            }

            println!(
                "\n{:<24} {:<12} {:<12} {:<12}",
                "NAME", "COLLECTIONS", "DOCUMENTS", "SIZE"
            );
            println!("{}", "-".repeat(64));

            for db in &databases {
                println!(
                    "{:<24} {:<12} {:<12} {:<12}",
                    db.name,
                    db.collections,
                    db.documents,
                    format_bytes(db.storage_size)
                );
            }

            println!("\n{} database(s)", databases.len());
        }
    }

    Ok(())
}
