use anyhow::{Context, Result};
use clap::Subcommand;
use mongonav_core::{shorten_uri, NavigatorClient, NavigatorConfig};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show the backend's connection settings
    Settings,
    /// Register a Gemini API key with the backend (prompts if omitted)
    SetGeminiKey {
        key: Option<String>,
    },
}

pub async fn execute_config_command(
    client: &NavigatorClient,
    config: &NavigatorConfig,
    path: &Path,
    command: ConfigCommands,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("Configuration file: {}", path.display());
            if !path.exists() {
                println!("(not found, showing defaults with overrides)");
            }
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(config)?);
        }

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                );
            }
            NavigatorConfig::default().save(path)?;
            println!("✓ Wrote default configuration to {}", path.display());
        }

        ConfigCommands::Settings => {
            println!("Fetching backend settings...");
            let settings = client.settings().await?;

            let connection = if settings.shortened_connection_string.is_empty() {
                shorten_uri(&settings.connection_string)
            } else {
                settings.shortened_connection_string
            };

            println!("\nBackend Settings");
            println!("{}", "=".repeat(50));
            println!("Backend:        {}", client.base_url());
            println!("Connected To:   {}", connection);
            println!(
                "Auth Enabled:   {}",
                if settings.auth_enabled_default { "Yes" } else { "No" }
            );
            println!(
                "AI Key:         {}",
                if settings.has_gemini_key { "Configured" } else { "Not set" }
            );
        }

        ConfigCommands::SetGeminiKey { key } => {
            let key = match key {
                Some(key) => key,
                None => rpassword::prompt_password("Gemini API key: ")
                    .context("Failed to read API key")?,
            };
            if key.trim().is_empty() {
                anyhow::bail!("API key cannot be empty");
            }

            let update = client.update_settings(Some(&key)).await?;
            if update.success && update.has_gemini_key {
                println!("✓ Gemini API key registered");
            } else {
                println!("✗ Backend did not accept the key");
            }
        }
    }

    Ok(())
}
