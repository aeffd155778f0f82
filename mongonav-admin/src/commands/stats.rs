use anyhow::Result;
use clap::Subcommand;
use mongonav_core::client::DashboardStats;
use mongonav_core::{format_bytes, format_uptime, poll_dashboard, MonitorSettings, NavigatorClient};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Show dashboard totals and server metrics
    Dashboard,
    /// Check that the backend can reach MongoDB
    Status,
    /// Refresh the dashboard until interrupted
    Watch {
        /// Refresh interval in seconds (defaults to monitor.dashboard_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

pub async fn execute_stats_command(
    client: &NavigatorClient,
    settings: &MonitorSettings,
    command: StatsCommands,
) -> Result<()> {
    match command {
        StatsCommands::Dashboard => {
            println!("Fetching dashboard statistics...");
            let stats = client.dashboard().await?;
            print_dashboard(&stats);
        }

        StatsCommands::Status => {
            let status = client.status().await?;
            println!("✓ {}", status);
        }

        StatsCommands::Watch { interval } => {
            let period = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.interval());
            if period.is_zero() {
                anyhow::bail!("Interval cannot be 0");
            }

            let shutdown = CancellationToken::new();
            let signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal.cancel();
                }
            });

            println!(
                "Refreshing dashboard every {}s (Ctrl+C to stop)...",
                period.as_secs()
            );
            let fetches = poll_dashboard(client, period, shutdown, |result| match result {
                Ok(stats) => print_dashboard(&stats),
                Err(e) => println!("✗ {}", e),
            })
            .await;

            println!("\nStopped after {} refresh(es)", fetches);
        }
    }

    Ok(())
}

fn print_dashboard(stats: &DashboardStats) {
    println!("\nDashboard");
    println!("{}", "=".repeat(50));
    if !stats.connected_to.is_empty() {
        println!("Connected To: {}", stats.connected_to);
    }

    let totals = &stats.totals;
    println!("Databases:    {}", totals.databases);
    println!("Collections:  {}", totals.collections);
    println!("Documents:    {}", totals.documents);
    println!("Indexes:      {}", totals.indexes);
    println!("Storage:      {}", format_bytes(totals.storage_size_bytes));

    let server = &stats.server;
    println!("\nServer");
    println!("{}", "-".repeat(50));
    println!("Uptime:       {}", format_uptime(server.uptime_seconds));
    println!("Connections:  {}", server.connections_current);
    println!("Ops/sec:      {:.2}", server.ops_per_second);
}
