//! Dashboard polling and display helpers

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{DashboardStats, NavigatorClient};
use crate::error::ClientResult;

/// Fetch the dashboard now and then every `period` until `shutdown` fires
///
/// Failed fetches are handed to `on_update` and polling continues. Returns the
/// number of fetches made.
pub async fn poll_dashboard<F>(
    client: &NavigatorClient,
    period: Duration,
    shutdown: CancellationToken,
    mut on_update: F,
) -> u64
where
    F: FnMut(ClientResult<DashboardStats>),
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut fetches = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = client.dashboard() => result,
        };

        fetches += 1;
        if let Err(e) = &result {
            warn!("Dashboard refresh failed: {}", e);
        }
        on_update(result);
    }

    debug!("Dashboard polling stopped after {} fetches", fetches);
    fetches
}

/// Human-readable byte size
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", value as i64, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Uptime as `Nd Nh Nm`
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86400;
    let hours = (total % 86400) / 3600;
    let minutes = (total % 3600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(-10), "0 B");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0.0), "0d 0h 0m");
        assert_eq!(format_uptime(90061.5), "1d 1h 1m");
    }

    #[tokio::test]
    async fn test_poll_stops_when_cancelled_up_front() {
        let client = NavigatorClient::new(&crate::config::ApiSettings::new("http://127.0.0.1:9"))
            .unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let mut updates = 0;
        let fetches = poll_dashboard(&client, Duration::from_secs(60), shutdown, |_| updates += 1).await;
        assert_eq!(fetches, 0);
        assert_eq!(updates, 0);
    }
}
