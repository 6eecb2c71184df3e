use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Re-checks API health on a fixed cadence. Page data is only reloaded on
/// demand, so this never touches the view loads.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests, period: HEALTH_INTERVAL }
    }

    pub async fn run(self) {
        let mut health_interval = interval(self.period);
        // Skip the immediate first tick; startup already checks once.
        health_interval.tick().await;

        loop {
            health_interval.tick().await;
            if self
                .network_requests
                .send(NetworkRequest::CheckHealth)
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
