//! Chat broadcast service
//!
//! One timer per channel pushes the full chat log to every registered
//! connection, independent of how many clients are connected.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use crate::chat::{BroadcastReport, ChatChannel};

/// Broadcast service configuration
#[derive(Clone)]
pub struct BroadcastConfig {
    /// Period between two pushes of the log
    pub interval: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
        }
    }
}

/// Periodic chat log broadcaster
pub struct BroadcastService {
    channel: ChatChannel,
    config: BroadcastConfig,
}

impl BroadcastService {
    pub fn new(channel: ChatChannel, config: BroadcastConfig) -> Self {
        Self { channel, config }
    }

    /// Run until the shutdown flag flips to true or its sender is dropped
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting chat broadcast service (interval: {}ms)",
            self.config.interval.as_millis()
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // Skip immediate tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Chat broadcast service shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Push one snapshot to every connection
    pub fn tick(&self) -> BroadcastReport {
        match self.channel.broadcast_snapshot() {
            Ok(report) => {
                if report.delivered > 0 || report.closed > 0 {
                    debug!(
                        delivered = report.delivered,
                        dropped = report.dropped,
                        closed = report.closed,
                        "Broadcast chat log"
                    );
                }
                report
            }
            Err(e) => {
                error!("Failed to serialize chat log: {}", e);
                BroadcastReport::default()
            }
        }
    }
}

/// Handle for stopping the broadcast service
pub struct BroadcastHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl BroadcastHandle {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { shutdown_tx: tx }, rx)
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Default for BroadcastHandle {
    fn default() -> Self {
        Self::new().0
    }
}
