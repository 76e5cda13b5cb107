//! Liveness supervisor: periodic ping sweep over every open connection.
//!
//! The sweep only keeps idle connections from being cut by intermediaries.
//! It never closes anything; dead sockets surface as read/write failures in
//! the connection tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::metrics::RelayMetrics;

use super::handle::Outbound;
use super::pool::ConnectionPool;

/// Sends a ping to every open connection on a fixed interval.
#[derive(Debug, Clone)]
pub struct LivenessSupervisor {
    pool: Arc<ConnectionPool>,
    metrics: Arc<RelayMetrics>,
    interval: Duration,
}

impl LivenessSupervisor {
    /// Creates a supervisor over the shared connection pool.
    pub fn new(pool: Arc<ConnectionPool>, metrics: Arc<RelayMetrics>, interval: Duration) -> Self {
        Self {
            pool,
            metrics,
            interval,
        }
    }

    /// Queues one ping per open connection. Returns how many were queued.
    ///
    /// A full queue skips that connection for this round.
    pub fn probe_all(&self) -> usize {
        let mut sent = 0;
        for conn in self.pool.all_connections() {
            if !conn.is_open() {
                continue;
            }
            match conn.send(Outbound::Ping) {
                Ok(()) => sent += 1,
                Err(e) => trace!(conn_id = %conn.id, error = %e, "Ping not queued"),
            }
        }
        self.metrics.pings_sent(sent as u64);
        sent
    }

    /// Runs the sweep until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sent = self.probe_all();
                    trace!(sent, "Liveness sweep");
                }
                _ = shutdown.recv() => break,
            }
        }

        debug!("Liveness supervisor stopped");
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
