// Per-container stats fan-out over the daemon client

pub mod client;
pub mod stats;

pub use client::{API_VERSION, CallFailure, DaemonApi, DaemonClient, DaemonError};
pub use stats::{ContainerUsage, process_statistics};

use bollard::models::ContainerStatsResponse;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::warn;

/// Upper bound on simultaneous in-flight stats requests per collector.
pub const MAX_IN_FLIGHT_STATS: usize = 10;

/// Limit on one container's stats request. Kept well under the 60 s check cap so a
/// hung container only loses its own metrics.
pub const STATS_CALL_TIMEOUT: Duration = Duration::from_secs(20);

pub const CONTAINERS_PATH: &str = "/containers/json?all=true";
pub const IMAGES_PATH: &str = "/images/json?all=false";
pub const INFO_PATH: &str = "/info";

pub fn stats_path(container_id: &str) -> String {
    format!("/containers/{container_id}/stats?stream=false")
}

/// Why one container has no stats sample.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Daemon(#[from] DaemonError),
    #[error("malformed stats body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stats request timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("concurrency gate closed")]
    GateClosed,
}

#[derive(Debug)]
pub struct EntityFailure {
    pub container_id: String,
    pub error: StatsError,
}

/// Outcome of one fan-out: samples keyed by container id plus the per-container failures.
#[derive(Debug, Default)]
pub struct StatsBatch {
    pub samples: HashMap<String, ContainerStatsResponse>,
    pub failures: Vec<EntityFailure>,
}

/// Fetches non-streaming stats for many containers, at most [`MAX_IN_FLIGHT_STATS`] at a time.
///
/// All requests run as futures on the calling task; dropping the returned future (timeout or
/// cancellation) drops every pending request and releases their permits.
#[derive(Debug)]
pub struct StatsCollector {
    gate: Semaphore,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(MAX_IN_FLIGHT_STATS),
        }
    }

    /// Free slots in the concurrency gate; equals [`MAX_IN_FLIGHT_STATS`] when idle.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    pub async fn collect<D: DaemonApi>(&self, daemon: &D, container_ids: &[String]) -> StatsBatch {
        let tasks = container_ids.iter().cloned().map(|id| async move {
            let result = self.fetch_one(daemon, &id).await;
            (id, result)
        });

        let mut batch = StatsBatch::default();
        for (id, result) in join_all(tasks).await {
            match result {
                Ok(sample) => {
                    batch.samples.insert(id, sample);
                }
                Err(error) => {
                    warn!(
                        container_id = %id,
                        error = %error,
                        operation = "container_stats",
                        "stats unavailable for container"
                    );
                    batch.failures.push(EntityFailure {
                        container_id: id,
                        error,
                    });
                }
            }
        }
        batch
    }

    async fn fetch_one<D: DaemonApi>(
        &self,
        daemon: &D,
        container_id: &str,
    ) -> Result<ContainerStatsResponse, StatsError> {
        let body = {
            let _permit = self.gate.acquire().await.map_err(|_| StatsError::GateClosed)?;
            tokio::time::timeout(STATS_CALL_TIMEOUT, daemon.call(&stats_path(container_id)))
                .await
                .map_err(|_| StatsError::Timeout {
                    after: STATS_CALL_TIMEOUT,
                })??
        };
        Ok(serde_json::from_value(body)?)
    }
}
