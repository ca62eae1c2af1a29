// Containers check: inventory, stats fan-out, usage merge

use std::sync::Arc;
use std::time::Duration;

use super::{Check, CheckError};
use crate::docker_repo::{CONTAINERS_PATH, DaemonApi, StatsBatch, StatsCollector, process_statistics};
use crate::models::Snapshot;
use crate::normalize::{ContainerInventory, normalize_containers};

const KEY: &str = "containers";

pub struct ContainersCheck<D> {
    daemon: Arc<D>,
    interval: Duration,
    stats: StatsCollector,
}

/// Inventory records plus the stats samples gathered for them.
#[derive(Debug)]
pub struct ContainersRaw {
    pub inventory: ContainerInventory,
    pub stats: StatsBatch,
}

impl<D: DaemonApi> ContainersCheck<D> {
    pub fn new(daemon: Arc<D>, interval: Duration) -> Self {
        Self {
            daemon,
            interval,
            stats: StatsCollector::new(),
        }
    }

    pub fn stats_collector(&self) -> &StatsCollector {
        &self.stats
    }
}

impl<D: DaemonApi> Check for ContainersCheck<D> {
    type Raw = ContainersRaw;

    fn key(&self) -> &'static str {
        KEY
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn gather(&self) -> Result<ContainersRaw, CheckError> {
        let data = self
            .daemon
            .call(CONTAINERS_PATH)
            .await
            .map_err(CheckError::daemon(KEY))?;
        let inventory = normalize_containers(data).map_err(CheckError::invalid(KEY))?;
        let ids: Vec<String> = inventory.containers.iter().map(|c| c.id.clone()).collect();
        let stats = self.stats.collect(self.daemon.as_ref(), &ids).await;
        tracing::debug!(
            check = KEY,
            containers = ids.len(),
            with_stats = stats.samples.len(),
            stats_failures = stats.failures.len(),
            "containers gathered"
        );
        Ok(ContainersRaw { inventory, stats })
    }

    fn shape(&self, raw: ContainersRaw) -> Result<Snapshot, CheckError> {
        let ContainersRaw {
            mut inventory,
            stats,
        } = raw;
        for container in &mut inventory.containers {
            if let Some(sample) = stats.samples.get(&container.id) {
                let usage = process_statistics(sample);
                container.cpu = usage.cpu;
                container.memory = usage.memory;
            }
        }
        Ok(Snapshot::containers(inventory.containers, inventory.networks))
    }
}
