// System check: the daemon's `/info`

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{Check, CheckError};
use crate::docker_repo::{DaemonApi, INFO_PATH};
use crate::models::Snapshot;
use crate::normalize::normalize_system;

const KEY: &str = "system";

pub struct SystemCheck<D> {
    daemon: Arc<D>,
    interval: Duration,
}

impl<D: DaemonApi> SystemCheck<D> {
    pub fn new(daemon: Arc<D>, interval: Duration) -> Self {
        Self { daemon, interval }
    }
}

impl<D: DaemonApi> Check for SystemCheck<D> {
    type Raw = Value;

    fn key(&self) -> &'static str {
        KEY
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn gather(&self) -> Result<Value, CheckError> {
        self.daemon
            .call(INFO_PATH)
            .await
            .map_err(CheckError::daemon(KEY))
    }

    fn shape(&self, raw: Value) -> Result<Snapshot, CheckError> {
        let system = normalize_system(raw).map_err(CheckError::invalid(KEY))?;
        Ok(Snapshot::system(system))
    }
}
