// Images check

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{Check, CheckError};
use crate::docker_repo::{DaemonApi, IMAGES_PATH};
use crate::models::Snapshot;
use crate::normalize::normalize_images;

const KEY: &str = "images";

pub struct ImagesCheck<D> {
    daemon: Arc<D>,
    interval: Duration,
}

impl<D: DaemonApi> ImagesCheck<D> {
    pub fn new(daemon: Arc<D>, interval: Duration) -> Self {
        Self { daemon, interval }
    }
}

impl<D: DaemonApi> Check for ImagesCheck<D> {
    type Raw = Value;

    fn key(&self) -> &'static str {
        KEY
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn gather(&self) -> Result<Value, CheckError> {
        self.daemon
            .call(IMAGES_PATH)
            .await
            .map_err(CheckError::daemon(KEY))
    }

    fn shape(&self, raw: Value) -> Result<Snapshot, CheckError> {
        let images = normalize_images(raw).map_err(CheckError::invalid(KEY))?;
        Ok(Snapshot::images(images))
    }
}
