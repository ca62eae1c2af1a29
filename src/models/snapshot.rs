// Per-check snapshot fragment

use serde::{Deserialize, Serialize};

use super::{ContainerRecord, ImageRecord, NetworkRecord, SystemRecord};

/// Category -> records. Each check fills only the categories it owns; the rest are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<ContainerRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<NetworkRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Vec<SystemRecord>>,
}

impl Snapshot {
    pub fn containers(containers: Vec<ContainerRecord>, networks: Vec<NetworkRecord>) -> Self {
        Self {
            containers: Some(containers),
            networks: Some(networks),
            ..Default::default()
        }
    }

    pub fn images(images: Vec<ImageRecord>) -> Self {
        Self {
            images: Some(images),
            ..Default::default()
        }
    }

    pub fn system(system: SystemRecord) -> Self {
        Self {
            system: Some(vec![system]),
            ..Default::default()
        }
    }
}
