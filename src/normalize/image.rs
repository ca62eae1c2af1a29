// `/images/json` -> image records

use serde::Deserialize;
use serde_json::Value;

use super::{ShapeError, sequence_items};
use crate::models::ImageRecord;

/// Sentinel the daemon uses for counters it did not compute.
const NOT_COMPUTED: i64 = -1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawImage {
    id: String,
    parent_id: String,
    created: i64,
    // Older daemons send null instead of an empty list.
    #[serde(default)]
    repo_digests: Option<Vec<String>>,
    #[serde(default)]
    repo_tags: Option<Vec<String>>,
    size: i64,
    #[serde(default)]
    virtual_size: Option<i64>,
    #[serde(default)]
    shared_size: Option<i64>,
    #[serde(default)]
    containers: Option<i64>,
}

pub fn normalize_images(data: Value) -> Result<Vec<ImageRecord>, ShapeError> {
    let raw: Vec<RawImage> = sequence_items(data, "images")?;
    Ok(raw
        .into_iter()
        .map(|i| ImageRecord {
            name: i.id,
            parent_id: i.parent_id,
            created: i.created,
            repo_digests: i.repo_digests.unwrap_or_default(),
            repo_tags: i.repo_tags.unwrap_or_default(),
            size: i.size,
            virtual_size: i.virtual_size,
            containers: i.containers.filter(|&n| n != NOT_COMPUTED),
            shared_size: i.shared_size.filter(|&n| n != NOT_COMPUTED),
        })
        .collect())
}
