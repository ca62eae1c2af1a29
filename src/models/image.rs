// Docker image records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Image id; the reporter keys items by `name`.
    pub name: String,
    pub parent_id: String,
    pub created: i64,
    pub repo_digests: Vec<String>,
    pub repo_tags: Vec<String>,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_size: Option<i64>,
    /// Omitted when the daemon did not compute it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<i64>,
    /// Omitted when the daemon did not compute it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_size: Option<i64>,
}
