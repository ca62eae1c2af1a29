// Container network attachment records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpamConfig {
    #[serde(rename = "IPv4Address", default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    #[serde(rename = "IPv6Address", default, skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
    #[serde(rename = "LinkLocalIPs", default, skip_serializing_if = "Option::is_none")]
    pub link_local_ips: Option<Vec<String>>,
}

/// One (container, attached network) pair. `name` is `{containerName}_{networkKey}`.
///
/// The link metadata fields are forwarded as the daemon sent them, `null` included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub name: String,
    pub network_id: String,
    pub endpoint_id: String,
    pub gateway: Option<String>,
    pub ip_address: Option<String>,
    pub ip_prefix_len: Option<i64>,
    pub ipv6_gateway: Option<String>,
    pub global_ipv6_address: Option<String>,
    #[serde(rename = "MacAddress")]
    pub mac_address: Option<String>,
    pub driver_opts: Option<BTreeMap<String, String>>,
    pub aliases: Option<Vec<String>>,
    pub links: Option<Vec<String>>,
    pub ipam_config: Option<IpamConfig>,
}
