// Daemon-wide configuration and counters

use serde::{Deserialize, Serialize};

/// Flattened `/info` response plus the agent's own version.
///
/// Version-dependent fields are `Option` and omitted from the output when the daemon
/// did not return them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    pub id: String,
    pub containers: u64,
    pub containers_running: u64,
    pub containers_paused: u64,
    pub containers_stopped: u64,
    pub images: u64,
    pub driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_status: Option<Vec<Vec<String>>>,
    pub memory_limit: bool,
    pub swap_limit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_memory: Option<bool>,
    #[serde(
        rename = "kernelMemoryTCP",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kernel_memory_tcp: Option<bool>,
    pub cpu_cfs_period: bool,
    pub cpu_cfs_quota: bool,
    pub cpu_shares: bool,
    pub cpu_set: bool,
    pub pids_limit: bool,
    pub ipv4_forwarding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_nf_iptables: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_nf_ip6tables: Option<bool>,
    pub debug: bool,
    pub oom_kill_disable: bool,
    pub n_goroutines: i64,
    /// Daemon clock as Unix seconds; omitted when the daemon's timestamp is unparseable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_time: Option<i64>,
    pub logging_driver: String,
    pub n_events_listener: i64,
    pub kernel_version: String,
    pub operating_system: String,
    pub os_type: String,
    pub architecture: String,
    pub index_server_address: String,
    pub n_cpu: i64,
    pub mem_total: i64,
    pub docker_root_dir: String,
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
    pub name: String,
    pub experimental_build: bool,
    pub server_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_advertise: Option<String>,
    pub default_runtime: String,
    pub live_restore_enabled: bool,
    pub isolation: String,
    pub init_binary: String,
    pub warnings: Vec<String>,
    pub infrasonar_agent_version: String,
}
