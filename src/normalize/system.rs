// `/info` -> the single system record

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{ShapeError, type_name};
use crate::models::SystemRecord;
use crate::version;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawInfo {
    #[serde(rename = "ID")]
    id: String,
    containers: u64,
    containers_running: u64,
    containers_paused: u64,
    containers_stopped: u64,
    images: u64,
    driver: String,
    // Only set on some builds (moby/moby#40340).
    #[serde(default)]
    system_status: Option<Vec<Vec<String>>>,
    memory_limit: bool,
    swap_limit: bool,
    // Removed from newer daemons.
    #[serde(default)]
    kernel_memory: Option<bool>,
    #[serde(rename = "KernelMemoryTCP", default)]
    kernel_memory_tcp: Option<bool>,
    cpu_cfs_period: bool,
    cpu_cfs_quota: bool,
    #[serde(rename = "CPUShares")]
    cpu_shares: bool,
    #[serde(rename = "CPUSet")]
    cpu_set: bool,
    pids_limit: bool,
    #[serde(rename = "IPv4Forwarding")]
    ipv4_forwarding: bool,
    #[serde(default)]
    bridge_nf_iptables: Option<bool>,
    #[serde(default)]
    bridge_nf_ip6tables: Option<bool>,
    debug: bool,
    oom_kill_disable: bool,
    n_goroutines: i64,
    system_time: String,
    logging_driver: String,
    n_events_listener: i64,
    kernel_version: String,
    operating_system: String,
    #[serde(rename = "OSType")]
    os_type: String,
    architecture: String,
    index_server_address: String,
    #[serde(rename = "NCPU")]
    n_cpu: i64,
    mem_total: i64,
    docker_root_dir: String,
    http_proxy: String,
    https_proxy: String,
    no_proxy: String,
    name: String,
    experimental_build: bool,
    server_version: String,
    #[serde(default)]
    cluster_store: Option<String>,
    #[serde(default)]
    cluster_advertise: Option<String>,
    default_runtime: String,
    live_restore_enabled: bool,
    isolation: String,
    init_binary: String,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

/// RFC 3339 daemon time (nanosecond precision) to Unix seconds.
fn unix_seconds(system_time: &str) -> Option<i64> {
    match DateTime::parse_from_rfc3339(system_time) {
        Ok(t) => Some(t.timestamp()),
        Err(e) => {
            warn!(system_time, error = %e, "unparseable daemon SystemTime");
            None
        }
    }
}

pub fn normalize_system(data: Value) -> Result<SystemRecord, ShapeError> {
    if !data.is_object() {
        return Err(ShapeError(format!(
            "system response is not an object (got {})",
            type_name(&data)
        )));
    }
    let i: RawInfo =
        serde_json::from_value(data).map_err(|e| ShapeError(format!("system response: {e}")))?;
    Ok(SystemRecord {
        system_time: unix_seconds(&i.system_time),
        id: i.id,
        containers: i.containers,
        containers_running: i.containers_running,
        containers_paused: i.containers_paused,
        containers_stopped: i.containers_stopped,
        images: i.images,
        driver: i.driver,
        system_status: i.system_status,
        memory_limit: i.memory_limit,
        swap_limit: i.swap_limit,
        kernel_memory: i.kernel_memory,
        kernel_memory_tcp: i.kernel_memory_tcp,
        cpu_cfs_period: i.cpu_cfs_period,
        cpu_cfs_quota: i.cpu_cfs_quota,
        cpu_shares: i.cpu_shares,
        cpu_set: i.cpu_set,
        pids_limit: i.pids_limit,
        ipv4_forwarding: i.ipv4_forwarding,
        bridge_nf_iptables: i.bridge_nf_iptables,
        bridge_nf_ip6tables: i.bridge_nf_ip6tables,
        debug: i.debug,
        oom_kill_disable: i.oom_kill_disable,
        n_goroutines: i.n_goroutines,
        logging_driver: i.logging_driver,
        n_events_listener: i.n_events_listener,
        kernel_version: i.kernel_version,
        operating_system: i.operating_system,
        os_type: i.os_type,
        architecture: i.architecture,
        index_server_address: i.index_server_address,
        n_cpu: i.n_cpu,
        mem_total: i.mem_total,
        docker_root_dir: i.docker_root_dir,
        http_proxy: i.http_proxy,
        https_proxy: i.https_proxy,
        no_proxy: i.no_proxy,
        name: i.name,
        experimental_build: i.experimental_build,
        server_version: i.server_version,
        cluster_store: i.cluster_store,
        cluster_advertise: i.cluster_advertise,
        default_runtime: i.default_runtime,
        live_restore_enabled: i.live_restore_enabled,
        isolation: i.isolation,
        init_binary: i.init_binary,
        warnings: i.warnings.unwrap_or_default(),
        infrasonar_agent_version: version::VERSION.to_string(),
    })
}
