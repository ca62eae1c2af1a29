// Derive CPU and memory percentages from a raw Docker stats response.

use bollard::models::{ContainerCpuStats, ContainerMemoryStats, ContainerStatsResponse};

/// Memory counters subtracted from usage, in order of preference (cgroup v1, v2, v1 hierarchical).
const CACHE_KEYS: [&str; 3] = ["cache", "inactive_file", "total_inactive_file"];

/// Percentages derived from one non-streaming stats sample. Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContainerUsage {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
}

/// Process a raw Docker stats response into the derived usage percentages.
pub fn process_statistics(s: &ContainerStatsResponse) -> ContainerUsage {
    ContainerUsage {
        cpu: s
            .cpu_stats
            .as_ref()
            .zip(s.precpu_stats.as_ref())
            .and_then(|(cpu, precpu)| cpu_percent(cpu, precpu)),
        memory: s.memory_stats.as_ref().and_then(memory_percent),
    }
}

/// `(cpu_delta / system_delta) * online_cpus * 100` over the daemon-supplied sample pair.
pub fn cpu_percent(cpu_stats: &ContainerCpuStats, precpu_stats: &ContainerCpuStats) -> Option<f64> {
    let total = cpu_stats.cpu_usage.as_ref()?.total_usage?;
    let pre_total = precpu_stats.cpu_usage.as_ref()?.total_usage?;
    let system = cpu_stats.system_cpu_usage?;
    let pre_system = precpu_stats.system_cpu_usage?;

    let cpu_delta = total as i64 - pre_total as i64;
    let system_delta = system as i64 - pre_system as i64;
    // Counters reset when a container restarts between samples.
    if cpu_delta < 0 || system_delta <= 0 {
        return None;
    }
    let online = online_cpus(cpu_stats, precpu_stats)?;
    Some((cpu_delta as f64 / system_delta as f64) * online as f64 * 100.0)
}

/// Online CPU count: current sample, then previous sample, then the per-CPU array length.
fn online_cpus(cpu_stats: &ContainerCpuStats, precpu_stats: &ContainerCpuStats) -> Option<u64> {
    cpu_stats
        .online_cpus
        .or(precpu_stats.online_cpus)
        .map(u64::from)
        .or_else(|| {
            cpu_stats
                .cpu_usage
                .as_ref()
                .and_then(|u| u.percpu_usage.as_ref())
                .map(|p| p.len() as u64)
        })
        .filter(|&n| n > 0)
}

/// `(usage - cache) / limit * 100`; absent when usage or a non-zero limit is missing.
pub fn memory_percent(memory_stats: &ContainerMemoryStats) -> Option<f64> {
    let usage = memory_stats.usage?;
    let limit = memory_stats.limit.filter(|&l| l > 0)?;
    let cache = memory_stats
        .stats
        .as_ref()
        .and_then(|stats| CACHE_KEYS.iter().find_map(|key| stats.get(*key).copied()))
        .unwrap_or(0);
    Some(usage.saturating_sub(cache) as f64 / limit as f64 * 100.0)
}
