// Shared test helpers: an in-memory daemon and response fixtures

#![allow(dead_code)]

use docker_agent::docker_repo::{CallFailure, DaemonApi, DaemonError};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers daemon calls from a fixed path -> body table and records concurrency.
#[derive(Default)]
pub struct FakeDaemon {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    delays: Vec<(String, Duration)>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Delays every call whose path contains `pattern`.
    pub fn with_delay(mut self, pattern: &str, delay: Duration) -> Self {
        self.delays.push((pattern.to_string(), delay));
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DaemonApi for FakeDaemon {
    async fn call(&self, path: &str) -> Result<Value, DaemonError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((_, delay)) = self.delays.iter().find(|(p, _)| path.contains(p.as_str())) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(path) {
            return Err(DaemonError::call(
                path,
                CallFailure::Status {
                    status: 500,
                    message: "boom".into(),
                },
            ));
        }
        self.responses.get(path).cloned().ok_or_else(|| {
            DaemonError::call(
                path,
                CallFailure::Status {
                    status: 404,
                    message: format!("no fixture for {path}"),
                },
            )
        })
    }
}

pub fn container_json(id: &str, name: &str, networks: &[&str]) -> Value {
    let networks: serde_json::Map<String, Value> = networks
        .iter()
        .map(|n| {
            (
                n.to_string(),
                json!({
                    "IPAMConfig": null,
                    "Links": null,
                    "Aliases": null,
                    "NetworkID": format!("net-{n}"),
                    "EndpointID": format!("ep-{id}-{n}"),
                    "Gateway": "172.17.0.1",
                    "IPAddress": "172.17.0.2",
                    "IPPrefixLen": 16,
                    "IPv6Gateway": "",
                    "GlobalIPv6Address": "",
                    "GlobalIPv6PrefixLen": 0,
                    "MacAddress": "02:42:ac:11:00:02",
                    "DriverOpts": null
                }),
            )
        })
        .collect();
    json!({
        "Id": id,
        "Names": [format!("/{name}")],
        "Image": "nginx:latest",
        "ImageID": "sha256:0123",
        "Command": "nginx -g 'daemon off;'",
        "Created": 1_700_000_000,
        "State": "running",
        "Status": "Up 5 minutes",
        "Ports": [{"IP": "0.0.0.0", "PrivatePort": 80, "PublicPort": 8080, "Type": "tcp"}],
        "Labels": {},
        "HostConfig": {"NetworkMode": "bridge"},
        "NetworkSettings": {"Networks": networks}
    })
}

pub fn inventory(containers: &[(&str, &[&str])]) -> Value {
    Value::Array(
        containers
            .iter()
            .map(|(id, networks)| container_json(id, &format!("name-{id}"), networks))
            .collect(),
    )
}

/// A stats body giving cpu 120% (200->500 over 1000->2000 on 4 CPUs) and memory 25%.
pub fn stats_json() -> Value {
    json!({
        "cpu_stats": {
            "cpu_usage": {"total_usage": 500, "usage_in_kernelmode": 0, "usage_in_usermode": 0},
            "system_cpu_usage": 2000,
            "online_cpus": 4
        },
        "precpu_stats": {
            "cpu_usage": {"total_usage": 200, "usage_in_kernelmode": 0, "usage_in_usermode": 0},
            "system_cpu_usage": 1000,
            "online_cpus": 4
        },
        "memory_stats": {"usage": 300, "limit": 1000, "stats": {"cache": 50}}
    })
}

pub fn image_json(id: &str, containers: i64, shared_size: i64) -> Value {
    json!({
        "Id": id,
        "ParentId": "",
        "RepoTags": null,
        "RepoDigests": [format!("nginx@{id}")],
        "Created": 1_650_000_000,
        "Size": 1000,
        "VirtualSize": 1000,
        "SharedSize": shared_size,
        "Labels": {},
        "Containers": containers
    })
}

pub fn info_json() -> Value {
    json!({
        "ID": "7TRN:IPZB:QYBB",
        "Containers": 2,
        "ContainersRunning": 1,
        "ContainersPaused": 0,
        "ContainersStopped": 1,
        "Images": 3,
        "Driver": "overlay2",
        "SystemStatus": null,
        "MemoryLimit": true,
        "SwapLimit": false,
        "CpuCfsPeriod": true,
        "CpuCfsQuota": true,
        "CPUShares": true,
        "CPUSet": true,
        "PidsLimit": true,
        "IPv4Forwarding": true,
        "BridgeNfIptables": true,
        "BridgeNfIp6tables": true,
        "Debug": false,
        "OomKillDisable": false,
        "NGoroutines": 40,
        "SystemTime": "2024-05-01T12:00:00.123456789+02:00",
        "LoggingDriver": "json-file",
        "NEventsListener": 0,
        "KernelVersion": "6.8.0",
        "OperatingSystem": "Debian GNU/Linux 12",
        "OSType": "linux",
        "Architecture": "x86_64",
        "IndexServerAddress": "https://index.docker.io/v1/",
        "NCPU": 8,
        "MemTotal": 16_000_000_000_i64,
        "DockerRootDir": "/var/lib/docker",
        "HttpProxy": "",
        "HttpsProxy": "",
        "NoProxy": "",
        "Name": "host-1",
        "ExperimentalBuild": false,
        "ServerVersion": "26.1.0",
        "DefaultRuntime": "runc",
        "LiveRestoreEnabled": false,
        "Isolation": "",
        "InitBinary": "docker-init",
        "Warnings": ["WARNING: No swap limit support"]
    })
}
