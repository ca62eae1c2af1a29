// `/containers/json` -> container and network records

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::{ShapeError, sequence_items};
use crate::models::{ContainerRecord, IpamConfig, NetworkRecord};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawContainer {
    id: String,
    names: Vec<String>,
    image: String,
    #[serde(rename = "ImageID")]
    image_id: String,
    command: String,
    created: i64,
    state: String,
    status: String,
    #[serde(default)]
    ports: Option<Vec<RawPort>>,
    #[serde(default)]
    host_config: Option<RawHostConfig>,
    #[serde(default)]
    network_settings: Option<RawNetworkSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPort {
    #[serde(rename = "IP", default)]
    ip: Option<String>,
    private_port: u16,
    #[serde(default)]
    public_port: Option<u16>,
    #[serde(rename = "Type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawHostConfig {
    #[serde(default)]
    network_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNetworkSettings {
    #[serde(default)]
    networks: Option<BTreeMap<String, RawEndpoint>>,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(rename = "NetworkID", default)]
    network_id: Option<String>,
    #[serde(rename = "EndpointID", default)]
    endpoint_id: Option<String>,
    #[serde(rename = "Gateway", default)]
    gateway: Option<String>,
    #[serde(rename = "IPAddress", default)]
    ip_address: Option<String>,
    #[serde(rename = "IPPrefixLen", default)]
    ip_prefix_len: Option<i64>,
    #[serde(rename = "IPv6Gateway", default)]
    ipv6_gateway: Option<String>,
    #[serde(rename = "GlobalIPv6Address", default)]
    global_ipv6_address: Option<String>,
    #[serde(rename = "MacAddress", default)]
    mac_address: Option<String>,
    #[serde(rename = "DriverOpts", default)]
    driver_opts: Option<BTreeMap<String, String>>,
    #[serde(rename = "Aliases", default)]
    aliases: Option<Vec<String>>,
    #[serde(rename = "Links", default)]
    links: Option<Vec<String>>,
    #[serde(rename = "IPAMConfig", default)]
    ipam_config: Option<IpamConfig>,
}

/// Container and network records from one inventory call, in daemon response order.
#[derive(Debug, Default)]
pub struct ContainerInventory {
    pub containers: Vec<ContainerRecord>,
    pub networks: Vec<NetworkRecord>,
}

/// `ip:privatePort->publicPort/type` for published ports, `privatePort/type` otherwise.
pub fn format_port(ip: Option<&str>, private_port: u16, public_port: Option<u16>, kind: &str) -> String {
    match (ip, public_port) {
        (Some(ip), Some(public_port)) if !ip.is_empty() => {
            format!("{ip}:{private_port}->{public_port}/{kind}")
        }
        _ => format!("{private_port}/{kind}"),
    }
}

fn trim_name(name: &str) -> String {
    name.trim_start_matches('/').to_string()
}

pub fn normalize_containers(data: Value) -> Result<ContainerInventory, ShapeError> {
    let raw: Vec<RawContainer> = sequence_items(data, "containers")?;
    let mut inventory = ContainerInventory {
        containers: Vec::with_capacity(raw.len()),
        networks: Vec::new(),
    };
    for c in raw {
        let Some(name) = c.names.first().map(|n| trim_name(n)) else {
            warn!(container_id = %c.id, "skipping container without names");
            continue;
        };
        if let Some(endpoints) = c.network_settings.and_then(|s| s.networks) {
            inventory
                .networks
                .extend(network_records(&c.id, &name, endpoints));
        }
        let ports = c
            .ports
            .unwrap_or_default()
            .iter()
            .map(|p| format_port(p.ip.as_deref(), p.private_port, p.public_port, &p.kind))
            .collect();
        inventory.containers.push(ContainerRecord {
            names: c.names.iter().map(|n| trim_name(n)).collect(),
            id: c.id,
            name,
            image: c.image,
            image_id: c.image_id,
            command: c.command,
            created: c.created,
            state: c.state,
            status: c.status,
            ports,
            network_mode: c.host_config.and_then(|h| h.network_mode),
            cpu: None,
            memory: None,
        });
    }
    Ok(inventory)
}

fn network_records(
    container_id: &str,
    container_name: &str,
    endpoints: BTreeMap<String, RawEndpoint>,
) -> impl Iterator<Item = NetworkRecord> {
    endpoints.into_iter().filter_map(move |(key, ep)| {
        let (Some(network_id), Some(endpoint_id)) = (ep.network_id, ep.endpoint_id) else {
            warn!(container_id, network = %key, "skipping network without NetworkID/EndpointID");
            return None;
        };
        Some(NetworkRecord {
            name: format!("{container_name}_{key}"),
            network_id,
            endpoint_id,
            gateway: ep.gateway,
            ip_address: ep.ip_address,
            ip_prefix_len: ep.ip_prefix_len,
            ipv6_gateway: ep.ipv6_gateway,
            global_ipv6_address: ep.global_ipv6_address,
            mac_address: ep.mac_address,
            driver_opts: ep.driver_opts,
            aliases: ep.aliases,
            links: ep.links,
            ipam_config: ep.ipam_config,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(id: &str, name: &str, networks: Value) -> Value {
        json!({
            "Id": id,
            "Names": [format!("/{name}")],
            "Image": "nginx:latest",
            "ImageID": "sha256:img",
            "Command": "nginx -g 'daemon off;'",
            "Created": 1_700_000_000,
            "State": "running",
            "Status": "Up 2 hours",
            "Ports": [
                {"IP": "0.0.0.0", "PrivatePort": 80, "PublicPort": 8080, "Type": "tcp"},
                {"PrivatePort": 443, "Type": "tcp"}
            ],
            "HostConfig": {"NetworkMode": "bridge"},
            "NetworkSettings": {"Networks": networks}
        })
    }

    fn endpoint(network_id: &str) -> Value {
        json!({
            "IPAMConfig": null,
            "Links": null,
            "Aliases": null,
            "NetworkID": network_id,
            "EndpointID": "ep1",
            "Gateway": "172.17.0.1",
            "IPAddress": "172.17.0.2",
            "IPPrefixLen": 16,
            "IPv6Gateway": "",
            "GlobalIPv6Address": "",
            "GlobalIPv6PrefixLen": 0,
            "MacAddress": "02:42:ac:11:00:02",
            "DriverOpts": null
        })
    }

    #[test]
    fn format_port_published_and_unpublished() {
        assert_eq!(
            format_port(Some("0.0.0.0"), 80, Some(8080), "tcp"),
            "0.0.0.0:80->8080/tcp"
        );
        assert_eq!(format_port(None, 80, None, "tcp"), "80/tcp");
        assert_eq!(format_port(Some("0.0.0.0"), 53, None, "udp"), "53/udp");
    }

    #[test]
    fn normalizes_container_and_networks() {
        let data = json!([container(
            "c1",
            "web",
            json!({"bridge": endpoint("n1"), "backend": endpoint("n2")})
        )]);
        let inv = normalize_containers(data).unwrap();
        assert_eq!(inv.containers.len(), 1);
        let c = &inv.containers[0];
        assert_eq!(c.id, "c1");
        assert_eq!(c.name, "web");
        assert_eq!(c.names, ["web"]);
        assert_eq!(c.ports, ["0.0.0.0:80->8080/tcp", "443/tcp"]);
        assert_eq!(c.network_mode.as_deref(), Some("bridge"));
        assert!(c.cpu.is_none() && c.memory.is_none());

        let names: Vec<_> = inv.networks.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["web_backend", "web_bridge"]);
        assert_eq!(inv.networks[1].network_id, "n1");
        assert_eq!(inv.networks[1].ip_prefix_len, Some(16));
        assert!(inv.networks[1].aliases.is_none());
    }

    #[test]
    fn counts_follow_input() {
        let data = json!([
            container("a", "a", json!({"bridge": endpoint("n1")})),
            container("b", "b", json!({})),
            container("c", "c", json!({"x": endpoint("n1"), "y": endpoint("n2"), "z": endpoint("n3")})),
        ]);
        let inv = normalize_containers(data).unwrap();
        assert_eq!(inv.containers.len(), 3);
        assert_eq!(inv.networks.len(), 4);
        let ids: Vec<_> = inv.containers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn missing_host_config_leaves_network_mode_absent() {
        let mut c = container("c1", "web", json!({}));
        c.as_object_mut().unwrap().remove("HostConfig");
        let inv = normalize_containers(json!([c])).unwrap();
        assert!(inv.containers[0].network_mode.is_none());
    }

    #[test]
    fn container_without_id_is_skipped() {
        let mut bad = container("x", "bad", json!({}));
        bad.as_object_mut().unwrap().remove("Id");
        let data = json!([bad, container("ok", "ok", json!({}))]);
        let inv = normalize_containers(data).unwrap();
        assert_eq!(inv.containers.len(), 1);
        assert_eq!(inv.containers[0].id, "ok");
    }

    #[test]
    fn non_sequence_inventory_is_rejected() {
        assert!(normalize_containers(json!({"message": "nope"})).is_err());
    }
}
