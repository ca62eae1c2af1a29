use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

use crate::docker_repo::client::DEFAULT_SOCKET_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    /// Unix socket path (optionally `unix://`-prefixed). Remote addresses are rejected.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

fn default_socket_path() -> String {
    DEFAULT_SOCKET_PATH.to_string()
}

/// Poll intervals in seconds; `0` disables a check.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_interval")]
    pub containers_interval: u64,
    #[serde(default = "default_interval")]
    pub images_interval: u64,
    #[serde(default = "default_interval")]
    pub system_interval: u64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            containers_interval: default_interval(),
            images_interval: default_interval(),
            system_interval: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    300
}

/// Largest accepted poll interval in seconds (one week).
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

impl ChecksConfig {
    pub fn containers(&self) -> Duration {
        Duration::from_secs(self.containers_interval)
    }

    pub fn images(&self) -> Duration {
        Duration::from_secs(self.images_interval)
    }

    pub fn system(&self) -> Duration {
        Duration::from_secs(self.system_interval)
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`, optional), then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").ok();
        let mut config = match &path {
            Some(p) => {
                let s = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
                Self::parse(&s)?
            }
            None => match std::fs::read_to_string("config.toml") {
                Ok(s) => Self::parse(&s)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(e).context("reading config.toml"),
            },
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config = Self::parse(s)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Applies `DOCKER_SOCKET` and `CHECK_*_INTERVAL` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(socket) = lookup("DOCKER_SOCKET") {
            self.docker.socket_path = socket;
        }
        let intervals = [
            ("CHECK_CONTAINERS_INTERVAL", &mut self.checks.containers_interval),
            ("CHECK_IMAGES_INTERVAL", &mut self.checks.images_interval),
            ("CHECK_SYSTEM_INTERVAL", &mut self.checks.system_interval),
        ];
        for (name, slot) in intervals {
            if let Some(raw) = lookup(name) {
                *slot = raw.trim().parse().with_context(|| {
                    format!("{name} must be a non-negative integer (seconds), got {raw:?}")
                })?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.docker.socket_path.trim().is_empty(),
            "docker.socket_path must be non-empty"
        );
        for (name, secs) in [
            ("containers_interval", self.checks.containers_interval),
            ("images_interval", self.checks.images_interval),
            ("system_interval", self.checks.system_interval),
        ] {
            anyhow::ensure!(
                secs <= MAX_INTERVAL_SECS,
                "checks.{name} must be at most {MAX_INTERVAL_SECS} seconds, got {secs}"
            );
        }
        Ok(())
    }
}
