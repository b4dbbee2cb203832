//! Deployment configuration.
//!
//! Every party of a deployment (coordinator, peers, clients) must agree on the
//! ring size and the shared secret. Values come from built-in defaults, an
//! optional YAML file, then `CHORD_*` environment variables, later sources
//! overriding earlier ones.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::ring::types::Ring;

pub const DEFAULT_RING_SIZE: u64 = 4;
pub const DEFAULT_COORDINATOR_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_SECRET: &str = "firefly";
pub const DEFAULT_ID_FILE: &str = "ChordNodeID";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_REGISTRATION_TIMEOUT_MS: u64 = 10_000;

const ENV_RING_SIZE: &str = "CHORD_RING_SIZE";
const ENV_COORDINATOR_ADDR: &str = "CHORD_COORDINATOR_ADDR";
const ENV_SECRET: &str = "CHORD_SECRET";
const ENV_ID_FILE: &str = "CHORD_ID_FILE";
const ENV_LISTEN_HOST: &str = "CHORD_LISTEN_HOST";
const ENV_PROBE_TIMEOUT_MS: &str = "CHORD_PROBE_TIMEOUT_MS";
const ENV_REGISTRATION_TIMEOUT_MS: &str = "CHORD_REGISTRATION_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Modulus of the identifier space, fixed for the lifetime of a deployment.
    /// At most [`MAX_RING_SIZE`](crate::ring::types::MAX_RING_SIZE).
    pub ring_size: u64,
    pub coordinator_addr: SocketAddr,
    /// Token prefixed to every protocol line.
    pub secret: String,
    /// Where a peer keeps its assigned id and listen port.
    pub id_file: PathBuf,
    pub listen_host: IpAddr,
    pub probe_timeout_ms: u64,
    pub registration_timeout_ms: u64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            coordinator_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            secret: DEFAULT_SECRET.to_string(),
            id_file: PathBuf::from(DEFAULT_ID_FILE),
            listen_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            registration_timeout_ms: DEFAULT_REGISTRATION_TIMEOUT_MS,
        }
    }
}

impl RingConfig {
    /// Defaults, overlaid with `path` when given, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `CHORD_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_RING_SIZE) {
            self.ring_size = parse_var(ENV_RING_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_COORDINATOR_ADDR) {
            self.coordinator_addr = parse_var(ENV_COORDINATOR_ADDR, &v)?;
        }
        if let Some(v) = lookup(ENV_SECRET) {
            self.secret = v;
        }
        if let Some(v) = lookup(ENV_ID_FILE) {
            self.id_file = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LISTEN_HOST) {
            self.listen_host = parse_var(ENV_LISTEN_HOST, &v)?;
        }
        if let Some(v) = lookup(ENV_PROBE_TIMEOUT_MS) {
            self.probe_timeout_ms = parse_var(ENV_PROBE_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_REGISTRATION_TIMEOUT_MS) {
            self.registration_timeout_ms = parse_var(ENV_REGISTRATION_TIMEOUT_MS, &v)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        Ring::new(self.ring_size)?;
        if self.secret.is_empty() || self.secret.chars().any(char::is_whitespace) {
            return Err(Error::InvalidConfig(
                "secret must be a single non-empty token".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_millis(self.registration_timeout_ms)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: <T as FromStr>::Err| Error::InvalidConfig(format!("{name}={value}: {e}")))
}
