use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr},
};

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{bail, Context, Result};
use serde::Deserialize;

use crate::model::RotationPolicy;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlServer {
    pub address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlBinPaths {
    pub ffprobe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlProbe {
    pub rotation_policy: Option<RotationPolicy>,
    pub remote_headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    #[serde(rename = "Server")]
    pub server: Option<TomlServer>,
    #[serde(rename = "BinPaths")]
    pub bin_paths: Option<TomlBinPaths>,
    #[serde(rename = "Probe")]
    pub probe: Option<TomlProbe>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinPaths {
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeConfig {
    pub rotation_policy: RotationPolicy,
    /// Request headers sent when opening remote references, in name order.
    pub remote_headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub bin_paths: BinPaths,
    pub probe: ProbeConfig,
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    parse_config(&toml_str)
}

pub fn parse_config(toml_str: &str) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    let server = match toml_config.server {
        None => ServerConfig::default(),
        Some(toml_server) => ServerConfig {
            address: toml_server
                .address
                .map(|a| a.parse().wrap_err("error parsing listening address"))
                .transpose()?
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: toml_server.port.unwrap_or(DEFAULT_PORT),
        },
    };
    let bin_paths = BinPaths {
        ffprobe: toml_config
            .bin_paths
            .and_then(|bin_paths| bin_paths.ffprobe)
            .map(PathBuf::from),
    };
    let probe = match toml_config.probe {
        None => ProbeConfig::default(),
        Some(toml_probe) => {
            let remote_headers: Vec<(String, String)> = toml_probe
                .remote_headers
                .unwrap_or_default()
                .into_iter()
                .collect();
            for (name, value) in &remote_headers {
                validate_header(name, value)?;
            }
            ProbeConfig {
                rotation_policy: toml_probe.rotation_policy.unwrap_or_default(),
                remote_headers,
            }
        }
    };
    Ok(Config {
        server,
        bin_paths,
        probe,
    })
}

/// Headers are joined into a single CRLF separated string for ffprobe, so
/// neither part may contain line breaks and names may not contain ':'.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || name.contains(|c: char| c == ':' || c.is_whitespace()) {
        bail!("invalid remote header name {:?}", name);
    }
    if value.contains(['\r', '\n']) {
        bail!("remote header {} contains a line break", name);
    }
    Ok(())
}
