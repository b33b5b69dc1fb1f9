//! # Catalink Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, expands and validates the optional `config.toml` that tunes
//! the endpoint subsystem. Every field has a default, so running without any
//! configuration file at all is the normal case.
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file passed with `--config` (or `CATALINK_CONFIG`)
//! 2. User-specific `config.toml` in the platform config directory
//! 3. Default values defined in the code
//!
//! ## Layout
//!
//! ```toml
//! [endpoint]
//! compiled_default = "http://192.168.0.204:5000/"
//! emulator_loopback = "http://10.0.2.2:5000/"
//! fallback = "http://10.0.0.0:5000/"
//!
//! [discovery]
//! enabled = true
//! port = 5001
//! broadcast_address = "255.255.255.255"
//! timeout_ms = 1500
//!
//! [store]
//! path = "~/.local/share/catalink/app_prefs.toml"
//!
//! [platform]
//! device = "goldfish"
//!
//! [http]
//! connect_timeout_secs = 30
//! timeout_secs = 30
//! ```
//!
use crate::core::error::{CatalinkError, Result};
use crate::endpoint::{COMPILED_DEFAULT, EMULATOR_LOOPBACK, FALLBACK_DEFAULT};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

const CONFIG_FILENAME: &str = "config.toml";
const STORE_FILENAME: &str = "app_prefs.toml";

/// Upper bound for the discovery receive budget. Anything longer stops being
/// a quick opportunistic probe.
const MAX_DISCOVERY_TIMEOUT_MS: u64 = 10_000;

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub platform: PlatformOverrides,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Addresses feeding the resolution chain.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    /// Stand-in for the build-time default; may be blank.
    pub compiled_default: String,
    /// Host-forwarding alias used whenever the process runs in an emulator.
    pub emulator_loopback: String,
    /// Last-resort literal used when `compiled_default` is blank.
    pub fallback: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            compiled_default: COMPILED_DEFAULT.to_string(),
            emulator_loopback: EMULATOR_LOOPBACK.to_string(),
            fallback: FALLBACK_DEFAULT.to_string(),
        }
    }
}

/// Settings for the UDP broadcast probe.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// When false, discovery is skipped just as in emulator mode.
    pub enabled: bool,
    /// Well-known port the discovery responder listens on.
    pub port: u16,
    /// Destination for the request datagram.
    pub broadcast_address: Ipv4Addr,
    /// Receive budget for the single reply.
    pub timeout_ms: u64,
    /// Literal request payload.
    pub request: String,
    /// Literal prefix every valid reply starts with.
    pub reply_prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5001,
            broadcast_address: Ipv4Addr::BROADCAST,
            timeout_ms: 1500,
            request: "DISCOVER_RETROFIT_API".to_string(),
            reply_prefix: "RETROFIT_API ".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Socket address the request datagram is sent to.
    pub fn target(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.broadcast_address, self.port))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Location of the persisted override.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Preference file path (can use ~). Defaults to the platform data directory.
    pub path: Option<String>,
}

impl StoreConfig {
    /// Resolves the preference file path, or `None` if no data directory can be
    /// determined and none was configured.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(PathBuf::from(path)),
            None => ProjectDirs::from("com", "Catalink", "catalink")
                .map(|dirs| dirs.data_dir().join(STORE_FILENAME)),
        }
    }
}

/// Field-by-field replacements for the detected platform identification strings.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlatformOverrides {
    pub fingerprint: Option<String>,
    pub product: Option<String>,
    pub brand: Option<String>,
    pub device: Option<String>,
}

/// Timeouts applied to the shared HTTP client.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 30,
        }
    }
}

/// Loads the effective configuration.
///
/// An explicit path must exist; the user-level file is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => load_user_config()?.unwrap_or_default(),
    };
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Catalink", "catalink") {
        let config_path = proj_dirs.config_dir().join(CONFIG_FILENAME);
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_config_paths(config: &mut Config) {
    if let Some(path) = &mut config.store.path {
        *path = shellexpand::tilde(path).into_owned();
        debug!("Expanded store path: {}", path);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    let discovery = &config.discovery;
    if discovery.port == 0 {
        return Err(anyhow!(CatalinkError::Config(
            "discovery.port must be non-zero".to_string()
        )));
    }
    if discovery.timeout_ms == 0 || discovery.timeout_ms > MAX_DISCOVERY_TIMEOUT_MS {
        return Err(anyhow!(CatalinkError::Config(format!(
            "discovery.timeout_ms must be between 1 and {}, got {}",
            MAX_DISCOVERY_TIMEOUT_MS, discovery.timeout_ms
        ))));
    }
    if discovery.request.is_empty() || discovery.reply_prefix.is_empty() {
        return Err(anyhow!(CatalinkError::Config(
            "discovery.request and discovery.reply_prefix cannot be empty".to_string()
        )));
    }
    if config.endpoint.emulator_loopback.trim().is_empty()
        || config.endpoint.fallback.trim().is_empty()
    {
        return Err(anyhow!(CatalinkError::Config(
            "endpoint.emulator_loopback and endpoint.fallback cannot be blank".to_string()
        )));
    }
    if config.store.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(anyhow!(CatalinkError::Config(
            "store.path cannot be blank when set".to_string()
        )));
    }
    Ok(())
}
