//! # Endpoint Session Startup
//!
//! File: cli/src/session.rs
//!
//! ## Overview
//!
//! Wires the endpoint subsystem together for one process:
//!
//! 1. Classify the environment from the platform identification strings.
//! 2. Open the address store.
//! 3. Build the `HttpClientFactory`, which resolves and publishes the first client
//!    synchronously, with no network I/O.
//! 4. Unless the environment is an emulator (or discovery is disabled), spawn the
//!    discovery probe in the background and return without waiting for it.
//!
//! The caller can issue requests through `factory().current()` as soon as `start`
//! returns. A successful probe replaces the client for every later `current()`
//! call.
//!
use crate::core::config::{Config, StoreConfig};
use crate::core::error::Result;
use crate::discovery::probe::DiscoveryProbe;
use crate::discovery::{DiscoveryHandle, DiscoveryStatus};
use crate::endpoint::environment::PlatformIdentity;
use crate::endpoint::store::{AddressStore, FileAddressStore, MemoryAddressStore};
use crate::http::HttpClientFactory;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether `Session::start` may launch the background probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Background,
    Off,
}

/// A started endpoint subsystem.
pub struct Session {
    identity: PlatformIdentity,
    factory: Arc<HttpClientFactory>,
    discovery: DiscoveryHandle,
}

impl Session {
    /// Runs the startup sequence. Must be called from within a tokio runtime.
    pub fn start(
        config: &Config,
        identity: PlatformIdentity,
        store: Arc<dyn AddressStore>,
        mode: DiscoveryMode,
    ) -> Result<Self> {
        let is_emulator = identity.is_emulator_environment();
        debug!("Platform identity {:?}, emulator: {}", identity, is_emulator);

        let factory = Arc::new(HttpClientFactory::from_config(config, is_emulator, store)?);

        let discovery = if is_emulator {
            info!("Emulator environment detected, skipping discovery");
            DiscoveryHandle::finished(DiscoveryStatus::Skipped)
        } else if !config.discovery.enabled || mode == DiscoveryMode::Off {
            debug!("Discovery disabled for this run");
            DiscoveryHandle::finished(DiscoveryStatus::Skipped)
        } else {
            DiscoveryProbe::new(config.discovery.clone()).spawn(Arc::clone(&factory))
        };

        Ok(Self {
            identity,
            factory,
            discovery,
        })
    }

    pub fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    pub fn factory(&self) -> &Arc<HttpClientFactory> {
        &self.factory
    }

    pub fn discovery(&self) -> &DiscoveryHandle {
        &self.discovery
    }
}

/// Opens the configured preference file.
///
/// With `ephemeral` set, the persisted override is read once and then held in
/// memory, so this run never writes the file. Without a data directory the
/// store is in-memory and starts empty.
pub fn open_store(config: &StoreConfig, ephemeral: bool) -> Arc<dyn AddressStore> {
    let Some(path) = config.resolved_path() else {
        warn!("No data directory available, overrides will not persist");
        return Arc::new(MemoryAddressStore::new());
    };
    let file_store = FileAddressStore::new(&path);
    if ephemeral {
        debug!("Using in-memory address store seeded from {}", path.display());
        return match file_store.load() {
            Some(endpoint) => Arc::new(MemoryAddressStore::with_endpoint(endpoint)),
            None => Arc::new(MemoryAddressStore::new()),
        };
    }
    debug!("Using address store at {}", path.display());
    Arc::new(file_store)
}
