//! # Persisted Override Store
//!
//! File: cli/src/endpoint/store.rs
//!
//! ## Overview
//!
//! `AddressStore` is a single overwritable slot holding the last endpoint learned
//! by discovery (or set by hand). It is never cleared once written.
//!
//! Failures never reach the caller:
//! - a failed read is reported as "no override" (`None`),
//! - a failed write is logged and dropped; the next successful discovery writes
//!   the slot again.
//!
//! Concurrent writers are not coordinated. Writes are rare and the last writer wins.
//!
//! ## Backings
//!
//! - **`FileAddressStore`**: A small TOML preference file. The override lives
//!   under `base_url`; other keys are left as they are, whatever their type. Writes go to a sibling temp file that is then
//!   renamed over the original, so readers never observe a half-written file.
//! - **`MemoryAddressStore`**: An in-process slot, used by tests and by
//!   `--ephemeral` runs.
//!
use super::Endpoint;
use crate::core::error::{CatalinkError, Result};
use anyhow::Context;
use arc_swap::ArcSwapOption;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use toml::{Table, Value};
use tracing::{debug, info, warn};

/// Preference key holding the override.
const BASE_URL_KEY: &str = "base_url";

/// Durable single-slot storage for the override endpoint.
pub trait AddressStore: Send + Sync {
    /// Last persisted endpoint, or `None` if nothing was ever written or the
    /// slot cannot be read.
    fn load(&self) -> Option<Endpoint>;

    /// Overwrites the slot. Fire-and-forget.
    fn save(&self, endpoint: &Endpoint);
}

/// Preference-file backed store.
#[derive(Debug, Clone)]
pub struct FileAddressStore {
    path: PathBuf,
}

impl FileAddressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_prefs(&self) -> Result<Table> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Table::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read preference file {}", self.path.display())
                })
            }
        };
        content.parse::<Table>().map_err(|e| {
            CatalinkError::Store(format!(
                "Preference file {} is not valid TOML: {}",
                self.path.display(),
                e
            ))
            .into()
        })
    }

    fn write_prefs(&self, prefs: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string(prefs)
            .map_err(|e| CatalinkError::Store(format!("Failed to encode preferences: {}", e)))?;

        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }

    fn try_save(&self, endpoint: &Endpoint) -> Result<()> {
        // Keep unrelated keys; fall back to a fresh file if the old one is unreadable.
        let mut prefs = self.read_prefs().unwrap_or_default();
        prefs.insert(
            BASE_URL_KEY.to_string(),
            Value::String(endpoint.as_str().to_string()),
        );
        self.write_prefs(&prefs)
    }
}

impl AddressStore for FileAddressStore {
    fn load(&self) -> Option<Endpoint> {
        match self.read_prefs() {
            Ok(prefs) => {
                let found = prefs
                    .get(BASE_URL_KEY)
                    .and_then(Value::as_str)
                    .map(Endpoint::from);
                debug!(
                    "Loaded override from {}: {:?}",
                    self.path.display(),
                    found
                );
                found
            }
            Err(e) => {
                warn!("Treating unreadable address store as empty: {:#}", e);
                None
            }
        }
    }

    fn save(&self, endpoint: &Endpoint) {
        match self.try_save(endpoint) {
            Ok(()) => info!("Persisted endpoint {} to {}", endpoint, self.path.display()),
            Err(e) => warn!("Failed to persist endpoint {}: {:#}", endpoint, e),
        }
    }
}

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryAddressStore {
    slot: ArcSwapOption<Endpoint>,
}

impl MemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(endpoint: impl Into<Endpoint>) -> Self {
        Self {
            slot: ArcSwapOption::from(Some(Arc::new(endpoint.into()))),
        }
    }
}

impl AddressStore for MemoryAddressStore {
    fn load(&self) -> Option<Endpoint> {
        self.slot.load_full().map(|e| (*e).clone())
    }

    fn save(&self, endpoint: &Endpoint) {
        self.slot.store(Some(Arc::new(endpoint.clone())));
    }
}
