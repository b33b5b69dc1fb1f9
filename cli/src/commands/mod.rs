//! # Catalink Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the Catalink CLI and the small
//! `CommandContext` every handler receives from `main.rs`.
//!
//! ## Command Groups
//!
//! - `endpoint`: Inspecting and changing the resolved endpoint (`resolve`,
//!   `discover`, `set-endpoint`, `show`)
//! - `ping`: Issuing a request against the active client
//! - `respond`: Running the server-side discovery responder
//!
use crate::core::config::Config;
use crate::core::error::Result;
use crate::endpoint::environment::PlatformIdentity;
use crate::endpoint::store::AddressStore;
use crate::session::{self, DiscoveryMode, Session};
use std::sync::Arc;

/// Commands that inspect or change the resolved endpoint.
pub mod endpoint;
/// `catalink ping`: GET the service index through the active client.
pub mod ping;
/// `catalink respond`: answer discovery requests on this machine.
pub mod respond;

/// Inputs shared by every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    /// Keep the override in memory instead of the preference file.
    pub ephemeral: bool,
}

impl CommandContext {
    pub fn store(&self) -> Arc<dyn AddressStore> {
        session::open_store(&self.config.store, self.ephemeral)
    }

    pub fn identity(&self) -> PlatformIdentity {
        PlatformIdentity::detect().with_overrides(&self.config.platform)
    }

    /// Starts the endpoint subsystem with the detected identity and configured store.
    pub fn start_session(&self, mode: DiscoveryMode) -> Result<Session> {
        Session::start(&self.config, self.identity(), self.store(), mode)
    }

    /// Human-readable location of the address store.
    pub fn store_location(&self) -> String {
        match self.config.store.resolved_path() {
            Some(path) if self.ephemeral => format!("{} (read-only)", path.display()),
            Some(path) => path.display().to_string(),
            None => "(in-memory)".to_string(),
        }
    }
}
