//! # Catalink LAN Discovery (`discovery`)
//!
//! File: cli/src/discovery/mod.rs
//!
//! ## Overview
//!
//! UDP broadcast discovery lets a catalog server on the same network advertise
//! its current base address. It is advisory: the resolution chain works without
//! it, and a failed or absent exchange is indistinguishable from never trying,
//! apart from the status recorded here.
//!
//! ## Architecture
//!
//! - **`protocol`**: Request/reply encoding and reply validation.
//! - **`probe`**: The client side. One exchange per initialization, run as a
//!   detached task.
//! - **`responder`**: The server side, answering requests with the address of the
//!   machine it runs on.
//!
//! Outcomes are published through a `tokio::sync::watch` channel wrapped in a
//! `DiscoveryHandle`, so callers and tests can observe failures without relying
//! on log output.
//!
use crate::core::error::CatalinkError;
use crate::endpoint::Endpoint;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

pub mod probe;
pub mod protocol;
pub mod responder;

/// Progress and outcome of a discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStatus {
    /// Not attempted: emulator environment, disabled in config, or opted out.
    Skipped,
    /// Waiting for the reply.
    Running,
    /// A valid reply arrived and was applied.
    Found(Endpoint),
    /// A valid reply arrived but could not be persisted, so the client was not
    /// rebound to it.
    NotApplied(Endpoint),
    /// No reply within the receive budget.
    TimedOut,
    /// A reply arrived but did not carry the expected prefix and an address.
    Rejected(String),
    /// Socket setup, send or receive failed.
    Failed(String),
}

impl DiscoveryStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, DiscoveryStatus::Running)
    }

    fn from_error(error: &CatalinkError) -> Self {
        match error {
            CatalinkError::DiscoveryTimeout { .. } => DiscoveryStatus::TimedOut,
            CatalinkError::MalformedReply { reply } => DiscoveryStatus::Rejected(reply.clone()),
            other => DiscoveryStatus::Failed(other.to_string()),
        }
    }
}

impl fmt::Display for DiscoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStatus::Skipped => write!(f, "skipped"),
            DiscoveryStatus::Running => write!(f, "running"),
            DiscoveryStatus::Found(endpoint) => write!(f, "found {}", endpoint),
            DiscoveryStatus::NotApplied(endpoint) => {
                write!(f, "found {} but could not save it", endpoint)
            }
            DiscoveryStatus::TimedOut => write!(f, "timed out"),
            DiscoveryStatus::Rejected(reply) => write!(f, "rejected reply {:?}", reply),
            DiscoveryStatus::Failed(reason) => write!(f, "socket error: {}", reason),
        }
    }
}

/// Read side of a discovery attempt's status.
#[derive(Debug, Clone)]
pub struct DiscoveryHandle {
    status: watch::Receiver<DiscoveryStatus>,
}

impl DiscoveryHandle {
    fn new(status: watch::Receiver<DiscoveryStatus>) -> Self {
        Self { status }
    }

    /// Handle for an attempt that already ended (or never started).
    pub fn finished(status: DiscoveryStatus) -> Self {
        let (_tx, rx) = watch::channel(status);
        Self::new(rx)
    }

    /// Latest published status.
    pub fn status(&self) -> DiscoveryStatus {
        self.status.borrow().clone()
    }

    /// Waits until the attempt reaches a final status.
    ///
    /// If the task disappears without reporting (runtime shutting down), the last
    /// published status is returned.
    pub async fn wait(&self) -> DiscoveryStatus {
        let mut rx = self.status.clone();
        if rx.wait_for(DiscoveryStatus::is_finished).await.is_err() {
            debug!("Discovery task ended without reporting a final status");
        }
        let status = rx.borrow().clone();
        status
    }
}
