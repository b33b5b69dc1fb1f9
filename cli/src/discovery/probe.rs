//! # Discovery Probe
//!
//! File: cli/src/discovery/probe.rs
//!
//! ## Overview
//!
//! A one-shot broadcast-and-listen exchange that tries to learn a fresher endpoint
//! from a responder on the local network:
//!
//! 1. Bind an unconnected UDP socket on an ephemeral port with broadcast enabled.
//! 2. Send the request datagram to the broadcast address and well-known port.
//! 3. Wait for a single reply, bounded by the configured receive budget.
//! 4. Accept the reply only if it carries the reply prefix and a non-blank address.
//! 5. On success, persist the address and rebuild the active client through
//!    `HttpClientFactory::set_override`.
//!
//! If the store drops the write, the rebuilt client stays on the old address and
//! the outcome is `NotApplied` rather than `Found`.
//!
//! Any failure leaves the store and the active client untouched. Nothing is
//! retried and the first reply is the only one considered. The socket is owned by
//! `exchange` and dropped on every return path.
//!
//! ## Background use
//!
//! `spawn` runs the probe as a detached tokio task and returns a `DiscoveryHandle`
//! immediately. The handle is only an observation point: dropping it neither
//! cancels nor waits for the task.
//!
use super::protocol::{self, MAX_DATAGRAM};
use super::{DiscoveryHandle, DiscoveryStatus};
use crate::core::config::DiscoveryConfig;
use crate::core::error::CatalinkError;
use crate::endpoint::Endpoint;
use crate::http::HttpClientFactory;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Client side of the discovery exchange.
#[derive(Debug, Clone)]
pub struct DiscoveryProbe {
    config: DiscoveryConfig,
}

impl DiscoveryProbe {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Performs one request/reply exchange and returns the advertised endpoint.
    pub async fn exchange(&self) -> Result<Endpoint, CatalinkError> {
        let target = self.config.target();
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        socket.set_broadcast(true)?;

        socket
            .send_to(self.config.request.as_bytes(), target)
            .await?;
        debug!(
            "Sent discovery request from {:?} to {}",
            socket.local_addr().ok(),
            target
        );

        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, from) = timeout(self.config.timeout(), socket.recv_from(&mut buf))
            .await
            .map_err(|_| CatalinkError::DiscoveryTimeout {
                timeout_ms: self.config.timeout_ms,
            })??;
        debug!("Discovery reply of {} bytes from {}", len, from);

        protocol::parse_reply(&buf[..len], &self.config.reply_prefix)
    }

    /// Runs one exchange and applies a successful result to `factory`.
    ///
    /// Never fails: the outcome is reported as a `DiscoveryStatus`.
    pub async fn run(&self, factory: &HttpClientFactory) -> DiscoveryStatus {
        match self.exchange().await {
            Ok(endpoint) => {
                info!("Discovered endpoint {}", endpoint);
                let client = factory.set_override(endpoint.clone());
                // The store swallows write failures; a rebind that lands elsewhere
                // means the override never made it to the slot.
                if client.endpoint() == &endpoint {
                    DiscoveryStatus::Found(endpoint)
                } else {
                    warn!(
                        "Discovered {} but the client is still bound to {}",
                        endpoint,
                        client.endpoint()
                    );
                    DiscoveryStatus::NotApplied(endpoint)
                }
            }
            Err(e) => {
                debug!("Discovery abandoned: {}", e);
                DiscoveryStatus::from_error(&e)
            }
        }
    }

    /// Starts the probe as a detached background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, factory: Arc<HttpClientFactory>) -> DiscoveryHandle {
        let (tx, rx) = watch::channel(DiscoveryStatus::Running);
        tokio::spawn(async move {
            let status = self.run(&factory).await;
            tx.send_replace(status);
        });
        DiscoveryHandle::new(rx)
    }
}
