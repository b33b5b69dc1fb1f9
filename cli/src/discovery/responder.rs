//! # Discovery Responder
//!
//! File: cli/src/discovery/responder.rs
//!
//! ## Overview
//!
//! The server side of discovery, normally run next to the catalog service. It
//! listens on the well-known port and answers every discovery request with the
//! reply prefix followed by the advertised base address. Datagrams that are not
//! the request are ignored. Errors on a single datagram are logged and the loop
//! keeps going; only failing to bind is fatal.
//!
//! The socket is bound with `SO_REUSEADDR`, so a restarted responder can take the
//! port back while the previous socket is still being torn down.
//!
//! Unless a fixed address is configured, the advertised address is
//! `http://<lan-ip>:<api-port>/`, where the LAN IP is the local address the OS
//! would route public traffic from. It is looked up again for every request so a
//! machine that changes networks keeps advertising a reachable address.
//!
use super::protocol::{self, MAX_DATAGRAM};
use crate::core::config::DiscoveryConfig;
use crate::core::error::Result;
use crate::endpoint::Endpoint;
use anyhow::Context;
use socket2::{Domain, Protocol, Socket, Type};
use std::fmt;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket as StdUdpSocket};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// What the responder puts after the reply prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advertisement {
    /// Always the same address.
    Fixed(Endpoint),
    /// `http://<lan-ip>:<api_port>/`, with the LAN IP detected per request.
    Lan { api_port: u16 },
}

impl Advertisement {
    /// The address to advertise right now.
    pub fn current(&self) -> Endpoint {
        match self {
            Advertisement::Fixed(endpoint) => endpoint.clone(),
            Advertisement::Lan { api_port } => default_advertised(*api_port),
        }
    }
}

impl fmt::Display for Advertisement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advertisement::Fixed(endpoint) => write!(f, "{}", endpoint),
            Advertisement::Lan { api_port } => write!(f, "http://<lan-ip>:{}/", api_port),
        }
    }
}

/// Bound responder socket plus what it advertises.
#[derive(Debug)]
pub struct DiscoveryResponder {
    socket: UdpSocket,
    request: String,
    reply_prefix: String,
    advertisement: Advertisement,
}

impl DiscoveryResponder {
    /// Binds `addr` with address reuse enabled.
    pub async fn bind(
        addr: SocketAddr,
        config: &DiscoveryConfig,
        advertisement: Advertisement,
    ) -> Result<Self> {
        let socket = bind_reusable(addr)
            .with_context(|| format!("Failed to bind discovery responder to {}", addr))?;
        info!(
            "Discovery responder listening on {}, advertising {}",
            socket.local_addr()?,
            advertisement
        );
        Ok(Self {
            socket,
            request: config.request.clone(),
            reply_prefix: config.reply_prefix.clone(),
            advertisement,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Answers requests until `shutdown` completes.
    pub async fn serve_until(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Discovery responder stopping");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => self.answer(&buf[..len], from).await,
                    Err(e) => warn!("Discovery responder receive failed: {}", e),
                },
            }
        }
    }

    async fn answer(&self, payload: &[u8], from: SocketAddr) {
        if !protocol::is_request(payload, &self.request) {
            debug!("Ignoring {} byte datagram from {}", payload.len(), from);
            return;
        }
        let advertised = self.advertisement.current();
        let reply = protocol::encode_reply(&self.reply_prefix, &advertised);
        match self.socket.send_to(&reply, from).await {
            Ok(_) => debug!("Answered discovery request from {} with {}", from, advertised),
            Err(e) => warn!("Failed to answer discovery request from {}: {}", from, e),
        }
    }
}

fn bind_reusable(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}

/// Local address the OS would use for outbound traffic, or loopback if none.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub fn detect_lan_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = StdUdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
        Ok(socket.local_addr()?.ip())
    };
    match probe() {
        Ok(ip) if !ip.is_unspecified() => {
            debug!("Detected LAN address {}", ip);
            ip
        }
        Ok(_) | Err(_) => {
            warn!("Could not detect LAN address, falling back to 127.0.0.1");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Default advertised endpoint for a service on `api_port` of this machine.
pub fn default_advertised(api_port: u16) -> Endpoint {
    Endpoint::new(format!("http://{}:{}/", detect_lan_ip(), api_port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::probe::DiscoveryProbe;
    use std::time::Duration;
    use tokio::sync::oneshot;

    async fn start_responder(
        advertisement: Advertisement,
    ) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<Result<()>>) {
        let responder = DiscoveryResponder::bind(
            "127.0.0.1:0".parse().unwrap(),
            &DiscoveryConfig::default(),
            advertisement,
        )
        .await
        .unwrap();
        let addr = responder.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            responder
                .serve_until(async {
                    let _ = stop_rx.await;
                })
                .await
        });
        (addr, stop_tx, task)
    }

    fn fixed(address: &str) -> Advertisement {
        Advertisement::Fixed(Endpoint::from(address))
    }

    fn probe_config(addr: SocketAddr) -> DiscoveryConfig {
        DiscoveryConfig {
            broadcast_address: Ipv4Addr::LOCALHOST,
            port: addr.port(),
            timeout_ms: 1000,
            ..DiscoveryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_discovery_finds_responder() {
        let (addr, stop, task) = start_responder(fixed("http://192.168.1.20:5000/")).await;

        let endpoint = DiscoveryProbe::new(probe_config(addr))
            .exchange()
            .await
            .unwrap();
        assert_eq!(endpoint.as_str(), "http://192.168.1.20:5000/");

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_responder_ignores_other_datagrams() {
        let (addr, stop, task) = start_responder(fixed("http://192.168.1.20:5000/")).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"PING", addr).await.unwrap();
        let mut buf = [0u8; MAX_DATAGRAM];
        let silent =
            tokio::time::timeout(Duration::from_millis(200), client.recv_from(&mut buf)).await;
        assert!(silent.is_err(), "responder must not answer unknown datagrams");

        // Still serving after the ignored datagram.
        client.send_to(b"DISCOVER_RETROFIT_API\n", addr).await.unwrap();
        let (len, _) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"RETROFIT_API http://192.168.1.20:5000/");

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_lan_advertisement_is_built_per_request() {
        let (addr, stop, task) = start_responder(Advertisement::Lan { api_port: 5123 }).await;

        let expected = Advertisement::Lan { api_port: 5123 }.current();
        for _ in 0..2 {
            let endpoint = DiscoveryProbe::new(probe_config(addr))
                .exchange()
                .await
                .unwrap();
            assert_eq!(endpoint, expected);
        }

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_port_can_be_rebound_while_in_use() {
        let config = DiscoveryConfig::default();
        let first = DiscoveryResponder::bind(
            "127.0.0.1:0".parse().unwrap(),
            &config,
            fixed("http://192.168.1.20:5000/"),
        )
        .await
        .unwrap();
        let addr = first.local_addr().unwrap();

        let second =
            DiscoveryResponder::bind(addr, &config, fixed("http://192.168.1.21:5000/")).await;
        assert!(second.is_ok(), "address reuse should allow a second bind");
    }

    #[test]
    fn test_advertisement_display() {
        assert_eq!(
            fixed("http://192.168.1.20:5000/").to_string(),
            "http://192.168.1.20:5000/"
        );
        assert_eq!(
            Advertisement::Lan { api_port: 5000 }.to_string(),
            "http://<lan-ip>:5000/"
        );
    }

    #[test]
    fn test_default_advertised_shape() {
        let endpoint = default_advertised(5000);
        assert!(endpoint.as_str().starts_with("http://"));
        assert!(endpoint.as_str().ends_with(":5000/"));
    }
}
