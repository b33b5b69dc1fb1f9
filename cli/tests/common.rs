//! # Catalink CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates in `cli/tests/`. Every test runs
//! the real `catalink` binary against a throwaway configuration file whose store
//! lives in a temporary directory, so nothing touches the user's own preferences.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, UdpSocket};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Environment variables the binary reads that could leak in from the host.
const HOST_ENV: &[&str] = &[
    "CATALINK_CONFIG",
    "CATALINK_BUILD_FINGERPRINT",
    "CATALINK_BUILD_PRODUCT",
    "CATALINK_BUILD_BRAND",
    "CATALINK_BUILD_DEVICE",
    "RUST_LOG",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
];

/// Command for the compiled `catalink` binary with host overrides cleared.
pub fn catalink_cmd() -> Command {
    let mut cmd = Command::cargo_bin("catalink").expect("Failed to find catalink binary for testing");
    for var in HOST_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// A temporary directory holding `config.toml` and the preference file it points at.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    /// Writes a config whose `[store]` section points into the temp dir, followed by `extra`.
    pub fn new(extra: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store_path = dir.path().join("app_prefs.toml");
        let config = format!(
            "[store]\npath = '{}'\n\n{}\n",
            store_path.display(),
            extra
        );
        fs::write(dir.path().join("config.toml"), config).expect("Failed to write test config");
        Self { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("app_prefs.toml")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `catalink --config <this env's config>`.
    pub fn cmd(&self) -> Command {
        let mut cmd = catalink_cmd();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }

    /// Contents of the preference file, or an empty string if it was never written.
    pub fn store_contents(&self) -> String {
        fs::read_to_string(self.store_path()).unwrap_or_default()
    }
}

/// Binds a loopback UDP socket that answers the first datagram with `reply`.
///
/// The thread gives up after a few seconds so a test never hangs on it.
pub fn simulated_responder(reply: &'static str) -> (SocketAddr, thread::JoinHandle<Option<Vec<u8>>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind responder socket");
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set read timeout");
    let addr = socket.local_addr().expect("Responder has no local address");
    let handle = thread::spawn(move || {
        let mut buf = [0u8; 1024];
        let (len, from) = socket.recv_from(&mut buf).ok()?;
        socket.send_to(reply.as_bytes(), from).ok()?;
        Some(buf[..len].to_vec())
    });
    (addr, handle)
}

/// `[discovery]` section aimed at a loopback responder on `port`.
pub fn loopback_discovery(port: u16, timeout_ms: u64) -> String {
    format!(
        "[discovery]\nbroadcast_address = \"127.0.0.1\"\nport = {}\ntimeout_ms = {}\n",
        port, timeout_ms
    )
}

/// Serves one HTTP request on loopback with a canned response and returns the
/// request line it received.
pub fn canned_http_server(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, thread::JoinHandle<Option<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind HTTP listener");
    let addr = listener.local_addr().expect("Listener has no local address");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().ok()?;
        stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
        let mut reader = BufReader::new(stream.try_clone().ok()?);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).ok()?;
        // Drain headers up to the blank line.
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).ok()? == 0 || header == "\r\n" {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let mut stream = stream;
        stream.write_all(response.as_bytes()).ok()?;
        stream.flush().ok()?;
        Some(request_line.trim_end().to_string())
    });
    (addr, handle)
}

/// A loopback port with nothing listening on it.
pub fn closed_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind HTTP listener");
    listener.local_addr().expect("Listener has no local address").port()
}
