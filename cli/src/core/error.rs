//! # Catalink Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout Catalink. It follows the
//! same two-layer approach everywhere in the crate:
//! - `CatalinkError`: a `thiserror` enum naming the failures the endpoint
//!   subsystem can observe.
//! - `Result<T>`: an alias for `anyhow::Result<T>` so command handlers can attach
//!   context freely.
//!
//! Most of these errors never leave the subsystem. Discovery and storage failures
//! are converted into a `DiscoveryStatus` or a logged warning before they could
//! reach a caller; only configuration and HTTP errors are propagated up to `main`.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if config.discovery.port == 0 {
//!     return Err(CatalinkError::Config("discovery.port must be non-zero".into()))?;
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for Catalink.
#[derive(Error, Debug)]
pub enum CatalinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Address store error: {0}")]
    Store(String),

    #[error("Discovery socket error: {source}")]
    DiscoverySocket {
        #[from]
        source: std::io::Error,
    },

    #[error("No discovery reply within {timeout_ms} ms")]
    DiscoveryTimeout { timeout_ms: u64 },

    #[error("Discovery reply rejected: {reply:?}")]
    MalformedReply { reply: String },

    #[error("HTTP request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
