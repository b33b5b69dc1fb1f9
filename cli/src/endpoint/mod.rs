//! # Catalink Endpoint Model (`endpoint`)
//!
//! File: cli/src/endpoint/mod.rs
//!
//! ## Overview
//!
//! This module holds the data model of the endpoint subsystem and the pieces that
//! decide which address the HTTP layer targets:
//!
//! - **`environment`**: Classifies the process as emulator or real network context
//!   from platform identification strings.
//! - **`store`**: The persisted override slot (`AddressStore`) and its file and
//!   in-memory backings.
//! - **`resolver`**: The pure priority chain turning a `ResolutionContext` into an
//!   `Endpoint`.
//!
//! ## Architecture
//!
//! An `Endpoint` is opaque: it is never parsed as a URL here. The HTTP layer joins
//! request paths onto it when a request is issued. A `ResolutionContext` is built
//! fresh for every resolution from the current classifier verdict, store contents
//! and compiled default; nothing about it is cached.
//!
use std::fmt;

pub mod environment;
pub mod resolver;
pub mod store;

/// Host-forwarding alias that reaches the development machine from an emulator.
pub const EMULATOR_LOOPBACK: &str = "http://10.0.2.2:5000/";

/// Last-resort literal used when the compiled default is blank.
pub const FALLBACK_DEFAULT: &str = "http://10.0.0.0:5000/";

#[cfg(debug_assertions)]
const BUILD_PROFILE_DEFAULT: &str = "http://192.168.0.204:5000/";
#[cfg(not(debug_assertions))]
const BUILD_PROFILE_DEFAULT: &str = "http://192.168.0.204:5000/";

/// Build-time default address. `CATALINK_BASE_URL` set during compilation
/// replaces the per-profile value.
pub const COMPILED_DEFAULT: &str = match option_env!("CATALINK_BASE_URL") {
    Some(url) => url,
    None => BUILD_PROFILE_DEFAULT,
};

/// Base address of the catalog service.
///
/// Equality is byte-for-byte string equality. The only property ever checked is
/// whether the value is blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the value is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Inputs to a single resolution. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    pub is_emulator: bool,
    pub persisted_endpoint: Option<Endpoint>,
    pub compiled_default: Endpoint,
}
