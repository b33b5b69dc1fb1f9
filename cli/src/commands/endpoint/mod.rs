//! # Catalink Endpoint Commands
//!
//! File: cli/src/commands/endpoint/mod.rs
//!
//! ## Overview
//!
//! Handlers for the commands that look at or change which address the HTTP layer
//! targets. They are exposed as top-level commands by `main.rs`:
//!
//! ```bash
//! # Resolve, start background discovery, print the endpoint and exit
//! catalink resolve
//!
//! # Same, but let the background probe finish and report its outcome
//! catalink resolve --wait
//!
//! # Run one discovery exchange in the foreground
//! catalink discover
//!
//! # Persist an override by hand
//! catalink set-endpoint http://192.168.1.20:5000/
//!
//! # Print every resolution input without touching the network
//! catalink show
//! ```
//!
mod discover;
mod resolve;
mod set;
mod show;

pub use discover::{handle_discover, DiscoverArgs};
pub use resolve::{handle_resolve, ResolveArgs};
pub use set::{handle_set_endpoint, SetEndpointArgs};
pub use show::{handle_show, ShowArgs};
