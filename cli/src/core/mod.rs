//! # Catalink Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by every command:
//! - `config`: Loading, path expansion and validation of `config.toml`
//! - `error`: The `CatalinkError` enum and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{CatalinkError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
