//! # Environment Classification
//!
//! File: cli/src/endpoint/environment.rs
//!
//! ## Overview
//!
//! Decides whether the process runs inside an emulator by substring-matching the
//! platform identification strings against known emulator signatures. Matching is
//! case-sensitive against the literal values the platform reports.
//!
//! The heuristic is deliberately approximate and biased toward saying "emulator".
//! A false negative only means a real device also runs discovery. A false
//! positive pins the process to the loopback alias and suppresses discovery
//! entirely. The signature list is kept exactly as shipped; widening or narrowing
//! it changes which devices can discover a LAN server at all.
//!
//! ## Sources
//!
//! On the host, the platform's build constants are read from environment
//! variables (`CATALINK_BUILD_FINGERPRINT`, `CATALINK_BUILD_PRODUCT`,
//! `CATALINK_BUILD_BRAND`, `CATALINK_BUILD_DEVICE`). Missing variables read as
//! empty strings, which match nothing. The `[platform]` config section can replace
//! any of them.
//!
use crate::core::config::PlatformOverrides;
use std::env;

const FINGERPRINT_SIGNATURES: &[&str] = &["generic", "unknown"];
const PRODUCT_SIGNATURES: &[&str] = &["sdk", "emulator"];
const BRAND_SIGNATURES: &[&str] = &["generic"];
const DEVICE_SIGNATURES: &[&str] = &["goldfish", "ranchu"];

/// Static identification strings describing the running platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformIdentity {
    pub fingerprint: String,
    pub product: String,
    pub brand: String,
    pub device: String,
}

impl PlatformIdentity {
    /// Reads the identification strings from the environment.
    pub fn detect() -> Self {
        let read = |key: &str| env::var(key).unwrap_or_default();
        Self {
            fingerprint: read("CATALINK_BUILD_FINGERPRINT"),
            product: read("CATALINK_BUILD_PRODUCT"),
            brand: read("CATALINK_BUILD_BRAND"),
            device: read("CATALINK_BUILD_DEVICE"),
        }
    }

    /// Replaces each field that has a configured override.
    pub fn with_overrides(mut self, overrides: &PlatformOverrides) -> Self {
        if let Some(fingerprint) = &overrides.fingerprint {
            self.fingerprint = fingerprint.clone();
        }
        if let Some(product) = &overrides.product {
            self.product = product.clone();
        }
        if let Some(brand) = &overrides.brand {
            self.brand = brand.clone();
        }
        if let Some(device) = &overrides.device {
            self.device = device.clone();
        }
        self
    }

    /// True if any field carries a known emulator signature.
    pub fn is_emulator_environment(&self) -> bool {
        contains_any(&self.fingerprint, FINGERPRINT_SIGNATURES)
            || contains_any(&self.product, PRODUCT_SIGNATURES)
            || contains_any(&self.brand, BRAND_SIGNATURES)
            || contains_any(&self.device, DEVICE_SIGNATURES)
    }
}

fn contains_any(value: &str, signatures: &[&str]) -> bool {
    signatures.iter().any(|sig| value.contains(sig))
}
