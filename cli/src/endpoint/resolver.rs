//! # Endpoint Resolution
//!
//! File: cli/src/endpoint/resolver.rs
//!
//! ## Overview
//!
//! Picks the effective `Endpoint` from a `ResolutionContext`. Rules are evaluated
//! top to bottom and the first match wins:
//!
//! 1. Emulator → the loopback alias. Emulator networking cannot reach a LAN
//!    broadcast target, so neither the persisted override nor the default apply.
//! 2. Persisted override present and non-blank → the override.
//! 3. Compiled default non-blank → the compiled default.
//! 4. Otherwise → the hard-coded fallback literal.
//!
//! Resolution is total: every context produces an address.
//!
use super::{Endpoint, ResolutionContext, EMULATOR_LOOPBACK, FALLBACK_DEFAULT};
use crate::core::config::EndpointConfig;
use std::fmt;

/// Which rule produced a resolved endpoint. Used for logging and `catalink show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Emulator,
    Persisted,
    CompiledDefault,
    Fallback,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionSource::Emulator => "emulator",
            ResolutionSource::Persisted => "persisted",
            ResolutionSource::CompiledDefault => "compiled-default",
            ResolutionSource::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

/// The priority chain, parameterized by the two fixed addresses it can return
/// on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    emulator_loopback: Endpoint,
    fallback: Endpoint,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self {
            emulator_loopback: Endpoint::from(EMULATOR_LOOPBACK),
            fallback: Endpoint::from(FALLBACK_DEFAULT),
        }
    }
}

impl EndpointResolver {
    pub fn from_config(config: &EndpointConfig) -> Self {
        Self {
            emulator_loopback: Endpoint::from(config.emulator_loopback.as_str()),
            fallback: Endpoint::from(config.fallback.as_str()),
        }
    }

    /// Returns the effective endpoint for `ctx`.
    pub fn resolve(&self, ctx: &ResolutionContext) -> Endpoint {
        self.resolve_with_source(ctx).0
    }

    /// Same as [`resolve`](Self::resolve), also reporting which rule matched.
    pub fn resolve_with_source(&self, ctx: &ResolutionContext) -> (Endpoint, ResolutionSource) {
        if ctx.is_emulator {
            return (self.emulator_loopback.clone(), ResolutionSource::Emulator);
        }
        if let Some(persisted) = ctx.persisted_endpoint.as_ref().filter(|e| !e.is_blank()) {
            return (persisted.clone(), ResolutionSource::Persisted);
        }
        if !ctx.compiled_default.is_blank() {
            return (ctx.compiled_default.clone(), ResolutionSource::CompiledDefault);
        }
        (self.fallback.clone(), ResolutionSource::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_emulator: bool, persisted: Option<&str>, compiled: &str) -> ResolutionContext {
        ResolutionContext {
            is_emulator,
            persisted_endpoint: persisted.map(Endpoint::from),
            compiled_default: Endpoint::from(compiled),
        }
    }

    #[test]
    fn test_emulator_always_wins() {
        let resolver = EndpointResolver::default();
        let cases = [
            ctx(true, None, ""),
            ctx(true, Some("http://10.1.2.3:5000/"), "http://192.168.0.204:5000/"),
            ctx(true, Some(""), "http://192.168.0.204:5000/"),
        ];
        for case in &cases {
            assert_eq!(
                resolver.resolve_with_source(case),
                (Endpoint::from(EMULATOR_LOOPBACK), ResolutionSource::Emulator)
            );
        }
    }

    #[test]
    fn test_persisted_outranks_compiled_default() {
        let resolver = EndpointResolver::default();
        let (endpoint, source) = resolver.resolve_with_source(&ctx(
            false,
            Some("10.1.2.3:5000/"),
            "http://192.168.0.204:5000/",
        ));
        assert_eq!(endpoint.as_str(), "10.1.2.3:5000/");
        assert_eq!(source, ResolutionSource::Persisted);
    }

    #[test]
    fn test_blank_persisted_is_ignored() {
        let resolver = EndpointResolver::default();
        for persisted in [None, Some(""), Some("   ")] {
            let (endpoint, source) =
                resolver.resolve_with_source(&ctx(false, persisted, "http://192.168.0.204:5000/"));
            assert_eq!(endpoint.as_str(), "http://192.168.0.204:5000/");
            assert_eq!(source, ResolutionSource::CompiledDefault);
        }
    }

    #[test]
    fn test_blank_compiled_default_falls_back_to_literal() {
        let resolver = EndpointResolver::default();
        let (endpoint, source) = resolver.resolve_with_source(&ctx(false, Some(" "), " "));
        assert_eq!(endpoint, Endpoint::from(FALLBACK_DEFAULT));
        assert_eq!(source, ResolutionSource::Fallback);
    }

    #[test]
    fn test_configured_addresses_are_used() {
        let resolver = EndpointResolver::from_config(&EndpointConfig {
            compiled_default: String::new(),
            emulator_loopback: "http://127.0.0.1:5000/".into(),
            fallback: "http://10.9.9.9:5000/".into(),
        });
        assert_eq!(resolver.resolve(&ctx(true, None, "")).as_str(), "http://127.0.0.1:5000/");
        assert_eq!(resolver.resolve(&ctx(false, None, "")).as_str(), "http://10.9.9.9:5000/");
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(ResolutionSource::CompiledDefault.to_string(), "compiled-default");
        assert_eq!(ResolutionSource::Persisted.to_string(), "persisted");
    }
}
