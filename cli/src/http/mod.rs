//! # Catalink HTTP Client Binding (`http`)
//!
//! File: cli/src/http/mod.rs
//!
//! ## Overview
//!
//! `HttpClientFactory` owns the one active `CatalogClient`: an HTTP client bound
//! to the endpoint produced by the last (re)initialization.
//!
//! ## Architecture
//!
//! - The underlying `reqwest::Client` (connection pool, timeouts) is built once per
//!   factory and shared by every `CatalogClient` it hands out; only the bound
//!   endpoint changes between rebuilds.
//! - The active client sits in an `ArcSwap`. `initialize` builds a fresh client and
//!   publishes it with a single atomic store. Concurrent initializations are not
//!   coordinated; the last store wins, which is harmless because resolution is
//!   deterministic for a given store and environment.
//! - `current()` loads whatever is published at call time. Callers must call it per
//!   request rather than hold on to the result: discovery may replace the client at
//!   any moment. Requests already running on a replaced client finish against it.
//!
//! ## Usage
//!
//! ```rust
//! let factory = Arc::new(HttpClientFactory::from_config(&config, is_emulator, store)?);
//! let index = factory.current().get_json("").await?;
//! factory.set_override(Endpoint::from("http://192.168.1.20:5000/"));
//! ```
//!
use crate::core::config::{Config, HttpConfig};
use crate::core::error::{CatalinkError, Result};
use crate::endpoint::resolver::{EndpointResolver, ResolutionSource};
use crate::endpoint::store::AddressStore;
use crate::endpoint::{Endpoint, ResolutionContext};
use anyhow::Context;
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client bound to one endpoint. Immutable; rebinding builds a new one.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    endpoint: Endpoint,
    source: ResolutionSource,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Resolution rule that produced the bound endpoint.
    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    /// Joins `path` onto the bound endpoint.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issues `GET <endpoint>/<path>` and decodes the JSON body.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let http_err = |source: reqwest::Error| CatalinkError::Http {
            url: url.clone(),
            source,
        };
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?;
        let body: serde_json::Value = response.json().await.map_err(http_err)?;
        Ok(body)
    }
}

/// Process-wide binding of "current resolved address" to a client instance,
/// passed around explicitly as an `Arc<HttpClientFactory>`.
pub struct HttpClientFactory {
    resolver: EndpointResolver,
    compiled_default: Endpoint,
    is_emulator: bool,
    store: Arc<dyn AddressStore>,
    http: reqwest::Client,
    active: ArcSwap<CatalogClient>,
}

impl HttpClientFactory {
    /// Builds the factory and performs the first initialization, so `current()`
    /// is always backed by a client.
    pub fn from_config(
        config: &Config,
        is_emulator: bool,
        store: Arc<dyn AddressStore>,
    ) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        let resolver = EndpointResolver::from_config(&config.endpoint);
        let compiled_default = Endpoint::from(config.endpoint.compiled_default.as_str());

        let ctx = ResolutionContext {
            is_emulator,
            persisted_endpoint: store.load(),
            compiled_default: compiled_default.clone(),
        };
        let first = bind(&resolver, &ctx, &http);

        Ok(Self {
            resolver,
            compiled_default,
            is_emulator,
            store,
            http,
            active: ArcSwap::from_pointee(first),
        })
    }

    /// Snapshot of the resolution inputs as they are right now.
    pub fn context(&self) -> ResolutionContext {
        ResolutionContext {
            is_emulator: self.is_emulator,
            persisted_endpoint: self.store.load(),
            compiled_default: self.compiled_default.clone(),
        }
    }

    pub fn is_emulator(&self) -> bool {
        self.is_emulator
    }

    /// Endpoint the chain picks when the override slot is ignored.
    pub fn resolve_without_override(&self) -> Endpoint {
        self.resolver.resolve(&ResolutionContext {
            persisted_endpoint: None,
            ..self.context()
        })
    }

    /// Re-resolves from the current store state and publishes a new client.
    pub fn initialize(&self) -> Arc<CatalogClient> {
        self.initialize_with(&self.context())
    }

    /// Resolves `ctx`, builds a client bound to the result and publishes it,
    /// replacing the previous one.
    pub fn initialize_with(&self, ctx: &ResolutionContext) -> Arc<CatalogClient> {
        let client = Arc::new(bind(&self.resolver, ctx, &self.http));
        self.active.store(Arc::clone(&client));
        client
    }

    /// Persists `endpoint` and rebinds immediately.
    pub fn set_override(&self, endpoint: Endpoint) -> Arc<CatalogClient> {
        self.store.save(&endpoint);
        self.initialize()
    }

    /// The client published at call time.
    pub fn current(&self) -> Arc<CatalogClient> {
        self.active.load_full()
    }
}

fn bind(
    resolver: &EndpointResolver,
    ctx: &ResolutionContext,
    http: &reqwest::Client,
) -> CatalogClient {
    let (endpoint, source) = resolver.resolve_with_source(ctx);
    info!("Using endpoint {} ({})", endpoint, source);
    CatalogClient {
        endpoint,
        source,
        http: http.clone(),
    }
}

fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::store::MemoryAddressStore;
    use crate::endpoint::{COMPILED_DEFAULT, EMULATOR_LOOPBACK};

    fn factory(is_emulator: bool, store: Arc<dyn AddressStore>) -> HttpClientFactory {
        HttpClientFactory::from_config(&Config::default(), is_emulator, store).unwrap()
    }

    #[test]
    fn test_current_available_immediately() {
        let factory = factory(false, Arc::new(MemoryAddressStore::new()));
        let client = factory.current();
        assert_eq!(client.endpoint().as_str(), COMPILED_DEFAULT);
        assert_eq!(client.source(), ResolutionSource::CompiledDefault);
    }

    #[test]
    fn test_initialize_twice_yields_distinct_clients_with_same_endpoint() {
        let factory = factory(false, Arc::new(MemoryAddressStore::new()));
        let first = factory.initialize();
        let second = factory.initialize();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.endpoint(), second.endpoint());
        assert!(Arc::ptr_eq(&second, &factory.current()));
    }

    #[test]
    fn test_set_override_persists_and_rebinds() {
        let store = Arc::new(MemoryAddressStore::new());
        let factory = factory(false, store.clone());
        let before = factory.current();

        factory.set_override(Endpoint::from("http://10.1.2.3:5000/"));

        assert_eq!(store.load(), Some(Endpoint::from("http://10.1.2.3:5000/")));
        assert_eq!(factory.current().endpoint().as_str(), "http://10.1.2.3:5000/");
        assert_eq!(factory.current().source(), ResolutionSource::Persisted);
        // A client handed out earlier keeps its binding.
        assert_eq!(before.endpoint().as_str(), COMPILED_DEFAULT);
    }

    #[test]
    fn test_emulator_ignores_override() {
        let store = Arc::new(MemoryAddressStore::with_endpoint("http://10.1.2.3:5000/"));
        let factory = factory(true, store);
        assert_eq!(factory.current().endpoint().as_str(), EMULATOR_LOOPBACK);
        factory.set_override(Endpoint::from("http://10.4.5.6:5000/"));
        assert_eq!(factory.current().endpoint().as_str(), EMULATOR_LOOPBACK);
    }

    #[test]
    fn test_initial_resolution_reads_persisted_override() {
        let store = Arc::new(MemoryAddressStore::with_endpoint("http://10.7.7.7:5000/"));
        let factory = factory(false, store);
        assert_eq!(factory.current().endpoint().as_str(), "http://10.7.7.7:5000/");
    }

    #[test]
    fn test_resolve_without_override_skips_persisted_value() {
        let store = Arc::new(MemoryAddressStore::with_endpoint("http://10.7.7.7:5000/"));
        let device = factory(false, store.clone());
        assert_eq!(device.resolve_without_override().as_str(), COMPILED_DEFAULT);
        assert_eq!(device.current().endpoint().as_str(), "http://10.7.7.7:5000/");

        let emulator = factory(true, store);
        assert_eq!(emulator.resolve_without_override().as_str(), EMULATOR_LOOPBACK);
    }

    #[tokio::test]
    async fn test_get_json_failure_carries_url() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let base = format!("http://127.0.0.1:{}/", port);
        let factory = factory(false, Arc::new(MemoryAddressStore::with_endpoint(base.clone())));
        let err = factory.current().get_json("items").await.unwrap_err();

        match err.downcast_ref::<CatalinkError>() {
            Some(CatalinkError::Http { url, .. }) => assert_eq!(url, &format!("{}items", base)),
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_url_joining() {
        let factory = factory(false, Arc::new(MemoryAddressStore::new()));
        let client = factory.initialize_with(&ResolutionContext {
            is_emulator: false,
            persisted_endpoint: Some(Endpoint::from("http://10.1.2.3:5000/")),
            compiled_default: Endpoint::from(""),
        });
        assert_eq!(client.url("items"), "http://10.1.2.3:5000/items");
        assert_eq!(client.url("/items/7"), "http://10.1.2.3:5000/items/7");
        assert_eq!(client.url(""), "http://10.1.2.3:5000/");
    }
}
