use std::net::SocketAddr;
use std::path::PathBuf;

use crate::pipeline::fhir::DEFAULT_FHIR_BASE_URL;
use crate::pipeline::semantic::SERVICE_EMBEDDING_DIM;

/// Application-level constants
pub const APP_NAME: &str = "fhirquery";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_SEMANTIC_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,fhirquery_lib=debug,tower_http=info"
}

/// Runtime settings for the HTTP service.
///
/// Every field has a default so the service starts with no environment at
/// all: lexical embeddings, built-in catalog, loopback bind.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the embedding/NER service. `None` selects the offline
    /// lexical backend.
    pub semantic_url: Option<String>,
    pub semantic_timeout_secs: u64,
    /// Embedding size the semantic service returns.
    pub semantic_dim: usize,
    /// JSON file of extra concepts appended to the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub fhir_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            semantic_url: None,
            semantic_timeout_secs: DEFAULT_SEMANTIC_TIMEOUT_SECS,
            semantic_dim: SERVICE_EMBEDDING_DIM,
            catalog_path: None,
            fhir_base_url: DEFAULT_FHIR_BASE_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Read `FHIRQUERY_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get("FHIRQUERY_BIND") {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    default = DEFAULT_BIND_ADDR,
                    "Invalid FHIRQUERY_BIND, using default"
                ),
            }
        }

        config.semantic_url = get("FHIRQUERY_SEMANTIC_URL");

        if let Some(raw) = get("FHIRQUERY_SEMANTIC_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.semantic_timeout_secs = secs,
                _ => tracing::warn!(
                    value = %raw,
                    default = DEFAULT_SEMANTIC_TIMEOUT_SECS,
                    "Invalid FHIRQUERY_SEMANTIC_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(raw) = get("FHIRQUERY_SEMANTIC_DIM") {
            match raw.parse::<usize>() {
                Ok(dim) if dim > 0 => config.semantic_dim = dim,
                _ => tracing::warn!(
                    value = %raw,
                    default = SERVICE_EMBEDDING_DIM,
                    "Invalid FHIRQUERY_SEMANTIC_DIM, using default"
                ),
            }
        }

        config.catalog_path = get("FHIRQUERY_CATALOG_PATH").map(PathBuf::from);

        if let Some(url) = get("FHIRQUERY_FHIR_BASE_URL") {
            config.fhir_base_url = url;
        }

        config
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.fhir_base_url, "https://fhir-server.example.com");
        assert!(config.semantic_url.is_none());
        assert_eq!(config.semantic_dim, 384);
    }

    #[test]
    fn reads_all_variables() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("FHIRQUERY_BIND", "0.0.0.0:8080"),
            ("FHIRQUERY_SEMANTIC_URL", "http://localhost:9000"),
            ("FHIRQUERY_SEMANTIC_TIMEOUT_SECS", "5"),
            ("FHIRQUERY_SEMANTIC_DIM", "768"),
            ("FHIRQUERY_CATALOG_PATH", "/etc/fhirquery/concepts.json"),
            ("FHIRQUERY_FHIR_BASE_URL", "http://hapi.local/fhir"),
        ]));

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.semantic_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.semantic_timeout_secs, 5);
        assert_eq!(config.semantic_dim, 768);
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/fhirquery/concepts.json"))
        );
        assert_eq!(config.fhir_base_url, "http://hapi.local/fhir");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("FHIRQUERY_BIND", "not-an-address"),
            ("FHIRQUERY_SEMANTIC_TIMEOUT_SECS", "0"),
            ("FHIRQUERY_SEMANTIC_DIM", "wide"),
        ]));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.semantic_timeout_secs, DEFAULT_SEMANTIC_TIMEOUT_SECS);
        assert_eq!(config.semantic_dim, SERVICE_EMBEDDING_DIM);
    }

    #[test]
    fn blank_values_are_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("FHIRQUERY_SEMANTIC_URL", "   "),
            ("FHIRQUERY_CATALOG_PATH", ""),
        ]));
        assert!(config.semantic_url.is_none());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
