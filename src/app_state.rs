// =============================================================================
// Central Application State
// =============================================================================
//
// Shared across axum handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counters for lock-free request and version tracking.
//   - parking_lot::RwLock for the live configuration.
//   - The report cache manages its own interior mutability.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use crate::cache::AnalysisCache;
use crate::error::AnalysisError;
use crate::report::AnalysisReport;
use crate::runtime_config::AnalysisConfig;

/// Central application state shared across all handlers.
pub struct AppState {
    /// Live analysis configuration, replaceable at runtime.
    pub config: RwLock<AnalysisConfig>,

    /// Where the configuration is persisted.
    pub config_path: PathBuf,

    /// Cached reports keyed by symbol and configuration. The TTL is fixed at
    /// startup from `cache_ttl_secs`.
    pub cache: AnalysisCache<AnalysisReport>,

    /// Incremented on every successful config change.
    pub config_version: AtomicU64,

    /// Total analysis requests served.
    pub requests: AtomicU64,

    pub start_time: std::time::Instant,
}

/// Lightweight status returned by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub uptime_secs: u64,
    pub requests: u64,
    pub config_version: u64,
    pub cached_reports: usize,
}

impl AppState {
    pub fn new(config: AnalysisConfig, config_path: impl Into<PathBuf>) -> Self {
        let cache = AnalysisCache::new(config.cache_ttl());
        Self {
            config: RwLock::new(config),
            config_path: config_path.into(),
            cache,
            config_version: AtomicU64::new(1),
            requests: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn config(&self) -> AnalysisConfig {
        self.config.read().clone()
    }

    /// Validate and install a new configuration. Cached reports are dropped
    /// since their keys can no longer match.
    pub fn replace_config(&self, config: AnalysisConfig) -> Result<u64, AnalysisError> {
        config.validate()?;
        *self.config.write() = config;
        self.cache.clear();
        let version = self.config_version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(version, "analysis config replaced");
        Ok(version)
    }

    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests: self.requests.load(Ordering::Relaxed),
            config_version: self.config_version.load(Ordering::SeqCst),
            cached_reports: self.cache.len(),
        }
    }
}
