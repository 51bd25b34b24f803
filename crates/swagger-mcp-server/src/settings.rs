//! The flat configuration bundle this crate accepts (design §6's
//! "Configuration surface"): a `serde::Deserialize` struct with a
//! `#[serde(default = ...)]` for every key, so the crate runs standalone
//! off `ServerSettings::default()` without an external config component.
//! All CLI/env/template merging happens outside this crate and hands in
//! an already-flattened bundle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `database.*` (design §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `database.path`.
    pub path: PathBuf,
    /// `database.pool_size`, clamped to `[1, 50]`.
    pub pool_size: u32,
    /// `database.timeout` in seconds, clamped to `[1, 60]`.
    pub timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { path: PathBuf::from("mcp_server.db"), pool_size: 10, timeout_secs: 30 }
    }
}

impl DatabaseSettings {
    /// `database.pool_size`, clamped into its documented range.
    #[must_use]
    pub fn clamped_pool_size(&self) -> u32 {
        self.pool_size.clamp(1, 50)
    }

    /// `database.timeout` as a [`Duration`], clamped into its documented range.
    #[must_use]
    pub fn clamped_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 60))
    }
}

/// `search.field_weights.*` (design §6). Held for configuration-surface
/// compatibility and validated on load; the weighted index itself bakes
/// its per-field boosts into `swagger_mcp_storage::search_index::schema::FIELD_WEIGHTS`
/// at schema-build time (an index-wide constant, not a per-request
/// parameter), so a deviation from the defaults here is logged rather
/// than threaded through the compiled query — see `DESIGN.md`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    /// `search.field_weights.endpoint_path`.
    pub endpoint_path: f32,
    /// `search.field_weights.summary`.
    pub summary: f32,
    /// `search.field_weights.description`.
    pub description: f32,
    /// `search.field_weights.parameters`.
    pub parameters: f32,
    /// `search.field_weights.tags`.
    pub tags: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self { endpoint_path: 1.8, summary: 1.5, description: 1.2, parameters: 0.9, tags: 0.7 }
    }
}

impl FieldWeights {
    /// Whether every weight falls within the documented `[0.1, 3.0]` range.
    #[must_use]
    pub fn in_range(&self) -> bool {
        [self.endpoint_path, self.summary, self.description, self.parameters, self.tags]
            .iter()
            .all(|w| (0.1..=3.0).contains(w))
    }
}

/// `search.performance.*` (design §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPerformance {
    /// `search.performance.cache_size_mb`, clamped to `[16, 1024]`.
    ///
    /// Converted to a cache entry count (not bytes) for
    /// `swagger_mcp_query::EngineSettings::cache_capacity`, on the
    /// assumption of roughly 4 KiB per cached response — an estimate,
    /// not a measured figure.
    pub cache_size_mb: u32,
    /// `search.performance.max_results`, clamped to `[10, 10000]`; feeds
    /// `swagger_mcp_query::EngineSettings::pool_ceiling`.
    pub max_results: usize,
    /// `search.performance.search_timeout` in seconds, clamped to `[1, 30]`.
    pub search_timeout_secs: u64,
}

impl Default for SearchPerformance {
    fn default() -> Self {
        Self { cache_size_mb: 64, max_results: 1000, search_timeout_secs: 5 }
    }
}

/// `search.*` (design §6). `engine` is reserved (only `"tantivy"` is
/// meaningful today) and recorded for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// `search.index_directory`.
    pub index_directory: PathBuf,
    /// `search.engine`, reserved.
    pub engine: String,
    /// `search.field_weights.*`.
    pub field_weights: FieldWeights,
    /// `search.performance.*`.
    pub performance: SearchPerformance,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index_directory: PathBuf::from("search_index"),
            engine: "tantivy".to_string(),
            field_weights: FieldWeights::default(),
            performance: SearchPerformance::default(),
        }
    }
}

/// `server.*` (design §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLimits {
    /// `server.max_connections`, clamped to `[1, 1000]`; sizes the
    /// in-flight-request semaphore (design §5).
    pub max_connections: u32,
    /// `server.timeout` in seconds, clamped to `[1, 300]`; the per-tool
    /// invocation deadline.
    pub timeout_secs: u64,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self { max_connections: 100, timeout_secs: 5 }
    }
}

impl ServerLimits {
    /// `server.max_connections`, clamped into its documented range.
    #[must_use]
    pub fn clamped_max_connections(&self) -> u32 {
        self.max_connections.clamp(1, 1000)
    }

    /// `server.timeout` as a [`Duration`], clamped into its documented range.
    #[must_use]
    pub fn clamped_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 300))
    }
}

/// `logging.level` (design §6). Serialized upper-case, matched
/// case-insensitively on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Verbose diagnostic detail.
    Debug,
    /// Normal operational messages.
    Info,
    /// Recoverable anomalies.
    Warning,
    /// Failures.
    Error,
}

impl LogLevel {
    /// The `tracing`/`EnvFilter` directive string for this level.
    #[must_use]
    pub const fn as_filter_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// `logging.rotation.*` (design §6), modeled on `tracing-appender::rolling`'s
/// rotation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Never roll the log file over.
    Never,
    /// Roll over daily.
    Daily,
    /// Roll over hourly.
    Hourly,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::Daily
    }
}

/// `logging.*` (design §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `logging.level`.
    pub level: LogLevel,
    /// `logging.file`; `None` logs to stdout only.
    pub file: Option<PathBuf>,
    /// `logging.rotation.*` policy.
    pub rotation: RotationPolicy,
    /// Whether console/file output is JSON-formatted rather than plain text.
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: LogLevel::Info, file: None, rotation: RotationPolicy::default(), json_format: false }
    }
}

/// The full configuration bundle (design §6's closing paragraph: "the
/// core accepts a flat parameter bundle"). Every field is independently
/// defaulted so `ServerSettings::default()` is always runnable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// `database.*`.
    pub database: DatabaseSettings,
    /// `search.*`.
    pub search: SearchSettings,
    /// `server.*`.
    pub server: ServerLimits,
    /// `logging.*`.
    pub logging: LoggingSettings,
}

impl ServerSettings {
    /// Load settings from a JSON or YAML file, falling back to defaults
    /// for any key the file omits (design §6: "accept a flat parameter
    /// bundle"). JSON is tried first, per the same "JSON then YAML"
    /// detection order the normalizer uses for spec files.
    pub fn load(path: &std::path::Path) -> swagger_mcp_foundation::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).or_else(|_| {
            serde_yaml::from_str(&text)
                .map_err(|e| swagger_mcp_foundation::Error::input(format!("failed to parse config file {}: {e}", path.display())))
        })
    }

    /// Data directory the persisted-state layout (design §6) lives under
    /// — the parent of `database.path`, or the current directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.database.path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// The `backups/` directory under the data directory.
    #[must_use]
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir().join("backups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_consistent() {
        let settings = ServerSettings::default();
        assert!(settings.search.field_weights.in_range());
        assert_eq!(settings.database.clamped_pool_size(), 10);
        assert_eq!(settings.server.clamped_max_connections(), 100);
    }

    #[test]
    fn out_of_range_values_are_clamped_not_rejected() {
        let mut settings = ServerSettings::default();
        settings.database.pool_size = 500;
        settings.server.max_connections = 0;
        settings.server.timeout_secs = 10_000;
        assert_eq!(settings.database.clamped_pool_size(), 50);
        assert_eq!(settings.server.clamped_max_connections(), 1);
        assert_eq!(settings.server.clamped_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn loads_a_json_config_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"max_connections": 250}}"#).unwrap();
        let settings = ServerSettings::load(&path).unwrap();
        assert_eq!(settings.server.max_connections, 250);
        assert_eq!(settings.database.pool_size, 10);
    }
}
