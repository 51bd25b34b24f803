//! Shared server state: the database pool, the live (swappable) search
//! index handle, the query engine, the generation counter, and the
//! backpressure semaphore that bounds in-flight tool calls (design §5).
//!
//! The index handle lives behind a `parking_lot::RwLock` rather than an
//! atomic pointer swap crate (`arc_swap` is not part of this workspace's
//! dependency stack) — reads are brief (clone an `Arc`-cheap handle,
//! drop the guard) and writes only happen once per conversion, so lock
//! contention is not a concern (design §5 "single conversion task").

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use sqlx::SqlitePool;
use tokio::sync::Semaphore;
use tracing::info;

use swagger_mcp_foundation::{Generation, GenerationCounter, Result};
use swagger_mcp_query::{EngineSettings, QueryEngine};
use swagger_mcp_storage::pool::{open_pool, PoolSettings};
use swagger_mcp_storage::search_index::directory::read_current_generation;
use swagger_mcp_storage::search_index::SearchIndexHandle;

use crate::settings::ServerSettings;

/// Everything a tool handler needs, shared across every MCP request.
pub struct ServerState {
    /// The settings this state was built from.
    pub settings: ServerSettings,
    /// The SQLite connection pool.
    pub pool: SqlitePool,
    /// The currently-live search index handle, swapped atomically after
    /// each successful conversion.
    index: RwLock<Option<Arc<SearchIndexHandle>>>,
    /// The query engine (stateless over the index; owns only its cache).
    pub query_engine: QueryEngine,
    /// Monotonic generation allocator, seeded from the highest on-disk
    /// generation directory found at startup.
    pub generations: GenerationCounter,
    /// Bounds concurrent in-flight tool calls to `server.max_connections`
    /// (design §5's backpressure primitive).
    pub inflight: Semaphore,
    /// Root directory the generation subdirectories and `current` link
    /// live under (`search.index_directory`).
    pub index_root: PathBuf,
}

impl ServerState {
    /// Open the database pool, run migrations, open the current search
    /// index generation (if one exists), and seed the generation
    /// counter — the full startup sequence (design §3 "Lifecycle").
    pub async fn bootstrap(settings: ServerSettings) -> Result<Self> {
        let pool_settings = PoolSettings {
            max_connections: settings.database.clamped_pool_size(),
            busy_timeout_secs: settings.database.clamped_timeout().as_secs(),
        };
        let pool = open_pool(&settings.database.path, &pool_settings).await?;
        swagger_mcp_storage::migrations::run_migrations(&pool).await?;

        let index_root = settings.search.index_directory.clone();
        let current_generation = read_current_generation(&index_root)?;
        let index = match current_generation {
            Some(generation) => {
                info!(%generation, "opening existing search index generation");
                Some(Arc::new(SearchIndexHandle::open(&index_root, generation)?))
            }
            None => None,
        };

        let seed = current_generation.unwrap_or_else(|| Generation::from_raw(0));
        let engine_settings = EngineSettings {
            pool_ceiling: settings.search.performance.max_results,
            cache_capacity: (settings.search.performance.cache_size_mb as usize * 1024) / 4,
            ..EngineSettings::default()
        };

        Ok(Self {
            pool,
            index: RwLock::new(index),
            query_engine: QueryEngine::new(engine_settings),
            generations: GenerationCounter::seeded_at(seed),
            inflight: Semaphore::new(settings.server.clamped_max_connections() as usize),
            index_root,
            settings,
        })
    }

    /// The currently-live search index handle, if a conversion has ever
    /// completed successfully.
    #[must_use]
    pub fn current_index(&self) -> Option<Arc<SearchIndexHandle>> {
        self.index.read().clone()
    }

    /// Publish a newly-built generation as the live index, invalidating
    /// the query cache so subsequent searches see it (design §4.3.2
    /// "atomic swap").
    pub fn publish_index(&self, handle: SearchIndexHandle) {
        *self.index.write() = Some(Arc::new(handle));
        self.query_engine.invalidate_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_with_no_existing_state_starts_with_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = ServerSettings::default();
        settings.database.path = dir.path().join("mcp_server.db");
        settings.search.index_directory = dir.path().join("search_index");

        let state = ServerState::bootstrap(settings).await.unwrap();
        assert!(state.current_index().is_none());
        assert_eq!(state.generations.next(), Generation::FIRST);
    }
}
