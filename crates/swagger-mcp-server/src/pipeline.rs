//! The conversion pipeline orchestrator: `normalize -> categorize ->
//! ingest -> build index -> atomic swap` (design §4, components
//! C1-C3), wrapped in a single deadline and backed out cleanly on
//! timeout or failure (design §5 "single conversion task" / §7
//! "abort-on-first-error-with-rollback").

use std::path::Path;
use std::time::Duration;

use tracing::{info, instrument, warn};

use swagger_mcp_categorize::categorize;
use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_normalize::normalize;
use swagger_mcp_storage::search_index::directory::{remove_generation, swap_current};
use swagger_mcp_storage::search_index::{build_index, SearchIndexHandle, DEFAULT_BATCH_SIZE};
use swagger_mcp_storage::{derive_search_document, ingest_document};

use crate::state::ServerState;

/// Default wall-clock budget for one end-to-end conversion (design §5).
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(600);

/// Summary of a completed conversion, for the CLI/log line that triggered it.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// The title of the ingested API.
    pub title: String,
    /// The generation the new search index was published under.
    pub generation: u64,
    /// Endpoint count indexed.
    pub endpoint_count: usize,
    /// Non-fatal diagnostics collected during normalization.
    pub warnings: Vec<String>,
}

/// Run the full conversion pipeline over `raw_text`, under
/// `DEFAULT_CONVERSION_TIMEOUT`, publishing the result into `state` on
/// success.
#[instrument(skip(state, raw_text), fields(source = %source_file_path.as_deref().unwrap_or("<inline>")))]
pub async fn convert(state: &ServerState, raw_text: String, source_file_path: Option<String>, strict: bool) -> Result<ConversionSummary> {
    tokio::time::timeout(DEFAULT_CONVERSION_TIMEOUT, run_conversion(state, raw_text, source_file_path, strict))
        .await
        .map_err(|_| Error::timeout(format!("conversion did not complete within {DEFAULT_CONVERSION_TIMEOUT:?}")))?
}

async fn run_conversion(
    state: &ServerState,
    raw_text: String,
    source_file_path: Option<String>,
    strict: bool,
) -> Result<ConversionSummary> {
    let (mut document, report) = normalize(&raw_text, source_file_path, strict)?;
    let warnings: Vec<String> = report.diagnostics.iter().map(|d| d.message.clone()).collect();

    let catalog = categorize(&mut document);

    let generation = state.generations.next();
    let ingest_result = ingest_document(&state.pool, &document, &catalog, generation.as_u64()).await?;

    let search_documents: Vec<_> = document.endpoints.iter().map(|endpoint| derive_search_document(endpoint, &document)).collect();
    let endpoint_count = search_documents.len();

    let gen_dir = swagger_mcp_storage::search_index::directory::generation_dir(&state.index_root, generation);
    let build_outcome = build_index(&gen_dir, &search_documents, DEFAULT_BATCH_SIZE, endpoint_count);

    let stats = match build_outcome {
        Ok(stats) => stats,
        Err(err) => {
            warn!(%err, "index build failed, rolling back generation directory");
            let _ = remove_generation(&state.index_root, generation);
            return Err(err);
        }
    };
    info!(document_count = stats.document_count, "built search index generation");

    let handle = match SearchIndexHandle::open(&state.index_root, generation) {
        Ok(handle) => handle,
        Err(err) => {
            let _ = remove_generation(&state.index_root, generation);
            return Err(err);
        }
    };

    if let Err(err) = swap_current(&state.index_root, generation) {
        let _ = remove_generation(&state.index_root, generation);
        return Err(err);
    }
    state.publish_index(handle);

    if let Some(previous) = previous_generation(generation) {
        // Best-effort; an old generation left behind costs disk, not correctness.
        let _ = maybe_prune(&state.index_root, previous, generation);
    }

    info!(api_id = ingest_result.api_id, outcome = ?ingest_result.outcome, "conversion complete");

    Ok(ConversionSummary { title: document.title, generation: generation.as_u64(), endpoint_count, warnings })
}

fn previous_generation(current: swagger_mcp_foundation::Generation) -> Option<swagger_mcp_foundation::Generation> {
    let raw = current.as_u64();
    (raw > 1).then(|| swagger_mcp_foundation::Generation::from_raw(raw - 1))
}

/// Remove the prior generation's directory now that a newer one is live,
/// unless it's still the one the `current` link points at (a race with a
/// concurrent conversion — leave it for the next cleanup pass rather than
/// risk deleting a directory a reader still has open).
fn maybe_prune(root: &Path, previous: swagger_mcp_foundation::Generation, just_published: swagger_mcp_foundation::Generation) -> Result<()> {
    if previous == just_published {
        return Ok(());
    }
    remove_generation(root, previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ServerSettings;

    const MINIMAL_SPEC: &str = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Widgets", "version": "1.0.0"},
        "paths": {
            "/widgets": {
                "get": {
                    "operationId": "listWidgets",
                    "responses": {"200": {"description": "ok"}}
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn converts_a_minimal_spec_and_publishes_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = ServerSettings::default();
        settings.database.path = dir.path().join("mcp_server.db");
        settings.search.index_directory = dir.path().join("search_index");
        let state = ServerState::bootstrap(settings).await.unwrap();

        let summary = convert(&state, MINIMAL_SPEC.to_string(), Some("widgets.json".to_string()), false).await.unwrap();
        assert_eq!(summary.title, "Widgets");
        assert_eq!(summary.endpoint_count, 1);
        assert!(state.current_index().is_some());
    }
}
