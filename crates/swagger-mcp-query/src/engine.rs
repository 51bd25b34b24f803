//! The query engine's public entry point: wires parse -> normalize ->
//! expand -> classify -> compile -> filter -> execute -> enrich ->
//! organize -> paginate -> assemble -> cache (design §4.4's 12-step
//! pipeline) into one `search()` call.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::Query;
use tracing::{instrument, warn};

use swagger_mcp_foundation::{Error, Result};
use swagger_mcp_storage::search_index::SearchIndexHandle;
use swagger_mcp_storage::{OperationType, SearchDocument};

use crate::cache::{cache_key, QueryCache, DEFAULT_TTL};
use crate::classify::{classify, QueryType};
use crate::model::{
    AuthSummary, Cluster, Clusters, ComplexityLevel, Pagination, ParameterSummary, ResponseSummary, ResultSummary,
    SearchHit, SearchRequest, SearchResponse,
};
use crate::normalize::{all_stop_words, normalize_terms};
use crate::parser::parse;
use crate::synonyms::expand_term;
use crate::{compile, filters, suggest};

/// Default cap on documents pulled out of the index per query (design
/// §4.4 step 7 "pool ceiling default 1000").
pub const DEFAULT_POOL_CEILING: usize = 1000;

/// Default maximum `per_page` a caller may request.
pub const DEFAULT_MAX_PER_PAGE: u32 = 100;

/// Suggestions are only generated when the pool has fewer hits than this.
const LOW_RESULT_THRESHOLD: usize = 3;

/// A fuzzy fallback pass is only attempted for terms longer than this.
const FUZZY_MIN_TERM_LEN: usize = 3;

/// Size of the unfiltered vocabulary sample drawn for suggestion-building.
const VOCABULARY_SAMPLE_SIZE: usize = 200;

/// Tunable knobs for [`QueryEngine`] (design §4.4's response-time budget
/// and pool/cache sizing are all caller-configurable, never hardcoded
/// past this struct).
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Maximum documents retrieved and enriched per query.
    pub pool_ceiling: usize,
    /// Upper bound a caller's `per_page` is clamped to.
    pub max_per_page: u32,
    /// Cache entry capacity.
    pub cache_capacity: usize,
    /// Cache entry time-to-live.
    pub cache_ttl: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { pool_ceiling: DEFAULT_POOL_CEILING, max_per_page: DEFAULT_MAX_PER_PAGE, cache_capacity: 256, cache_ttl: DEFAULT_TTL }
    }
}

/// The query engine (component C4): stateless over the index itself (a
/// fresh [`SearchIndexHandle`] is passed to every call, so an in-flight
/// rebuild never blocks a running query), but owns its own result cache.
pub struct QueryEngine {
    settings: EngineSettings,
    cache: QueryCache,
}

impl QueryEngine {
    /// Build an engine with `settings`.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        let cache = QueryCache::new(settings.cache_capacity, settings.cache_ttl);
        Self { settings, cache }
    }

    /// Drop every cached response. Called by the conversion pipeline
    /// right after an atomic index-generation swap so stale hits never
    /// survive a rebuild (the cache key already embeds the generation,
    /// so this is a memory-saving nicety, not a correctness requirement).
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }

    /// Run one search (design §4.4's full pipeline).
    #[instrument(skip(self, handle), fields(generation = %handle.generation()))]
    pub fn search(&self, handle: &SearchIndexHandle, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let per_page = request.per_page.clamp(1, self.settings.max_per_page);
        let page = request.page.max(1);

        let parsed = parse(&request.query);
        let mut warnings = Vec::new();

        let effectively_empty = parsed.was_malformed || all_stop_words(&parsed.free_terms);
        if effectively_empty {
            warnings.push("query was empty or contained only stop-words; no filtering by text was applied".to_string());
        }

        let query_type = classify(&parsed);
        let normalized = normalize_terms(&parsed.free_terms);
        let canonical = canonical_form(&parsed);

        let key = cache_key(&canonical, &request.filters, page, per_page, handle.generation());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let schema = handle.index().schema();
        let expanded: Vec<Vec<String>> = normalized.iter().map(|t| expand_term(&t.stem)).collect();

        let base_query: Box<dyn Query> = if effectively_empty {
            Box::new(tantivy::query::AllQuery)
        } else {
            compile::compile(&schema, &parsed, &expanded)?
        };
        let query = filters::apply(&schema, base_query, &request.filters)?;

        let searcher = handle.searcher();
        let (mut total_results, mut scored) = run_search(&searcher, query.as_ref(), self.settings.pool_ceiling)?;

        let long_terms: Vec<String> = normalized.iter().map(|t| t.stem.clone()).filter(|t| t.len() > FUZZY_MIN_TERM_LEN).collect();
        if scored.len() < LOW_RESULT_THRESHOLD && !long_terms.is_empty() && !effectively_empty {
            let fuzzy_query = compile::with_fuzzy_fallback(&schema, compile::compile(&schema, &parsed, &expanded)?, &long_terms)?;
            let fuzzy_query = filters::apply(&schema, fuzzy_query, &request.filters)?;
            let (fuzzy_total, fuzzy_scored) = run_search(&searcher, fuzzy_query.as_ref(), self.settings.pool_ceiling)?;
            if fuzzy_scored.len() > scored.len() {
                total_results = total_results.max(fuzzy_total);
                scored = fuzzy_scored;
            }
        }

        if total_results > self.settings.pool_ceiling {
            warnings.push(format!(
                "{total_results} endpoints matched; only the top {} were ranked, enriched, and made available for pagination",
                self.settings.pool_ceiling
            ));
        }

        let mut pool: Vec<(f32, SearchDocument)> = Vec::with_capacity(scored.len());
        for (score, doc) in scored {
            let extracted = swagger_mcp_storage::search_index::extract_search_document(&schema, &doc)?;
            pool.push((score, extracted));
        }

        let required_histogram = parameter_name_histogram(&pool);
        let mut hits: Vec<SearchHit> = pool.iter().map(|(score, doc)| enrich(doc, *score, &required_histogram)).collect();

        if !request.filters.complexity_levels.is_empty() {
            let allowed = &request.filters.complexity_levels;
            hits.retain(|hit| allowed.contains(&hit.complexity));
        }

        let clusters = organize(&hits);
        let summary = assemble_summary(&hits, started.elapsed());

        let total_after_filters = hits.len();
        let total_pages = page_count(total_after_filters, per_page);
        let offset = ((page - 1) as usize) * per_page as usize;
        let page_hits: Vec<SearchHit> = hits.into_iter().skip(offset).take(per_page as usize).collect();

        let pagination = Pagination {
            page,
            per_page,
            total_results: total_after_filters,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
        };

        let suggestions = if total_after_filters < LOW_RESULT_THRESHOLD && !effectively_empty {
            let vocabulary = sample_vocabulary(&searcher, &schema, VOCABULARY_SAMPLE_SIZE)?;
            suggest::suggest(&parsed, query_type, &vocabulary)
        } else {
            Vec::new()
        };

        let response = SearchResponse { hits: page_hits, pagination, clusters, summary, suggestions, warnings };

        let elapsed = started.elapsed();
        if elapsed > Duration::from_millis(105) {
            warn!(elapsed_ms = elapsed.as_millis(), query = %request.query, "search exceeded its response-time budget");
        }

        self.cache.put(key, response.clone());
        Ok(response)
    }
}

/// Canonical string form of a parsed query, used for cache-key hashing
/// (design §8 "Idempotence"): term order and surface whitespace never
/// change the key, only the query's actual shape does.
fn canonical_form(parsed: &crate::parser::ParsedQuery) -> String {
    let mut free = parsed.free_terms.clone();
    free.sort();
    let mut excluded = parsed.excluded_terms.clone();
    excluded.sort();
    let mut wildcards = parsed.wildcard_terms.clone();
    wildcards.sort();
    let mut qualifiers: Vec<String> = parsed.field_qualifiers.iter().map(|q| format!("{}:{}", q.field, q.value)).collect();
    qualifiers.sort();
    format!(
        "free={}|excluded={}|wildcard={}|qualifiers={}|connective={:?}",
        free.join(","),
        excluded.join(","),
        wildcards.join(","),
        qualifiers.join(","),
        parsed.connective
    )
}

fn run_search(searcher: &tantivy::Searcher, query: &dyn Query, limit: usize) -> Result<(usize, Vec<(f32, tantivy::TantivyDocument)>)> {
    let (count, top_docs) = searcher
        .search(query, &(Count, TopDocs::with_limit(limit)))
        .map_err(|e| Error::index(format!("index search failed: {e}")))?;

    let mut scored = Vec::with_capacity(top_docs.len());
    for (score, address) in top_docs {
        let doc: tantivy::TantivyDocument =
            searcher.doc(address).map_err(|e| Error::index(format!("failed to fetch hit document: {e}")))?;
        scored.push((score, doc));
    }
    Ok((count, scored))
}

fn parameter_name_histogram(pool: &[(f32, SearchDocument)]) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for (_, doc) in pool {
        for name in &doc.parameter_names {
            *histogram.entry(name.clone()).or_insert(0) += 1;
        }
    }
    histogram
}

fn enrich(doc: &SearchDocument, score: f32, pool_parameter_histogram: &BTreeMap<String, usize>) -> SearchHit {
    let mut type_histogram = BTreeMap::new();
    for param_type in &doc.parameter_types {
        *type_histogram.entry(param_type.clone()).or_insert(0) += 1;
    }
    let has_complex_types = doc.parameter_types.iter().any(|t| t == "object" || t == "array");
    let has_file_upload = doc.operation_type == OperationType::Upload;

    let mut common_names: Vec<(String, usize)> = pool_parameter_histogram
        .iter()
        .filter(|(name, _)| doc.parameter_names.contains(name))
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    common_names.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let common_names: Vec<String> = common_names.into_iter().take(5).map(|(name, _)| name).collect();

    let parameters = ParameterSummary {
        total: doc.parameter_names.len(),
        required: doc.required_parameters.len(),
        optional: doc.optional_parameters.len(),
        type_histogram,
        has_file_upload,
        has_complex_types,
        common_names,
    };

    let auth = AuthSummary {
        required: !doc.security_scheme_names.is_empty(),
        schemes: doc.security_scheme_names.clone(),
        scopes: doc.security_scopes.clone(),
    };

    let complexity = classify_complexity(doc);
    let response = ResponseSummary {
        status_codes: doc.response_status_codes.clone(),
        content_types: doc.response_content_types.clone(),
        complexity,
    };

    SearchHit {
        id: doc.endpoint_id.clone(),
        path: doc.path.clone(),
        method: doc.method.clone(),
        summary: doc.summary.clone(),
        description: doc.description.clone(),
        operation_id: doc.operation_id.clone(),
        tags: doc.tags.clone(),
        score,
        resource_group: doc.resource_name.clone(),
        operation_type: doc.operation_type.as_str().to_string(),
        category: doc.category.clone(),
        category_group: doc.category_group.clone(),
        parameters,
        auth,
        response,
        complexity,
        deprecated: doc.deprecated,
    }
}

/// Complexity classification (design §4.4 step 8): weighs parameter
/// count and response-shape variety. Few parameters and a single
/// response shape reads as simple; many parameters or many distinct
/// response variants reads as complex.
fn classify_complexity(doc: &SearchDocument) -> ComplexityLevel {
    let param_count = doc.parameter_names.len();
    let response_variety = doc.response_content_types.len() + doc.response_status_codes.len();
    let score = param_count + response_variety;
    if score <= 2 {
        ComplexityLevel::Simple
    } else if score <= 6 {
        ComplexityLevel::Moderate
    } else {
        ComplexityLevel::Complex
    }
}

/// Cluster the full pool along every dimension design §4.4 step 9 names,
/// preserving rank order within each cluster (hits arrive pre-sorted by
/// score descending).
fn organize(hits: &[SearchHit]) -> Clusters {
    let mut by_tag: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut by_resource_group: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut by_complexity: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut by_method: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut by_operation_type: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut by_auth_requirement: IndexMap<String, Vec<String>> = IndexMap::new();

    for hit in hits {
        for tag in &hit.tags {
            by_tag.entry(tag.clone()).or_default().push(hit.id.clone());
        }
        by_resource_group.entry(hit.resource_group.clone()).or_default().push(hit.id.clone());
        by_complexity.entry(complexity_label(hit.complexity).to_string()).or_default().push(hit.id.clone());
        by_method.entry(hit.method.clone()).or_default().push(hit.id.clone());
        by_operation_type.entry(hit.operation_type.clone()).or_default().push(hit.id.clone());
        let auth_label = if hit.auth.required { "required" } else { "none" };
        by_auth_requirement.entry(auth_label.to_string()).or_default().push(hit.id.clone());
    }

    let to_clusters = |map: IndexMap<String, Vec<String>>| -> Vec<Cluster> {
        map.into_iter().map(|(label, endpoint_ids)| Cluster { label, endpoint_ids }).collect()
    };

    Clusters {
        by_tag: to_clusters(by_tag),
        by_resource_group: to_clusters(by_resource_group),
        by_complexity: to_clusters(by_complexity),
        by_method: to_clusters(by_method),
        by_operation_type: to_clusters(by_operation_type),
        by_auth_requirement: to_clusters(by_auth_requirement),
    }
}

fn complexity_label(level: ComplexityLevel) -> &'static str {
    match level {
        ComplexityLevel::Simple => "simple",
        ComplexityLevel::Moderate => "moderate",
        ComplexityLevel::Complex => "complex",
    }
}

fn assemble_summary(hits: &[SearchHit], elapsed: Duration) -> ResultSummary {
    let mut results_by_method = BTreeMap::new();
    let mut results_by_auth = BTreeMap::new();
    let mut results_by_complexity = BTreeMap::new();
    let mut total_score = 0.0f32;

    for hit in hits {
        *results_by_method.entry(hit.method.clone()).or_insert(0) += 1;
        let auth_label = if hit.auth.required { "required" } else { "none" };
        *results_by_auth.entry(auth_label.to_string()).or_insert(0) += 1;
        *results_by_complexity.entry(complexity_label(hit.complexity).to_string()).or_insert(0) += 1;
        total_score += hit.score;
    }

    let average_score = if hits.is_empty() { 0.0 } else { total_score / hits.len() as f32 };

    ResultSummary {
        results_by_method,
        results_by_auth,
        results_by_complexity,
        average_score,
        processing_time_ms: elapsed.as_secs_f64() * 1000.0,
    }
}

fn page_count(total: usize, per_page: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((total as u64).div_ceil(u64::from(per_page))) as u32
}

/// Draw a bounded, unfiltered sample of index vocabulary (keywords plus
/// resource names) to ground typo/similar-term suggestions against real
/// index content without walking the full term dictionary.
fn sample_vocabulary(searcher: &tantivy::Searcher, schema: &tantivy::schema::Schema, sample_size: usize) -> Result<BTreeMap<String, usize>> {
    let (_, top_docs) = searcher
        .search(&tantivy::query::AllQuery, &(Count, TopDocs::with_limit(sample_size)))
        .map_err(|e| Error::index(format!("vocabulary sample search failed: {e}")))?;

    let mut vocabulary = BTreeMap::new();
    for (_, address) in top_docs {
        let doc: tantivy::TantivyDocument =
            searcher.doc(address).map_err(|e| Error::index(format!("failed to fetch sample document: {e}")))?;
        let extracted = swagger_mcp_storage::search_index::extract_search_document(schema, &doc)?;
        for keyword in extracted.keywords {
            *vocabulary.entry(keyword).or_insert(0) += 1;
        }
        if !extracted.resource_name.is_empty() {
            *vocabulary.entry(extracted.resource_name).or_insert(0) += 1;
        }
    }
    Ok(vocabulary)
}
