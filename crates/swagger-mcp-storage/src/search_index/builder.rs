//! The keyword-weighted index build protocol (design §4.3.2 "Build
//! protocol"): batched writes, a final segment merge ("optimized"), and a
//! validation pass comparing the relational endpoint count to the index
//! document count.

use std::path::Path;

use swagger_mcp_foundation::{Error, Result};
use tantivy::doc;
use tantivy::schema::Schema as TantivySchema;
use tantivy::{Index, IndexWriter};

use super::schema::{build_schema, fields, register_tokenizers};
use crate::model::SearchDocument;

/// Default batch size between writer commits (design §4.3.2 "Batched
/// writes (default batch size tunable)").
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Heap budget handed to `tantivy`'s `IndexWriter` per build.
const WRITER_HEAP_BYTES: usize = 64 * 1024 * 1024;

/// Summary statistics recorded after a build (design §4.3.2 "The builder
/// records the document count, field count, and total byte size").
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct BuildStats {
    /// Number of documents written.
    pub document_count: usize,
    /// Number of schema fields declared.
    pub field_count: usize,
    /// Total on-disk byte size of the built index directory.
    pub total_bytes: u64,
}

/// Build a fresh weighted index of `documents` at `dir` (must exist and be
/// empty), batching writer commits every `batch_size` documents, merging
/// segments at the end, and validating the on-disk document count against
/// `expected_count` (the relational endpoint count, design §4.3.2
/// "Validation").
pub fn build_index(dir: &Path, documents: &[SearchDocument], batch_size: usize, expected_count: usize) -> Result<BuildStats> {
    let schema = build_schema();
    let index = Index::create_in_dir(dir, schema.clone())
        .map_err(|e| Error::index(format!("failed to create index directory {}: {e}", dir.display())))?;
    register_tokenizers(&index.tokenizers());

    let mut writer: IndexWriter = index
        .writer(WRITER_HEAP_BYTES)
        .map_err(|e| Error::index(format!("failed to create index writer: {e}")))?;

    let batch_size = batch_size.max(1);
    for (i, document) in documents.iter().enumerate() {
        let doc = build_tantivy_doc(&schema, document)?;
        writer
            .add_document(doc)
            .map_err(|e| Error::index(format!("failed to add document '{}': {e}", document.endpoint_id)))?;
        if (i + 1) % batch_size == 0 {
            writer.commit().map_err(|e| Error::index(format!("failed to commit index batch: {e}")))?;
        }
    }
    writer.commit().map_err(|e| Error::index(format!("failed to commit final index batch: {e}")))?;

    optimize(&index, &mut writer)?;

    let reader = index
        .reader()
        .map_err(|e| Error::index(format!("failed to open index reader after build: {e}")))?;
    let document_count = reader.searcher().num_docs() as usize;

    if document_count != expected_count {
        return Err(Error::index(format!(
            "index document count {document_count} does not match relational endpoint count {expected_count}"
        )));
    }

    let total_bytes = directory_size(dir)?;

    Ok(BuildStats { document_count, field_count: schema.fields().count(), total_bytes })
}

/// Merge all searchable segments into one, per design §4.3.2 "After all
/// documents are added, the index is optimized (merged)".
fn optimize(index: &Index, writer: &mut IndexWriter) -> Result<()> {
    let segment_ids = index
        .searchable_segment_ids()
        .map_err(|e| Error::index(format!("failed to list segments to merge: {e}")))?;
    if segment_ids.len() > 1 {
        writer
            .merge(&segment_ids)
            .wait()
            .map_err(|e| Error::index(format!("failed to merge index segments: {e}")))?;
    }
    writer.wait_merging_threads().map_err(|e| Error::index(format!("failed to wait for merge threads: {e}")))?;
    Ok(())
}

fn build_tantivy_doc(schema: &TantivySchema, document: &SearchDocument) -> Result<tantivy::TantivyDocument> {
    let f = |name: &str| schema.get_field(name).expect("weighted index schema is internally consistent");

    let doc_json = serde_json::to_string(document)
        .map_err(|e| Error::index(format!("failed to serialize search document '{}': {e}", document.endpoint_id)))?;

    let mut doc = doc!(
        f(fields::ENDPOINT_ID) => document.endpoint_id.clone(),
        f(fields::ENDPOINT_PATH) => document.path.clone(),
        f(fields::RESOURCE_NAME) => document.resource_name.clone(),
        f(fields::OPERATION_SUMMARY) => document.summary.clone(),
        f(fields::OPERATION_DESCRIPTION) => document.description.clone(),
        f(fields::PARAMETER_NAMES) => document.parameter_names.join(" "),
        f(fields::PARAMETER_DESCRIPTIONS) => document.parameter_descriptions.join(" "),
        f(fields::KEYWORDS) => document.keywords.iter().cloned().collect::<Vec<_>>().join(" "),
        f(fields::TAGS) => document.tags.join(" "),
        f(fields::OPERATION_ID) => document.operation_id.clone(),
        f(fields::SEARCHABLE_TEXT) => document.searchable_text.clone(),
        f(fields::METHOD) => document.method.clone(),
        f(fields::OPERATION_TYPE) => document.operation_type.as_str().to_string(),
        f(fields::DEPRECATED) => u64::from(document.deprecated),
        f(fields::HAS_REQUEST_BODY) => u64::from(document.has_request_body),
        f(fields::HAS_EXAMPLES) => u64::from(document.has_examples),
        f(fields::REQUIRES_AUTH) => u64::from(!document.security_scheme_names.is_empty()),
        f(fields::PARAMETER_COUNT) => (document.required_parameters.len() + document.optional_parameters.len()) as u64,
        f(fields::OPTIONAL_PARAMETER_COUNT) => document.optional_parameters.len() as u64,
        f(fields::DOC_JSON) => doc_json,
    );

    for content_type in &document.response_content_types {
        doc.add_text(f(fields::CONTENT_TYPES), content_type);
    }
    for status_code in &document.response_status_codes {
        doc.add_text(f(fields::STATUS_CODES), status_code);
    }
    for scheme in &document.security_scheme_names {
        doc.add_text(f(fields::SECURITY_SCHEMES), scheme);
    }
    for param in &document.required_parameters {
        doc.add_text(f(fields::REQUIRED_PARAMETERS), param);
    }
    if let Some(category) = &document.category {
        doc.add_text(f(fields::CATEGORY), category);
    }
    if let Some(group) = &document.category_group {
        doc.add_text(f(fields::CATEGORY_GROUP), group);
    }

    Ok(doc)
}

fn directory_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in std::fs::read_dir(dir).map_err(|e| Error::index(format!("failed to read index directory: {e}")))? {
        let entry = entry.map_err(|e| Error::index(format!("failed to read index directory entry: {e}")))?;
        let metadata = entry.metadata().map_err(|e| Error::index(format!("failed to stat index file: {e}")))?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationType;
    use std::collections::BTreeSet;

    fn doc(path: &str, method: &str) -> SearchDocument {
        SearchDocument {
            endpoint_id: format!("{method} {path}"),
            path: path.to_string(),
            method: method.to_string(),
            operation_id: "listWidgets".to_string(),
            summary: "List widgets".to_string(),
            description: String::new(),
            path_segments: vec!["widgets".to_string()],
            resource_name: "widgets".to_string(),
            operation_type: OperationType::List,
            parameter_names: Vec::new(),
            parameter_types: Vec::new(),
            parameter_descriptions: Vec::new(),
            required_parameters: Vec::new(),
            optional_parameters: Vec::new(),
            response_content_types: vec!["application/json".to_string()],
            response_status_codes: vec!["200".to_string()],
            security_scheme_names: Vec::new(),
            security_scopes: Vec::new(),
            tags: vec!["widgets".to_string()],
            searchable_text: "list widgets".to_string(),
            keywords: BTreeSet::from(["widgets".to_string()]),
            deprecated: false,
            has_request_body: false,
            has_examples: false,
            category: Some("widgets".to_string()),
            category_group: None,
        }
    }

    #[test]
    fn builds_an_index_whose_document_count_matches_expected() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![doc("/widgets", "GET"), doc("/widgets/{id}", "GET")];
        let stats = build_index(dir.path(), &docs, DEFAULT_BATCH_SIZE, docs.len()).unwrap();
        assert_eq!(stats.document_count, 2);
        assert!(stats.field_count > 0);
    }

    #[test]
    fn mismatched_expected_count_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![doc("/widgets", "GET")];
        let result = build_index(dir.path(), &docs, DEFAULT_BATCH_SIZE, 5);
        assert!(result.is_err());
    }
}
