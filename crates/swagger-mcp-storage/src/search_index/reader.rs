//! Opening a built weighted index for read-only query execution (design
//! §5 "The keyword index is read through a pool of reader handles, one
//! per request").

use std::path::Path;

use swagger_mcp_foundation::{Error, Generation, Result};
use tantivy::{Index, IndexReader, ReloadPolicy};

use super::schema::register_tokenizers;
use crate::model::SearchDocument;

/// An opened weighted index, pinned to the generation it was opened from.
/// Cheap to clone (`tantivy::Index`/`IndexReader` are internally `Arc`'d).
#[derive(Clone)]
pub struct SearchIndexHandle {
    index: Index,
    reader: IndexReader,
    generation: Generation,
}

impl SearchIndexHandle {
    /// Open the index directory for `generation` under `root`.
    pub fn open(root: &Path, generation: Generation) -> Result<Self> {
        let dir = super::directory::generation_dir(root, generation);
        let index = Index::open_in_dir(&dir)
            .map_err(|e| Error::index(format!("failed to open index directory {}: {e}", dir.display())))?;
        register_tokenizers(&index.tokenizers());

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| Error::index(format!("failed to build index reader: {e}")))?;

        Ok(Self { index, reader, generation })
    }

    /// The underlying `tantivy` index, for query compilation.
    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// A fresh searcher handle for one query (design §5 "one per request").
    #[must_use]
    pub fn searcher(&self) -> tantivy::Searcher {
        self.reader.searcher()
    }

    /// The generation this handle was opened from.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

/// Deserialize the stored [`SearchDocument`] out of a hit's `doc_json` field.
pub fn extract_search_document(schema: &tantivy::schema::Schema, doc: &tantivy::TantivyDocument) -> Result<SearchDocument> {
    use tantivy::schema::Value;

    let field = schema
        .get_field(super::schema::fields::DOC_JSON)
        .map_err(|e| Error::index(format!("schema missing doc_json field: {e}")))?;
    let json = doc
        .get_first(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::index("hit document missing doc_json value"))?;
    serde_json::from_str(json).map_err(|e| Error::index(format!("failed to deserialize stored search document: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_index::builder::{build_index, DEFAULT_BATCH_SIZE};
    use crate::search_index::schema::build_schema;
    use crate::model::OperationType;
    use std::collections::BTreeSet;
    use swagger_mcp_foundation::Generation;

    fn doc(path: &str) -> SearchDocument {
        SearchDocument {
            endpoint_id: format!("GET {path}"),
            path: path.to_string(),
            method: "GET".to_string(),
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
            response_content_types: Vec::new(),
            response_status_codes: Vec::new(),
            security_scheme_names: Vec::new(),
            security_scopes: Vec::new(),
            tags: Vec::new(),
            searchable_text: "list widgets".to_string(),
            keywords: BTreeSet::new(),
            deprecated: false,
            has_request_body: false,
            has_examples: false,
            category: None,
            category_group: None,
        }
    }

    #[test]
    fn opens_a_built_index_and_round_trips_a_document() {
        let root = tempfile::tempdir().unwrap();
        let gen_dir = super::super::directory::generation_dir(root.path(), Generation::FIRST);
        std::fs::create_dir_all(&gen_dir).unwrap();
        let docs = vec![doc("/widgets")];
        build_index(&gen_dir, &docs, DEFAULT_BATCH_SIZE, docs.len()).unwrap();

        let handle = SearchIndexHandle::open(root.path(), Generation::FIRST).unwrap();
        let searcher = handle.searcher();
        assert_eq!(searcher.num_docs(), 1);

        let schema = build_schema();
        let reader_doc = searcher.doc::<tantivy::TantivyDocument>(tantivy::DocAddress::new(0, 0)).unwrap();
        let sd = extract_search_document(&schema, &reader_doc).unwrap();
        assert_eq!(sd.path, "/widgets");
    }
}
