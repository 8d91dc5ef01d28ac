//! Index writer: analyzes documents into a [`MemoryIndex`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::analysis::analyzer::Analyzer;
use crate::engine::directory::RamDirectory;
use crate::engine::document::Document;
use crate::engine::memory::MemoryIndex;
use crate::engine::reader::IndexReader;
use crate::engine::snapshot::{self, IndexMetadata};
use crate::error::Result;

/// How a field is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    /// Run the analyzer over the value. Untokenized values are indexed as a
    /// single term.
    pub tokenized: bool,
    /// Keep the raw value retrievable through `IndexReader::document`.
    pub stored: bool,
    /// Keep a per-document term vector.
    pub term_vectors: bool,
}

impl FieldOptions {
    /// Analyzed and stored, no term vectors.
    pub fn text() -> Self {
        FieldOptions {
            tokenized: true,
            stored: true,
            term_vectors: false,
        }
    }

    /// Analyzed and stored, with term vectors.
    pub fn text_with_term_vectors() -> Self {
        FieldOptions {
            term_vectors: true,
            ..Self::text()
        }
    }

    /// Stored and indexed verbatim as one term.
    pub fn keyword() -> Self {
        FieldOptions {
            tokenized: false,
            stored: true,
            term_vectors: false,
        }
    }

    pub fn with_term_vectors(mut self, term_vectors: bool) -> Self {
        self.term_vectors = term_vectors;
        self
    }

    pub fn with_stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self::text()
    }
}

/// Builds an index from documents.
///
/// Fields without explicit options use [`FieldOptions::text`].
pub struct IndexWriter {
    analyzer: Arc<dyn Analyzer>,
    field_options: BTreeMap<String, FieldOptions>,
    index: MemoryIndex,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("analyzer", &self.analyzer.name())
            .field("field_options", &self.field_options)
            .field("doc_count", &self.doc_count())
            .finish()
    }
}

impl IndexWriter {
    /// Create a writer that analyzes text with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        IndexWriter {
            analyzer,
            field_options: BTreeMap::new(),
            index: MemoryIndex::new(),
        }
    }

    /// Set the options of one field.
    pub fn with_field<S: Into<String>>(mut self, field: S, options: FieldOptions) -> Self {
        self.field_options.insert(field.into(), options);
        self
    }

    fn options_for(&self, field: &str) -> FieldOptions {
        self.field_options.get(field).copied().unwrap_or_default()
    }

    /// Analyze and add a document, returning its id.
    pub fn add_document(&mut self, document: Document) -> Result<u64> {
        let mut stored = Document::new();
        let mut analyzed = Vec::with_capacity(document.len());

        for (name, value) in document.fields() {
            let options = self.options_for(name);
            let tokens = if options.tokenized {
                self.analyzer.tokenize(value)?
            } else {
                vec![value.to_string()]
            };
            analyzed.push((name.to_string(), tokens, options.term_vectors));
            if options.stored {
                stored.add_field(name, value);
            }
        }

        let doc_id = self.index.push_document(stored);
        for (field, tokens, term_vectors) in analyzed {
            self.index.index_field(doc_id, &field, &tokens, term_vectors);
        }

        Ok(doc_id)
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> u64 {
        self.index.doc_count()
    }

    /// Write the index as a snapshot under `path`.
    pub fn commit<P: AsRef<Path>>(&self, path: P) -> Result<IndexMetadata> {
        let metadata = snapshot::write(&self.index, path.as_ref())?;
        info!(
            "Committed {} documents to {}",
            metadata.doc_count,
            path.as_ref().display()
        );
        Ok(metadata)
    }

    /// Consume the writer and return the index.
    pub fn finish(self) -> MemoryIndex {
        self.index
    }

    /// Consume the writer into an in-memory directory.
    pub fn into_ram_directory(self) -> RamDirectory {
        RamDirectory::new(self.index)
    }
}
