use rayon::prelude::*;
use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::Token;
use crate::core::types::FieldValue;

/// A validated document waiting to be indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDocument {
    pub external_id: String,
    pub fields: Vec<(String, FieldValue)>,
}

/// Tokens of every indexable field of a `PendingDocument`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedDocument {
    pub fields: Vec<(String, Vec<Token>)>,
}

/// Analyzes batches of documents on the rayon pool. Analysis is the only
/// parallel phase; the structural index update that follows is sequential.
pub struct ParallelIndexer {
    pub parallel_threshold: usize,
}

impl ParallelIndexer {
    pub fn new(parallel_threshold: usize) -> Self {
        ParallelIndexer { parallel_threshold }
    }

    /// Output is in the order of `documents`.
    pub fn analyze_batch(&self, documents: &[PendingDocument], analyzer: &Analyzer) -> Vec<AnalyzedDocument> {
        let analyzed: Vec<AnalyzedDocument> = if documents.len() >= self.parallel_threshold {
            documents
                .par_iter()
                .map(|doc| self.analyze_document(doc, analyzer))
                .collect()
        } else {
            documents
                .iter()
                .map(|doc| self.analyze_document(doc, analyzer))
                .collect()
        };

        tracing::debug!(documents = documents.len(), parallel = documents.len() >= self.parallel_threshold, "batch analyzed");
        analyzed
    }

    fn analyze_document(&self, doc: &PendingDocument, analyzer: &Analyzer) -> AnalyzedDocument {
        let fields = doc.fields
            .iter()
            .filter_map(|(name, value)| {
                let text = value.as_text()?;
                Some((name.clone(), analyzer.analyze(&text)))
            })
            .collect();
        AnalyzedDocument { fields }
    }
}
