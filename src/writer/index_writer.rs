use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use serde_json::{Map, Value};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, FieldValue};
use crate::core::update::{DocumentIssue, IngestReport};
use crate::index::fields::FieldId;
use crate::mvcc::controller::Snapshot;
use crate::parallel::indexer::{ParallelIndexer, PendingDocument};

/// Applies write operations to a snapshot draft. Only ever called under the
/// MVCC writer lock.
pub struct IndexWriter {
    analyzer: Arc<Analyzer>,
    indexer: ParallelIndexer,
}

impl IndexWriter {
    pub fn new(analyzer: Arc<Analyzer>, config: &Config) -> Self {
        IndexWriter {
            analyzer,
            indexer: ParallelIndexer::new(config.parallel_batch_threshold),
        }
    }

    /// Add or replace documents. Invalid documents are rejected one by one;
    /// a batch only fails as a whole when no primary key can be determined.
    pub fn add_documents(&self, draft: &mut Snapshot, batch: Vec<Value>) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        let primary_key = match &draft.primary_key {
            Some(key) => key.clone(),
            None => {
                let key = infer_primary_key(&batch)?;
                tracing::info!(primary_key = key.as_str(), "primary key inferred");
                draft.primary_key = Some(key.clone());
                key
            }
        };

        let pending = prepare_batch(batch, &primary_key, &mut report);
        let analyzed = self.indexer.analyze_batch(&pending, &self.analyzer);

        let fields = Arc::make_mut(&mut draft.fields);
        let documents = Arc::make_mut(&mut draft.documents);
        let index = Arc::make_mut(&mut draft.index);
        let filterable = Arc::make_mut(&mut draft.filterable);

        for (doc, analysis) in pending.into_iter().zip(analyzed) {
            let doc_id = documents.assign_id(&doc.external_id);

            let mut field_tokens: Vec<(FieldId, _)> = Vec::with_capacity(analysis.fields.len());
            for (name, tokens) in analysis.fields {
                field_tokens.push((fields.insert(&name)?, tokens));
            }
            for (name, _) in &doc.fields {
                fields.insert(name)?;
            }

            let mut document = Document::new(doc_id, doc.external_id);
            document.fields = doc.fields;

            index.index_document(doc_id, &field_tokens);
            if let Some(previous) = documents.get(doc_id) {
                filterable.remove_document(previous);
            }
            filterable.index_document(&document);
            documents.insert(document);
            report.indexed_documents += 1;
        }

        index.rebuild_prefix_index()?;
        Ok(report)
    }

    /// Delete by external id. Unknown ids are ignored.
    pub fn delete_documents(&self, draft: &mut Snapshot, ids: &[String]) -> Result<usize> {
        let documents = Arc::make_mut(&mut draft.documents);
        let index = Arc::make_mut(&mut draft.index);
        let filterable = Arc::make_mut(&mut draft.filterable);

        let mut deleted = 0;
        for id in ids {
            if let Some(doc) = documents.remove(id) {
                index.remove_document(doc.id);
                filterable.remove_document(&doc);
                deleted += 1;
            }
        }

        if deleted > 0 {
            index.rebuild_prefix_index()?;
        }
        Ok(deleted)
    }

    /// Remove every document; settings and the primary key are kept.
    pub fn clear_documents(&self, draft: &mut Snapshot) -> usize {
        Arc::make_mut(&mut draft.index).clear();
        Arc::make_mut(&mut draft.filterable).clear();
        Arc::make_mut(&mut draft.documents).clear()
    }

    pub fn set_filterable_attributes(&self, draft: &mut Snapshot, attributes: BTreeSet<String>) {
        Arc::make_mut(&mut draft.filterable).configure(attributes, &draft.documents);
    }
}

/// First field of the first document named like an identifier: `id` in any
/// case, or a name ending with `Id`, `_id` or `-id` such as `objectId`.
pub fn infer_primary_key(batch: &[Value]) -> Result<String> {
    batch
        .iter()
        .find_map(Value::as_object)
        .and_then(|object| object.keys().find(|k| is_id_field(k)).cloned())
        .ok_or_else(|| Error::new(
            ErrorKind::MissingPrimaryKey,
            "the primary key could not be inferred from the documents, set it explicitly".to_string(),
        ))
}

fn is_id_field(name: &str) -> bool {
    if name.eq_ignore_ascii_case("id") {
        return true;
    }
    match name.strip_suffix("Id") {
        Some(stem) => stem.chars().last().is_some_and(|c| c.is_lowercase() || c.is_ascii_digit()),
        None => name.ends_with("_id") || name.ends_with("-id"),
    }
}

/// Document id as a string: an integer, or a non-empty string of
/// alphanumerics, `-` and `_`.
pub fn document_id(object: &Map<String, Value>, primary_key: &str) -> std::result::Result<String, String> {
    match object.get(primary_key) {
        None => Err(format!("document has no `{}` attribute", primary_key)),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        Some(Value::String(s))
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            Ok(s.clone())
        }
        Some(other) => Err(format!("invalid document id `{}`", other)),
    }
}

/// Validate and convert a batch. Later duplicates of an id replace earlier ones.
fn prepare_batch(batch: Vec<Value>, primary_key: &str, report: &mut IngestReport) -> Vec<PendingDocument> {
    let mut prepared = Vec::with_capacity(batch.len());

    for value in batch {
        let Value::Object(object) = value else {
            tracing::warn!("rejected document: not a JSON object");
            report.rejected_documents.push(DocumentIssue {
                document: None,
                field: None,
                message: "document must be a JSON object".to_string(),
            });
            continue;
        };

        let external_id = match document_id(&object, primary_key) {
            Ok(id) => id,
            Err(message) => {
                tracing::warn!(%message, "rejected document");
                report.rejected_documents.push(DocumentIssue {
                    document: None,
                    field: Some(primary_key.to_string()),
                    message,
                });
                continue;
            }
        };

        let mut fields = Vec::with_capacity(object.len());
        for (name, value) in object {
            let value = FieldValue::from_json(value);
            if let FieldValue::Raw(_) = value {
                tracing::warn!(document = external_id.as_str(), field = name.as_str(),
                               kind = value.type_name(), "field is stored but not indexed");
                report.field_warnings.push(DocumentIssue {
                    document: Some(external_id.clone()),
                    field: Some(name.clone()),
                    message: format!("{} values are stored but not searchable", value.type_name()),
                });
            }
            fields.push((name, value));
        }

        prepared.push(PendingDocument { external_id, fields });
    }

    // Keep the last occurrence of each id, in batch order
    let mut seen = HashSet::new();
    let mut deduped: Vec<PendingDocument> = prepared
        .into_iter()
        .rev()
        .filter(|doc| seen.insert(doc.external_id.clone()))
        .collect();
    deduped.reverse();
    deduped
}
