use std::collections::BTreeSet;
use std::sync::Arc;
use serde_json::Value;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::IndexStats;
use crate::core::update::{IngestReport, UpdateId, UpdateKind, UpdateRecord, UpdateStatus, UpdateStore};
use crate::mvcc::controller::{MVCCController, Snapshot};
use crate::query::cache::{QueryCache, QueryKey};
use crate::query::types::SearchQuery;
use crate::reader::snapshot_reader::SnapshotReader;
use crate::search::executor::QueryExecutor;
use crate::search::results::SearchResponse;
use crate::writer::index_writer::IndexWriter;

/// A searchable collection of documents.
///
/// Reads run against the snapshot current when they start. Writes are
/// applied synchronously: the returned `UpdateRecord` is already terminal and
/// its effects are visible to every later read.
pub struct Index {
    uid: String,
    config: Config,
    mvcc: MVCCController,
    writer: IndexWriter,
    executor: QueryExecutor,
    cache: Option<QueryCache>,
    updates: UpdateStore,
}

impl Index {
    pub fn new(uid: &str, config: Config) -> Self {
        let analyzer = Arc::new(Analyzer::standard(config.max_token_length));
        Self::build(uid, config, None, analyzer)
    }

    pub fn with_primary_key(uid: &str, config: Config, primary_key: &str) -> Self {
        let analyzer = Arc::new(Analyzer::standard(config.max_token_length));
        Self::build(uid, config, Some(primary_key.to_string()), analyzer)
    }

    /// Index using a custom analysis pipeline for documents and queries.
    pub fn with_analyzer(uid: &str, config: Config, analyzer: Analyzer) -> Self {
        Self::build(uid, config, None, Arc::new(analyzer))
    }

    fn build(uid: &str, config: Config, primary_key: Option<String>, analyzer: Arc<Analyzer>) -> Self {
        let snapshot = Snapshot { primary_key, ..Snapshot::default() };

        tracing::info!(uid, analyzer = analyzer.describe().as_str(), "index created");
        Index {
            uid: uid.to_string(),
            mvcc: MVCCController::new(snapshot),
            writer: IndexWriter::new(analyzer.clone(), &config),
            executor: QueryExecutor::new(analyzer, config.clone()),
            cache: QueryCache::new(config.query_cache_size),
            updates: UpdateStore::new(),
            config,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn primary_key(&self) -> Option<String> {
        self.mvcc.current_snapshot().primary_key.clone()
    }

    /// Point-in-time view for several consistent reads.
    pub fn snapshot_reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.mvcc.current_snapshot())
    }

    // Documents

    pub fn add_documents(&self, documents: Vec<Value>) -> Result<UpdateRecord> {
        let kind = UpdateKind::DocumentsAddition { number: documents.len() };
        self.apply(kind, |writer, draft| writer.add_documents(draft, documents).map(Some))
    }

    pub fn delete_document(&self, id: &str) -> Result<UpdateRecord> {
        self.delete_documents(&[id.to_string()])
    }

    pub fn delete_documents(&self, ids: &[String]) -> Result<UpdateRecord> {
        let kind = UpdateKind::DocumentsDeletion { number: ids.len() };
        self.apply(kind, |writer, draft| {
            let deleted = writer.delete_documents(draft, ids)?;
            tracing::debug!(requested = ids.len(), deleted, "documents deleted");
            Ok(None)
        })
    }

    pub fn clear_documents(&self) -> Result<UpdateRecord> {
        self.apply(UpdateKind::ClearAll, |writer, draft| {
            let cleared = writer.clear_documents(draft);
            tracing::debug!(cleared, "documents cleared");
            Ok(None)
        })
    }

    pub fn get_document(&self, id: &str) -> Result<Value> {
        self.snapshot_reader().get_document(id)
    }

    pub fn get_documents(&self, offset: usize, limit: usize) -> Vec<Value> {
        self.snapshot_reader().get_documents(offset, limit)
    }

    // Settings

    pub fn filterable_attributes(&self) -> Vec<String> {
        self.mvcc.current_snapshot().filterable.attributes().iter().cloned().collect()
    }

    pub fn update_filterable_attributes(&self, attributes: &[&str]) -> Result<UpdateRecord> {
        let attributes: BTreeSet<String> = attributes.iter().map(|a| a.to_string()).collect();
        self.apply(UpdateKind::Settings, |writer, draft| {
            writer.set_filterable_attributes(draft, attributes);
            Ok(None)
        })
    }

    pub fn reset_filterable_attributes(&self) -> Result<UpdateRecord> {
        self.update_filterable_attributes(&[])
    }

    // Search

    pub fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let reader = self.snapshot_reader();

        let Some(cache) = &self.cache else {
            return reader.search(&self.executor, query);
        };

        let key = QueryKey { version: reader.version(), request: query.cache_key()? };
        if let Some(response) = cache.get(&key) {
            return Ok(response);
        }
        let response = reader.search(&self.executor, query)?;
        cache.put(key, response.clone());
        Ok(response)
    }

    /// Search with a raw JSON request body.
    pub fn search_json(&self, request: Value) -> Result<SearchResponse> {
        self.search(&SearchQuery::from_json(request)?)
    }

    // Updates & stats

    pub fn get_update(&self, id: UpdateId) -> Option<UpdateRecord> {
        self.updates.get(id)
    }

    pub fn list_updates(&self) -> Vec<UpdateRecord> {
        self.updates.list()
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.mvcc.current_snapshot();
        IndexStats {
            number_of_documents: snapshot.documents.len(),
            field_distribution: snapshot.documents.field_distribution(),
            primary_key: snapshot.primary_key.clone(),
            filterable_attributes: snapshot.filterable.attributes().iter().cloned().collect(),
            version: snapshot.version,
            term_count: snapshot.index.term_count(),
            avg_field_length: snapshot.index.avg_field_length(),
            last_update: snapshot.timestamp,
            cache_stats: self.cache.as_ref().map(QueryCache::stats),
        }
    }

    /// Run one write under the writer lock and record its outcome.
    fn apply<F>(&self, kind: UpdateKind, operation: F) -> Result<UpdateRecord>
    where
        F: FnOnce(&IndexWriter, &mut Snapshot) -> Result<Option<IngestReport>>,
    {
        let update_id = self.updates.register(kind);
        self.updates.start(update_id);

        let result = self.mvcc.write(|draft| operation(&self.writer, draft));
        let (status, report) = match &result {
            Ok(report) => (UpdateStatus::Processed, report.clone()),
            Err(err) => (UpdateStatus::Failed(err.to_string()), None),
        };

        let record = self.updates.finish(update_id, status, report).ok_or_else(|| Error::new(
            ErrorKind::Internal,
            format!("update {} vanished from the update store", update_id.0),
        ))?;

        if let Some(cache) = &self.cache {
            cache.clear();
        }

        result.map(|_| record)
    }
}
