use std::sync::Arc;
use serde_json::Value;
use crate::core::error::{Error, ErrorKind, Result};
use crate::mvcc::controller::Snapshot;
use crate::query::types::SearchQuery;
use crate::search::executor::QueryExecutor;
use crate::search::results::SearchResponse;

/// Reader for a specific snapshot. Every call sees the same data, whatever
/// writers publish in the meantime.
#[derive(Clone)]
pub struct SnapshotReader {
    pub snapshot: Arc<Snapshot>,
}

impl SnapshotReader {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        SnapshotReader { snapshot }
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn search(&self, executor: &QueryExecutor, query: &SearchQuery) -> Result<SearchResponse> {
        executor.execute(&self.snapshot, query)
    }

    pub fn get_document(&self, external_id: &str) -> Result<Value> {
        self.snapshot
            .documents
            .get_by_external(external_id)
            .map(|doc| Value::Object(doc.to_json_map()))
            .ok_or_else(|| Error::new(
                ErrorKind::DocumentNotFound,
                format!("document `{}` not found", external_id),
            ))
    }

    /// Documents in insertion order.
    pub fn get_documents(&self, offset: usize, limit: usize) -> Vec<Value> {
        self.snapshot
            .documents
            .iter()
            .skip(offset)
            .take(limit)
            .map(|doc| Value::Object(doc.to_json_map()))
            .collect()
    }

    pub fn number_of_documents(&self) -> usize {
        self.snapshot.documents.len()
    }
}
