use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Deserialize};

/// Update identifier, returned to clients as `updateId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpdateId(pub u64);

/// Lifecycle: Enqueued -> Processing -> Processed | Failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "camelCase")]
pub enum UpdateStatus {
    Enqueued,
    Processing,
    Processed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum UpdateKind {
    DocumentsAddition { number: usize },
    DocumentsDeletion { number: usize },
    ClearAll,
    Settings,
}

/// Per-batch ingestion outcome. Problems with single documents never abort the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub indexed_documents: usize,
    pub rejected_documents: Vec<DocumentIssue>,
    pub field_warnings: Vec<DocumentIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentIssue {
    pub document: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub update_id: UpdateId,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    #[serde(flatten)]
    pub status: UpdateStatus,
    pub enqueued_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub report: Option<IngestReport>,
}

/// History of applied updates. Operations are applied synchronously, so a record
/// returned to a caller is already terminal.
pub struct UpdateStore {
    records: RwLock<BTreeMap<UpdateId, UpdateRecord>>,
    next_id: AtomicU64,
}

impl UpdateStore {
    pub fn new() -> Self {
        UpdateStore {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn register(&self, kind: UpdateKind) -> UpdateId {
        let update_id = UpdateId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = UpdateRecord {
            update_id,
            kind,
            status: UpdateStatus::Enqueued,
            enqueued_at: Utc::now(),
            processed_at: None,
            report: None,
        };
        self.records.write().insert(update_id, record);
        update_id
    }

    pub fn start(&self, id: UpdateId) {
        if let Some(record) = self.records.write().get_mut(&id) {
            record.status = UpdateStatus::Processing;
        }
    }

    pub fn finish(&self, id: UpdateId, status: UpdateStatus, report: Option<IngestReport>) -> Option<UpdateRecord> {
        let mut records = self.records.write();
        let record = records.get_mut(&id)?;
        record.status = status;
        record.processed_at = Some(Utc::now());
        record.report = report;

        match &record.status {
            UpdateStatus::Failed(reason) => tracing::warn!(update_id = id.0, %reason, "update failed"),
            _ => tracing::info!(update_id = id.0, kind = ?record.kind, "update processed"),
        }
        Some(record.clone())
    }

    pub fn get(&self, id: UpdateId) -> Option<UpdateRecord> {
        self.records.read().get(&id).cloned()
    }

    pub fn list(&self) -> Vec<UpdateRecord> {
        self.records.read().values().cloned().collect()
    }
}

impl Default for UpdateStore {
    fn default() -> Self {
        Self::new()
    }
}
