use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use crate::core::error::Result;
use crate::index::fields::FieldsMap;
use crate::index::filterable::FilterableIndex;
use crate::index::inverted::InvertedIndex;
use crate::storage::document_store::DocumentStore;

/// Immutable point-in-time view of an index. Readers hold an `Arc` to it
/// for the whole query.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub primary_key: Option<String>,
    pub fields: Arc<FieldsMap>,
    pub documents: Arc<DocumentStore>,
    pub index: Arc<InvertedIndex>,
    pub filterable: Arc<FilterableIndex>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            version: 0,
            timestamp: Utc::now(),
            primary_key: None,
            fields: Arc::new(FieldsMap::new()),
            documents: Arc::new(DocumentStore::new()),
            index: Arc::new(InvertedIndex::new()),
            filterable: Arc::new(FilterableIndex::new()),
        }
    }
}

/// Multi-Version Concurrency Control: many readers, one writer.
///
/// Writers are serialized by `writer_lock`, mutate a private draft and
/// publish it with a pointer swap. A failed write publishes nothing.
pub struct MVCCController {
    current: RwLock<Arc<Snapshot>>,
    current_version: AtomicU64,
    writer_lock: Mutex<()>,
}

impl MVCCController {
    pub fn new(initial: Snapshot) -> Self {
        let version = initial.version;
        MVCCController {
            current: RwLock::new(Arc::new(initial)),
            current_version: AtomicU64::new(version),
            writer_lock: Mutex::new(()),
        }
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current_version.load(Ordering::Acquire)
    }

    /// Run `f` on a draft of the current snapshot and publish the result.
    pub fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let _guard = self.writer_lock.lock();

        let mut draft = (*self.current_snapshot()).clone();
        let output = f(&mut draft)?;

        let version = self.current_version.load(Ordering::Acquire) + 1;
        draft.version = version;
        draft.timestamp = Utc::now();
        let documents = draft.documents.len();

        *self.current.write() = Arc::new(draft);
        self.current_version.store(version, Ordering::Release);

        tracing::info!(version, documents, "snapshot published");
        Ok(output)
    }
}

impl Default for MVCCController {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::types::{DocId, Document};

    fn add(draft: &mut Snapshot, id: &str) {
        let documents = Arc::make_mut(&mut draft.documents);
        let doc_id: DocId = documents.assign_id(id);
        documents.insert(Document::new(doc_id, id.to_string()));
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let mvcc = MVCCController::default();
        let before = mvcc.current_snapshot();

        mvcc.write(|draft| {
            add(draft, "1");
            Ok(())
        })
        .unwrap();

        assert_eq!(before.documents.len(), 0);
        assert_eq!(mvcc.current_snapshot().documents.len(), 1);
        assert_eq!(mvcc.version(), 1);
        assert_eq!(mvcc.current_snapshot().version, 1);
    }

    #[test]
    fn test_failed_write_publishes_nothing() {
        let mvcc = MVCCController::default();
        let result: Result<()> = mvcc.write(|draft| {
            add(draft, "1");
            Err(Error::new(ErrorKind::MissingPrimaryKey, "none".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(mvcc.version(), 0);
        assert!(mvcc.current_snapshot().documents.is_empty());
    }
}
