use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use roaring::RoaringBitmap;
use crate::core::types::{DocId, Document};

/// Primary storage for documents of one index.
///
/// Maps external ids to dense internal `DocId`s. Re-ingesting an external id
/// reuses its `DocId`; ids of deleted documents are never handed out again.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: BTreeMap<DocId, Arc<Document>>,
    external_ids: HashMap<String, DocId>,
    next_id: u32,
    all_ids: RoaringBitmap,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Internal id for `external_id`, allocating a fresh one when unknown.
    pub fn assign_id(&mut self, external_id: &str) -> DocId {
        if let Some(id) = self.external_ids.get(external_id) {
            return *id;
        }
        let id = DocId(self.next_id);
        self.next_id += 1;
        self.external_ids.insert(external_id.to_string(), id);
        id
    }

    /// Store `doc`, returning the version it replaced.
    pub fn insert(&mut self, doc: Document) -> Option<Arc<Document>> {
        let id = doc.id;
        self.external_ids.insert(doc.external_id.clone(), id);
        self.all_ids.insert(id.0);
        self.documents.insert(id, Arc::new(doc))
    }

    pub fn remove(&mut self, external_id: &str) -> Option<Arc<Document>> {
        let id = self.external_ids.remove(external_id)?;
        self.all_ids.remove(id.0);
        self.documents.remove(&id)
    }

    /// Drop every document. The id counter keeps running.
    pub fn clear(&mut self) -> usize {
        let removed = self.documents.len();
        self.documents.clear();
        self.external_ids.clear();
        self.all_ids.clear();
        removed
    }

    pub fn get(&self, id: DocId) -> Option<&Arc<Document>> {
        self.documents.get(&id)
    }

    pub fn get_by_external(&self, external_id: &str) -> Option<&Arc<Document>> {
        self.resolve(external_id).and_then(|id| self.documents.get(&id))
    }

    pub fn resolve(&self, external_id: &str) -> Option<DocId> {
        self.external_ids.get(external_id).copied()
    }

    /// Documents in internal id (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    pub fn all_ids(&self) -> &RoaringBitmap {
        &self.all_ids
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents carrying each field name.
    pub fn field_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for doc in self.documents.values() {
            for name in doc.field_names() {
                *distribution.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        distribution
    }
}
