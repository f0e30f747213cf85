use crate::core::types::DocId;
use crate::index::fields::FieldId;

/// Occurrences of one term in one field of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub field_id: FieldId,
    pub positions: Vec<u32>,  // word positions inside the field
    pub field_length: u32,    // tokens in the field, for length normalization
}

impl Posting {
    pub fn term_freq(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Posting list for a term.
/// Note: sorted by (doc_id, field_id) so a document's postings are contiguous
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub postings: Vec<Posting>,
    doc_freq: u32,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_posting(&mut self, posting: Posting) {
        let key = (posting.doc_id, posting.field_id);
        match self.postings.binary_search_by_key(&key, |p| (p.doc_id, p.field_id)) {
            Ok(pos) => self.postings[pos] = posting,
            Err(pos) => {
                if !self.contains(posting.doc_id) {
                    self.doc_freq += 1;
                }
                self.postings.insert(pos, posting);
            }
        }
    }

    /// Remove every posting of `doc_id`. Returns true if any existed.
    pub fn remove_document(&mut self, doc_id: DocId) -> bool {
        let range = self.range_of(doc_id);
        if range.is_empty() {
            return false;
        }
        self.postings.drain(range);
        self.doc_freq -= 1;
        true
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        !self.range_of(doc_id).is_empty()
    }

    /// Number of distinct documents containing the term.
    pub fn doc_freq(&self) -> u32 {
        self.doc_freq
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    fn range_of(&self, doc_id: DocId) -> std::ops::Range<usize> {
        let start = self.postings.partition_point(|p| p.doc_id < doc_id);
        let end = self.postings.partition_point(|p| p.doc_id <= doc_id);
        start..end
    }
}
