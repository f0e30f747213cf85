use std::collections::HashMap;
use std::sync::Arc;
use crate::analysis::token::Token;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::fields::FieldId;
use crate::index::posting::{Posting, PostingList};
use crate::search::prefix::PrefixIndex;

/// Normalized term as stored in the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term(String);

impl Term {
    pub fn new(text: &str) -> Self {
        Term(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Terms and field lengths of one document, so removal touches exactly the
/// postings the document produced.
#[derive(Debug, Clone, Default)]
struct ForwardEntry {
    terms: Vec<Term>,
    field_lengths: Vec<(FieldId, u32)>,
}

/// Inverted index structure.
///
/// Cloning is cheap: posting lists sit behind `Arc` and are copied on write,
/// so a draft built from a published snapshot only duplicates the lists a
/// batch touches.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    pub postings: HashMap<Term, Arc<PostingList>>,
    forward: HashMap<DocId, ForwardEntry>,
    pub doc_count: usize,
    pub total_tokens: u64,
    pub field_count: u64,
    prefix_index: Arc<PrefixIndex>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the analyzed fields of `doc_id`, replacing whatever the
    /// document contributed before.
    pub fn index_document(&mut self, doc_id: DocId, fields: &[(FieldId, Vec<Token>)]) {
        self.remove_document(doc_id);

        let mut entry = ForwardEntry::default();
        for (field_id, tokens) in fields {
            if tokens.is_empty() {
                continue;
            }
            let field_length = tokens.len() as u32;

            // Group tokens by term
            let mut term_positions: HashMap<&str, Vec<u32>> = HashMap::new();
            for token in tokens {
                term_positions.entry(token.text.as_str())
                    .or_default()
                    .push(token.position);
            }

            for (text, positions) in term_positions {
                let term = Term::new(text);
                let list = self.postings.entry(term.clone()).or_default();
                Arc::make_mut(list).add_posting(Posting {
                    doc_id,
                    field_id: *field_id,
                    positions,
                    field_length,
                });
                if !entry.terms.contains(&term) {
                    entry.terms.push(term);
                }
            }

            entry.field_lengths.push((*field_id, field_length));
            self.total_tokens += field_length as u64;
            self.field_count += 1;
        }

        self.doc_count += 1;
        self.forward.insert(doc_id, entry);
    }

    pub fn remove_document(&mut self, doc_id: DocId) -> bool {
        let Some(entry) = self.forward.remove(&doc_id) else {
            return false;
        };

        for term in entry.terms {
            if let Some(list) = self.postings.get_mut(&term) {
                let list = Arc::make_mut(list);
                list.remove_document(doc_id);
                if list.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
        for (_, length) in entry.field_lengths {
            self.total_tokens -= length as u64;
            self.field_count -= 1;
        }
        self.doc_count -= 1;
        true
    }

    pub fn clear(&mut self) {
        *self = InvertedIndex::default();
    }

    pub fn lookup(&self, term: &Term) -> Option<&PostingList> {
        self.postings.get(term).map(|list| list.as_ref())
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn avg_field_length(&self) -> f32 {
        if self.field_count == 0 {
            0.0
        } else {
            self.total_tokens as f32 / self.field_count as f32
        }
    }

    /// Rebuild the FST over the current dictionary. Called once per batch.
    pub fn rebuild_prefix_index(&mut self) -> Result<()> {
        let terms_with_freq = self.postings.iter()
            .map(|(term, list)| (term.as_str(), list.doc_freq()));

        let mut prefix_index = PrefixIndex::new();
        prefix_index.build(terms_with_freq)?;
        self.prefix_index = Arc::new(prefix_index);
        Ok(())
    }

    pub fn prefix_index(&self) -> &PrefixIndex {
        &self.prefix_index
    }
}
