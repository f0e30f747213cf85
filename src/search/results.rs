use std::collections::{BTreeMap, BinaryHeap};
use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::core::types::DocId;
use crate::scoring::ranking::RankingScore;

/// Search response, serialized with the wire key names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<Value>,
    pub offset: usize,
    pub limit: usize,
    pub nb_hits: usize,
    pub exhaustive_nb_hits: bool,
    pub processing_time_ms: u64,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets_distribution: Option<BTreeMap<String, BTreeMap<String, u64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhaustive_facets_count: Option<bool>,
}

/// Document with its ranking key
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: RankingScore,
}

impl ScoredDocument {
    pub fn new(score: RankingScore) -> Self {
        ScoredDocument { doc_id: score.doc_id, score }
    }
}

// Implement ordering for heap
impl PartialEq for ScoredDocument {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for ScoredDocument {}

impl PartialOrd for ScoredDocument {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDocument {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the heap top is the least relevant document kept
        other.score.cmp(&self.score)
    }
}

/// Top-K collector for efficient result collection
pub struct TopKCollector {
    pub heap: BinaryHeap<ScoredDocument>,
    pub k: usize,
    pub total_collected: usize,  // Track total documents processed
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
            k,
            total_collected: 0,
        }
    }

    pub fn collect(&mut self, scored_doc: ScoredDocument) {
        self.total_collected += 1;
        if self.k == 0 {
            return;
        }

        if self.heap.len() < self.k {
            self.heap.push(scored_doc);
        } else if let Some(worst) = self.heap.peek() {
            if scored_doc.score > worst.score {
                self.heap.pop();
                self.heap.push(scored_doc);
            }
        }
    }

    /// Kept documents, most relevant first.
    pub fn get_results(self) -> Vec<ScoredDocument> {
        // Ascending by reversed order means descending by relevance
        self.heap.into_sorted_vec()
    }
}
