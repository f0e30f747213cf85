use crate::index::posting::Posting;

/// Scorer trait
pub trait Scorer: Send + Sync {
    fn score(&self, posting: &Posting, doc_freq: u32, stats: &CollectionStats) -> f32;

    fn name(&self) -> &str;
}

/// Collection-wide statistics for scoring
#[derive(Debug, Clone, Copy)]
pub struct CollectionStats {
    pub total_docs: usize,
    pub avg_field_length: f32,  // average tokens per indexed field
}

/// BM25 Scorer
pub struct BM25Scorer {
    pub k1: f32,  // Term frequency saturation (default: 1.2)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl BM25Scorer {
    pub fn idf(doc_freq: u32, total_docs: usize) -> f32 {
        let n = total_docs as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, posting: &Posting, doc_freq: u32, stats: &CollectionStats) -> f32 {
        let tf = posting.term_freq() as f32;
        let field_len = posting.field_length as f32;
        let avg_len = if stats.avg_field_length > 0.0 { stats.avg_field_length } else { 1.0 };

        // BM25 formula
        let numerator = Self::idf(doc_freq, stats.total_docs) * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (field_len / avg_len));

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DocId;
    use crate::index::fields::FieldId;

    fn posting(positions: Vec<u32>, field_length: u32) -> Posting {
        Posting { doc_id: DocId(0), field_id: FieldId(0), positions, field_length }
    }

    #[test]
    fn test_rare_terms_score_higher() {
        let scorer = BM25Scorer::default();
        let stats = CollectionStats { total_docs: 7, avg_field_length: 4.0 };
        let p = posting(vec![0], 4);
        assert!(scorer.score(&p, 1, &stats) > scorer.score(&p, 5, &stats));
    }

    #[test]
    fn test_shorter_fields_score_higher() {
        let scorer = BM25Scorer::default();
        let stats = CollectionStats { total_docs: 7, avg_field_length: 4.0 };
        assert!(scorer.score(&posting(vec![0], 2), 2, &stats) > scorer.score(&posting(vec![0], 8), 2, &stats));
    }
}
