use std::cmp::Ordering;
use crate::core::types::DocId;
use crate::index::fields::FieldId;

/// Proximity cost of two words in different fields or too far apart.
pub const MAX_PROXIMITY: u32 = 8;

/// Ranking key of a candidate. Compared lexicographically in field order;
/// `Greater` means more relevant.
#[derive(Debug, Clone, Copy)]
pub struct RankingScore {
    pub matched_words: u32,     // desc
    pub typos: u32,             // asc
    pub proximity: u32,         // asc
    pub attribute: u16,         // asc, field id of the best matching attribute
    pub word_position: u32,     // asc, first match position in that attribute
    pub exact_words: u32,       // desc
    pub bm25: f32,              // desc
    pub doc_id: DocId,          // asc, final tie-break
}

impl RankingScore {
    /// Score of a document in a placeholder search: only the id orders.
    pub fn placeholder(doc_id: DocId) -> Self {
        RankingScore {
            matched_words: 0,
            typos: 0,
            proximity: 0,
            attribute: 0,
            word_position: 0,
            exact_words: 0,
            bm25: 0.0,
            doc_id,
        }
    }
}

impl Ord for RankingScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.matched_words.cmp(&other.matched_words)
            .then_with(|| other.typos.cmp(&self.typos))
            .then_with(|| other.proximity.cmp(&self.proximity))
            .then_with(|| other.attribute.cmp(&self.attribute))
            .then_with(|| other.word_position.cmp(&self.word_position))
            .then_with(|| self.exact_words.cmp(&other.exact_words))
            .then_with(|| self.bm25.total_cmp(&other.bm25))
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for RankingScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankingScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankingScore {}

/// Cost between occurrences of consecutive query words. A reversed pair
/// costs one more than the same distance in order.
pub fn pair_proximity(left: &[(FieldId, u32)], right: &[(FieldId, u32)]) -> u32 {
    let mut best = MAX_PROXIMITY;
    for (lf, lp) in left {
        for (rf, rp) in right {
            if lf != rf {
                continue;
            }
            let cost = if rp > lp { rp - lp } else { lp - rp + 1 };
            best = best.min(cost);
            if best == 1 {
                return best;
            }
        }
    }
    best
}
