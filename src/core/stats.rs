use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::query::cache::CacheStats;

/// Index statistics for monitoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub number_of_documents: usize,
    pub field_distribution: BTreeMap<String, usize>,
    pub primary_key: Option<String>,
    pub filterable_attributes: Vec<String>,

    // Index internals
    pub version: u64,
    pub term_count: usize,
    pub avg_field_length: f32,
    pub last_update: DateTime<Utc>,

    pub cache_stats: Option<CacheStats>,
}
