use std::collections::BTreeMap;
use roaring::RoaringBitmap;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::index::filterable::FilterableIndex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetDistribution {
    pub distribution: BTreeMap<String, BTreeMap<String, u64>>,
    /// Whether the engine reports the counts as exhaustive.
    pub exhaustive: bool,
}

/// Counts facet values over a candidate set, within configured bounds.
pub struct FacetAggregator<'a> {
    index: &'a FilterableIndex,
    scan_budget: usize,
    max_values_per_facet: usize,
    strict_exhaustiveness: bool,
}

impl<'a> FacetAggregator<'a> {
    pub fn new(index: &'a FilterableIndex, config: &Config) -> Self {
        FacetAggregator {
            index,
            scan_budget: config.facet_scan_budget,
            max_values_per_facet: config.max_values_per_facet,
            strict_exhaustiveness: config.strict_facet_exhaustiveness,
        }
    }

    /// Expand `*` and check every requested field is filterable.
    pub fn resolve_fields(&self, requested: &[String]) -> Result<Vec<String>> {
        if requested.iter().any(|f| f == "*") {
            return Ok(self.index.attributes().iter().cloned().collect());
        }

        let mut fields = Vec::with_capacity(requested.len());
        for field in requested {
            if !self.index.is_filterable(field) {
                let available: Vec<&str> = self.index.attributes().iter().map(String::as_str).collect();
                return Err(Error::new(
                    ErrorKind::InvalidFacetsDistribution,
                    format!("attribute `{}` is not filterable, facets can only be computed on: [{}]",
                            field, available.join(", ")),
                ));
            }
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        Ok(fields)
    }

    pub fn aggregate(&self, candidates: &RoaringBitmap, fields: &[String]) -> FacetDistribution {
        let mut truncated = false;

        let scanned;
        let candidates = if candidates.len() > self.scan_budget as u64 {
            truncated = true;
            scanned = candidates.iter().take(self.scan_budget).collect::<RoaringBitmap>();
            tracing::debug!(candidates = candidates.len(), budget = self.scan_budget, "facet scan budget reached");
            &scanned
        } else {
            candidates
        };

        let mut distribution = BTreeMap::new();
        for field in fields {
            let mut counts: Vec<(&str, u64)> = self.index
                .facet_values(field)
                .map(|values| {
                    values.iter()
                        .map(|(value, docs)| (value.as_str(), docs.intersection_len(candidates)))
                        .filter(|(_, count)| *count > 0)
                        .collect()
                })
                .unwrap_or_default();

            if counts.len() > self.max_values_per_facet {
                truncated = true;
                counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                counts.truncate(self.max_values_per_facet);
                tracing::debug!(field = field.as_str(), cap = self.max_values_per_facet, "facet values capped");
            }

            let values = counts.into_iter().map(|(v, c)| (v.to_string(), c)).collect();
            distribution.insert(field.clone(), values);
        }

        FacetDistribution {
            distribution,
            exhaustive: self.strict_exhaustiveness && !truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Document, FieldValue};
    use crate::storage::document_store::DocumentStore;
    use serde_json::json;

    fn setup(genres: &[&str]) -> (DocumentStore, FilterableIndex) {
        let mut store = DocumentStore::new();
        for (i, genre) in genres.iter().enumerate() {
            let id = i.to_string();
            let mut doc = Document::new(store.assign_id(&id), id);
            doc.add_field("genre".to_string(), FieldValue::from_json(json!(genre)));
            store.insert(doc);
        }
        let mut index = FilterableIndex::new();
        index.configure(["genre".to_string()].into_iter().collect(), &store);
        (store, index)
    }

    fn genres() -> Vec<String> {
        vec!["genre".to_string()]
    }

    #[test]
    fn test_counts_only_candidates() {
        let (_, index) = setup(&["romance", "adventure", "adventure", "fantasy"]);
        let aggregator = FacetAggregator::new(&index, &Config::default());

        let candidates: RoaringBitmap = [1, 3].into_iter().collect();
        let facets = aggregator.aggregate(&candidates, &genres());

        assert_eq!(facets.distribution["genre"], BTreeMap::from([("adventure".to_string(), 1), ("fantasy".to_string(), 1)]));
        assert!(!facets.exhaustive);
    }

    #[test]
    fn test_strict_mode_reports_exhaustive_counts() {
        let (store, index) = setup(&["romance", "adventure"]);
        let config = Config { strict_facet_exhaustiveness: true, ..Config::default() };
        let facets = FacetAggregator::new(&index, &config).aggregate(store.all_ids(), &genres());
        assert!(facets.exhaustive);
    }

    #[test]
    fn test_bounds_make_counts_non_exhaustive() {
        let (store, index) = setup(&["a", "b", "c", "a"]);
        let config = Config { strict_facet_exhaustiveness: true, max_values_per_facet: 1, ..Config::default() };
        let facets = FacetAggregator::new(&index, &config).aggregate(store.all_ids(), &genres());
        assert_eq!(facets.distribution["genre"], BTreeMap::from([("a".to_string(), 2)]));
        assert!(!facets.exhaustive);

        let config = Config { strict_facet_exhaustiveness: true, facet_scan_budget: 2, ..Config::default() };
        let facets = FacetAggregator::new(&index, &config).aggregate(store.all_ids(), &genres());
        assert!(!facets.exhaustive);
    }

    #[test]
    fn test_resolve_fields() {
        let (_, index) = setup(&["a"]);
        let aggregator = FacetAggregator::new(&index, &Config::default());

        assert_eq!(aggregator.resolve_fields(&["*".to_string()]).unwrap(), genres());
        let err = aggregator.resolve_fields(&["title".to_string()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFacetsDistribution);
    }
}
