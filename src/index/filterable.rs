use std::collections::{BTreeMap, BTreeSet, HashMap};
use roaring::RoaringBitmap;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Document;
use crate::query::ast::{FilterExpr, FilterOperator};
use crate::storage::document_store::DocumentStore;

/// Per-attribute value -> document bitmaps for the declared filterable
/// attributes. Backs both filtering and facet distribution.
#[derive(Debug, Clone, Default)]
pub struct FilterableIndex {
    attributes: BTreeSet<String>,
    values: HashMap<String, BTreeMap<String, RoaringBitmap>>,
}

impl FilterableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the declared attribute set and rebuild from the store.
    pub fn configure(&mut self, attributes: BTreeSet<String>, store: &DocumentStore) {
        self.attributes = attributes;
        self.values.clear();
        for doc in store.iter() {
            self.index_document(doc);
        }
        tracing::debug!(attributes = ?self.attributes, documents = store.len(), "filterable index rebuilt");
    }

    pub fn index_document(&mut self, doc: &Document) {
        for (name, value) in &doc.fields {
            if !self.attributes.contains(name) {
                continue;
            }
            if let Some(text) = value.as_text() {
                self.values
                    .entry(name.clone())
                    .or_default()
                    .entry(text.into_owned())
                    .or_default()
                    .insert(doc.id.0);
            }
        }
    }

    /// Remove `doc` using the values it was indexed with.
    pub fn remove_document(&mut self, doc: &Document) {
        for (name, value) in &doc.fields {
            let (Some(field_values), Some(text)) = (self.values.get_mut(name), value.as_text()) else {
                continue;
            };
            if let Some(bitmap) = field_values.get_mut(text.as_ref()) {
                bitmap.remove(doc.id.0);
                if bitmap.is_empty() {
                    field_values.remove(text.as_ref());
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn attributes(&self) -> &BTreeSet<String> {
        &self.attributes
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        self.attributes.contains(field)
    }

    /// Value -> documents for one attribute, in value order.
    pub fn facet_values(&self, field: &str) -> Option<&BTreeMap<String, RoaringBitmap>> {
        self.values.get(field)
    }

    /// Reject expressions referencing undeclared attributes.
    pub fn validate(&self, expr: &FilterExpr) -> Result<()> {
        for field in expr.fields() {
            if !self.is_filterable(field) {
                let available: Vec<&str> = self.attributes.iter().map(String::as_str).collect();
                return Err(Error::new(
                    ErrorKind::InvalidFilterAttribute,
                    format!("attribute `{}` is not filterable, available filterable attributes are: [{}]",
                            field, available.join(", ")),
                ));
            }
        }
        Ok(())
    }

    /// Documents of `universe` satisfying `expr`. Always a subset of `universe`.
    pub fn evaluate(&self, expr: &FilterExpr, universe: &RoaringBitmap) -> Result<RoaringBitmap> {
        match expr {
            FilterExpr::Condition(condition) => {
                self.validate(expr)?;
                let matching = self.values
                    .get(&condition.field)
                    .and_then(|values| values.get(&condition.value))
                    .map(|bitmap| bitmap & universe)
                    .unwrap_or_default();
                Ok(match condition.operator {
                    FilterOperator::Equal => matching,
                    FilterOperator::NotEqual => universe - matching,
                })
            }
            FilterExpr::And(exprs) => {
                let mut result = universe.clone();
                for expr in exprs {
                    result = self.evaluate(expr, &result)?;
                }
                Ok(result)
            }
            FilterExpr::Or(exprs) => {
                let mut result = RoaringBitmap::new();
                for expr in exprs {
                    result |= self.evaluate(expr, universe)?;
                }
                Ok(result)
            }
            FilterExpr::Not(expr) => Ok(universe - self.evaluate(expr, universe)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FieldValue;
    use crate::query::parser::FilterParser;
    use serde_json::json;

    fn store() -> DocumentStore {
        let mut store = DocumentStore::new();
        for (id, genre) in [("123", Some("romance")), ("456", Some("adventure")), ("1", Some("adventure")),
                            ("4", Some("fantasy")), ("42", None)] {
            let mut doc = Document::new(store.assign_id(id), id.to_string());
            doc.add_field("objectId".to_string(), FieldValue::from_json(json!(id.parse::<u64>().unwrap())));
            if let Some(genre) = genre {
                doc.add_field("genre".to_string(), FieldValue::from_json(json!(genre)));
            }
            store.insert(doc);
        }
        store
    }

    fn filterable(store: &DocumentStore) -> FilterableIndex {
        let mut index = FilterableIndex::new();
        index.configure(["genre".to_string(), "objectId".to_string()].into_iter().collect(), store);
        index
    }

    fn eval(index: &FilterableIndex, store: &DocumentStore, filter: serde_json::Value) -> Vec<u32> {
        let expr = FilterParser::parse_value(&filter).unwrap().unwrap();
        index.evaluate(&expr, store.all_ids()).unwrap().iter().collect()
    }

    #[test]
    fn test_equality_and_boolean_operators() {
        let store = store();
        let index = filterable(&store);

        assert_eq!(eval(&index, &store, json!("genre = adventure")), vec![1, 2]);
        assert_eq!(eval(&index, &store, json!("genre != adventure")), vec![0, 3, 4]);
        assert_eq!(eval(&index, &store, json!("genre = adventure OR genre = fantasy")), vec![1, 2, 3]);
        assert_eq!(eval(&index, &store, json!(["genre = adventure", "objectId = 1"])), vec![2]);
        assert_eq!(eval(&index, &store, json!([["genre = romance"], ["genre = fantasy"]])), vec![0, 3]);
        assert_eq!(
            eval(&index, &store, json!([["genre = adventure", "objectId = 1"], ["genre = fantasy"]])),
            vec![2, 3]
        );
        assert_eq!(eval(&index, &store, json!("NOT genre = adventure")), vec![0, 3, 4]);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let store = store();
        let index = filterable(&store);
        assert!(eval(&index, &store, json!("genre = Adventure")).is_empty());
    }

    #[test]
    fn test_undeclared_attribute_is_rejected() {
        let store = store();
        let index = filterable(&store);
        let expr = FilterParser::parse_str("title = x").unwrap().unwrap();

        let err = index.validate(&expr).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterAttribute);
        assert_eq!(index.evaluate(&expr, store.all_ids()).unwrap_err().kind, ErrorKind::InvalidFilterAttribute);
    }

    #[test]
    fn test_remove_document_drops_empty_values() {
        let store = store();
        let mut index = filterable(&store);
        let fantasy = store.get_by_external("4").unwrap().clone();

        index.remove_document(&fantasy);
        assert!(!index.facet_values("genre").unwrap().contains_key("fantasy"));
    }
}
