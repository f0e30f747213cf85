use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::core::error::Result;

/// Search request. Unknown keys and malformed values are rejected with
/// `InvalidQuery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_to_crop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_to_highlight: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets_distribution: Option<Vec<String>>,
}

impl SearchQuery {
    pub fn new(q: &str) -> Self {
        SearchQuery {
            q: Some(q.to_string()),
            ..Default::default()
        }
    }

    /// Empty query: every document subject to the filter.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_attributes_to_retrieve(mut self, attributes: &[&str]) -> Self {
        self.attributes_to_retrieve = Some(to_strings(attributes));
        self
    }

    pub fn with_attributes_to_crop(mut self, attributes: &[&str], crop_length: Option<usize>) -> Self {
        self.attributes_to_crop = Some(to_strings(attributes));
        self.crop_length = crop_length;
        self
    }

    pub fn with_attributes_to_highlight(mut self, attributes: &[&str]) -> Self {
        self.attributes_to_highlight = Some(to_strings(attributes));
        self
    }

    pub fn with_facets_distribution(mut self, facets: &[&str]) -> Self {
        self.facets_distribution = Some(to_strings(facets));
        self
    }

    pub fn query_text(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    /// Stable key for result caching.
    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_camel_case_request() {
        let query = SearchQuery::from_json(json!({
            "q": "prince",
            "attributesToCrop": ["title"],
            "cropLength": 2,
            "filter": "genre = adventure",
            "attributesToHighlight": ["title"]
        }))
        .unwrap();

        assert_eq!(query.query_text(), "prince");
        assert_eq!(query.crop_length, Some(2));
        assert_eq!(query.filter, Some(json!("genre = adventure")));
        assert_eq!(query.attributes_to_highlight, Some(vec!["title".to_string()]));
    }

    #[test]
    fn test_bad_shapes_are_invalid_queries() {
        let err = SearchQuery::from_json(json!({"q": "a", "offset": -1})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);

        let err = SearchQuery::from_json(json!({"q": "a", "sortBy": "title"})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_null_q_is_placeholder() {
        let query = SearchQuery::from_json(json!({"q": null})).unwrap();
        assert_eq!(query.query_text(), "");
        assert_eq!(query, SearchQuery::placeholder());
    }

    #[test]
    fn test_cache_key_distinguishes_requests() {
        let a = SearchQuery::new("the").with_limit(2).cache_key().unwrap();
        let b = SearchQuery::new("the").with_limit(3).cache_key().unwrap();
        assert_ne!(a, b);
    }
}
