use std::collections::{HashMap, HashSet};
use std::ops::Range;
use serde_json::{Map, Value};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::types::Document;
use crate::query::planner::QueryPlan;
use crate::query::types::SearchQuery;
use crate::search::fuzzy::highlight_prefix_len;

pub const FORMATTED_KEY: &str = "_formatted";

/// Crop lengths from `attributesToCrop`, where an entry may carry its own
/// length as `field:N`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropSelection {
    all: Option<usize>,
    fields: HashMap<String, usize>,
}

impl CropSelection {
    pub fn parse(attributes: &[String], default_length: usize) -> Self {
        let mut selection = CropSelection::default();
        for attribute in attributes {
            let (name, length) = match attribute.rsplit_once(':') {
                Some((name, n)) => match n.parse::<usize>() {
                    Ok(n) => (name, n),
                    Err(_) => (attribute.as_str(), default_length),
                },
                None => (attribute.as_str(), default_length),
            };
            if name == "*" {
                selection.all = Some(length);
            } else {
                selection.fields.insert(name.to_string(), length);
            }
        }
        selection
    }

    pub fn length(&self, field: &str) -> Option<usize> {
        self.fields.get(field).copied().or(self.all)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct AttributeSet {
    all: bool,
    fields: HashSet<String>,
}

impl AttributeSet {
    fn parse(attributes: &[String]) -> Self {
        AttributeSet {
            all: attributes.iter().any(|a| a == "*"),
            fields: attributes.iter().cloned().collect(),
        }
    }

    fn contains(&self, field: &str) -> bool {
        self.all || self.fields.contains(field)
    }
}

/// Builds hit documents: projection, then `_formatted` with crop and
/// highlight applied to string fields.
pub struct Formatter<'a> {
    analyzer: &'a Analyzer,
    plan: &'a QueryPlan,
    retrieve: Option<AttributeSet>,
    crop: Option<CropSelection>,
    highlight: Option<AttributeSet>,
    crop_marker: String,
    pre_tag: String,
    post_tag: String,
}

impl<'a> Formatter<'a> {
    pub fn new(analyzer: &'a Analyzer, plan: &'a QueryPlan, query: &SearchQuery, config: &Config) -> Self {
        let crop_length = query.crop_length.unwrap_or(config.default_crop_length);
        Formatter {
            analyzer,
            plan,
            retrieve: query.attributes_to_retrieve.as_deref()
                .map(AttributeSet::parse)
                .filter(|set| !set.all),
            crop: query.attributes_to_crop.as_deref()
                .filter(|attrs| !attrs.is_empty())
                .map(|attrs| CropSelection::parse(attrs, crop_length)),
            highlight: query.attributes_to_highlight.as_deref()
                .filter(|attrs| !attrs.is_empty())
                .map(AttributeSet::parse),
            crop_marker: query.crop_marker.clone().unwrap_or_else(|| config.crop_marker.clone()),
            pre_tag: query.highlight_pre_tag.clone().unwrap_or_else(|| config.highlight_pre_tag.clone()),
            post_tag: query.highlight_post_tag.clone().unwrap_or_else(|| config.highlight_post_tag.clone()),
        }
    }

    pub fn format(&self, doc: &Document) -> Value {
        let mut hit = self.project(doc);

        if self.crop.is_some() || self.highlight.is_some() {
            let formatted: Map<String, Value> = hit
                .iter()
                .map(|(name, value)| (name.clone(), self.format_value(name, value)))
                .collect();
            hit.insert(FORMATTED_KEY.to_string(), Value::Object(formatted));
        }

        Value::Object(hit)
    }

    fn project(&self, doc: &Document) -> Map<String, Value> {
        doc.fields
            .iter()
            .filter(|(name, _)| self.retrieve.as_ref().is_none_or(|set| set.contains(name)))
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }

    fn format_value(&self, name: &str, value: &Value) -> Value {
        let crop_length = self.crop.as_ref().and_then(|crop| crop.length(name));
        let highlight = self.highlight.as_ref().is_some_and(|set| set.contains(name));

        match value {
            Value::String(text) if crop_length.is_some() || highlight => {
                Value::String(self.format_text(text, crop_length, highlight))
            }
            other => other.clone(),
        }
    }

    /// Crop `text` to `crop_length` words around the first match and wrap
    /// matches in the highlight tags. Spans are computed on `text` itself.
    pub fn format_text(&self, text: &str, crop_length: Option<usize>, highlight: bool) -> String {
        let tokens = self.analyzer.analyze(text);

        let matches: Vec<(usize, Range<usize>)> = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| {
                let word = self.plan.matching_word(&token.text)?;
                let chars = highlight_prefix_len(&word.text, &token.text);
                let original = &text[token.span()];
                let len = original.char_indices().nth(chars).map_or(original.len(), |(b, _)| b);
                (len > 0).then(|| (i, token.offset..token.offset + len))
            })
            .collect();

        let (window, cropped_start, cropped_end) = match crop_length {
            Some(0) => return String::new(),
            Some(len) if tokens.len() > len => {
                let first = matches.first().map_or(0, |(i, _)| *i);
                let before = (len - 1) / 2;
                let start = first.saturating_sub(before).min(tokens.len() - len);
                let end = start + len;

                let from = if start == 0 { 0 } else { tokens[start].offset };
                let to = if end == tokens.len() { text.len() } else { tokens[end - 1].span().end };
                (from..to, start > 0, end < tokens.len())
            }
            _ => (0..text.len(), false, false),
        };

        let mut out = String::with_capacity(window.len() + 16);
        if cropped_start {
            out.push_str(&self.crop_marker);
        }

        let mut cursor = window.start;
        if highlight {
            for (_, span) in &matches {
                if span.start < window.start || span.end > window.end {
                    continue;
                }
                out.push_str(&text[cursor..span.start]);
                out.push_str(&self.pre_tag);
                out.push_str(&text[span.clone()]);
                out.push_str(&self.post_tag);
                cursor = span.end;
            }
        }
        out.push_str(&text[cursor..window.end]);

        if cropped_end {
            out.push_str(&self.crop_marker);
        }
        out
    }
}
