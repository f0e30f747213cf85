#![allow(dead_code)]

use facetdex::core::config::Config;
use facetdex::core::index::Index;
use serde_json::{json, Value};

pub const DEFAULT_SEARCH_RESPONSE_KEYS: [&str; 7] =
    ["hits", "offset", "limit", "nbHits", "exhaustiveNbHits", "processingTimeMs", "query"];

pub fn books() -> Vec<Value> {
    vec![
        json!({"objectId": 123,  "title": "Pride and Prejudice",                    "genre": "romance"}),
        json!({"objectId": 456,  "title": "Le Petit Prince",                        "genre": "adventure"}),
        json!({"objectId": 1,    "title": "Alice In Wonderland",                    "genre": "adventure"}),
        json!({"objectId": 2,    "title": "Le Rouge et le Noir",                    "genre": "romance"}),
        json!({"objectId": 1344, "title": "The Hobbit",                             "genre": "adventure"}),
        json!({"objectId": 4,    "title": "Harry Potter and the Half-Blood Prince", "genre": "fantasy"}),
        json!({"objectId": 42,   "title": "The Hitchhiker's Guide to the Galaxy"}),
    ]
}

pub fn books_index_with(config: Config) -> Index {
    let index = Index::new("books", config);
    index.add_documents(books()).unwrap();
    index.update_filterable_attributes(&["genre"]).unwrap();
    index
}

pub fn books_index() -> Index {
    books_index_with(Config::default())
}

pub fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

pub fn sorted(keys: &[&str]) -> Vec<String> {
    let mut keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    keys.sort();
    keys
}
