//! Indexes a handful of books and runs a few searches.
//!
//! `RUST_LOG=facetdex=debug cargo run --example books`

use facetdex::core::config::Config;
use facetdex::core::error::Result;
use facetdex::core::index::Index;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("facetdex=info")))
        .init();

    let config = Config::load()?;
    let index = Index::new("books", config);

    let record = index.add_documents(vec![
        json!({"objectId": 123,  "title": "Pride and Prejudice",                    "genre": "romance"}),
        json!({"objectId": 456,  "title": "Le Petit Prince",                        "genre": "adventure"}),
        json!({"objectId": 1,    "title": "Alice In Wonderland",                    "genre": "adventure"}),
        json!({"objectId": 2,    "title": "Le Rouge et le Noir",                    "genre": "romance"}),
        json!({"objectId": 1344, "title": "The Hobbit",                             "genre": "adventure"}),
        json!({"objectId": 4,    "title": "Harry Potter and the Half-Blood Prince", "genre": "fantasy"}),
        json!({"objectId": 42,   "title": "The Hitchhiker's Guide to the Galaxy"}),
    ])?;
    println!("update {}: {:?}", record.update_id.0, record.status);

    index.update_filterable_attributes(&["genre"])?;

    let requests = [
        json!({"q": "prince", "attributesToCrop": ["title"], "cropLength": 2,
               "filter": "genre = adventure", "attributesToHighlight": ["title"]}),
        json!({"q": "prinec", "facetsDistribution": ["genre"], "limit": 1}),
        json!({"q": "", "filter": [["genre = romance"], ["genre = fantasy"]], "attributesToRetrieve": ["title"]}),
    ];

    for request in requests {
        println!("> {}", request);
        match index.search_json(request) {
            Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
            Err(err) => println!("error [{}]: {}", err.code(), err),
        }
    }

    println!("{}", serde_json::to_string_pretty(&index.stats())?);
    Ok(())
}
