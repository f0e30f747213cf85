mod common;

use std::sync::Arc;
use std::thread;
use common::books_index;
use facetdex::query::types::SearchQuery;
use serde_json::json;

#[test]
fn test_reader_snapshot_is_stable() {
    let index = books_index();
    let reader = index.snapshot_reader();
    let version = reader.version();

    index.delete_document("456").unwrap();
    index.add_documents(vec![json!({"objectId": 99, "title": "Dune"})]).unwrap();

    assert_eq!(reader.version(), version);
    assert_eq!(reader.number_of_documents(), 7);
    assert!(reader.get_document("456").is_ok());
    assert!(reader.get_document("99").is_err());

    assert_eq!(index.snapshot_reader().number_of_documents(), 7);
    assert!(index.snapshot_reader().version() > version);
}

#[test]
fn test_versions_increase_with_each_write() {
    let index = books_index();
    let mut last = index.stats().version;
    for i in 0..5 {
        index.add_documents(vec![json!({"objectId": 1000 + i, "title": "Extra"})]).unwrap();
        let version = index.stats().version;
        assert!(version > last);
        last = version;
    }
}

#[test]
fn test_concurrent_searches_during_writes() {
    let index = books_index();

    thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..20 {
                let doc = json!({"objectId": 2000 + i, "title": format!("The Sequel {}", i), "genre": "fantasy"});
                index.add_documents(vec![doc]).unwrap();
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let response = index
                        .search(&SearchQuery::new("the").with_facets_distribution(&["genre"]))
                        .unwrap();
                    // Each snapshot is complete: hits and facets agree
                    assert!(response.nb_hits >= 3);
                    let facets = response.facets_distribution.unwrap();
                    let fantasy = facets["genre"].get("fantasy").copied().unwrap_or(0);
                    assert_eq!(fantasy as usize + 2, response.nb_hits);
                }
            });
        }
    });

    assert_eq!(index.stats().number_of_documents, 27);
    assert_eq!(index.search(&SearchQuery::new("sequel")).unwrap().nb_hits, 20);
}

#[test]
fn test_index_is_shared_through_arc() {
    let index = Arc::new(books_index());

    let handles: Vec<_> = ["prince", "hobbit", "galaxy"]
        .into_iter()
        .map(|q| {
            let index = Arc::clone(&index);
            thread::spawn(move || index.search(&SearchQuery::new(q)).unwrap().nb_hits)
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![2, 1, 1]);
}
