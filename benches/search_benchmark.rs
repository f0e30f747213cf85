use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facetdex::core::config::Config;
use facetdex::core::index::Index;
use facetdex::query::types::SearchQuery;
use rand::Rng;
use serde_json::{json, Value};

const WORDS: [&str; 12] = [
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog",
    "prince", "wonderland", "galaxy", "hobbit",
];
const GENRES: [&str; 5] = ["adventure", "fantasy", "romance", "science", "poetry"];

/// Helper to create random documents
fn create_documents(start: u64, count: usize, words_per_doc: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    (0..count as u64)
        .map(|i| {
            let overview: String = (0..words_per_doc)
                .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ");
            json!({
                "id": start + i,
                "title": format!("Book {}", start + i),
                "overview": overview,
                "genre": GENRES[rng.gen_range(0..GENRES.len())],
            })
        })
        .collect()
}

fn build_index(documents: usize, cache: bool) -> Index {
    let config = Config {
        query_cache_size: if cache { 256 } else { 0 },
        ..Config::default()
    };
    let index = Index::new("bench", config);
    index.add_documents(create_documents(0, documents, 50)).unwrap();
    index.update_filterable_attributes(&["genre"]).unwrap();
    index
}

/// Benchmark batch ingestion
fn bench_add_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_documents");
    group.sample_size(20);

    for batch_size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &batch_size, |b, &batch_size| {
            let index = Index::new("bench", Config::default());
            let mut next_id = 0u64;
            b.iter(|| {
                let docs = create_documents(next_id, batch_size, 50);
                next_id += batch_size as u64;
                index.add_documents(docs).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark ranked, typo-tolerant and placeholder searches
fn bench_search(c: &mut Criterion) {
    let index = build_index(5_000, false);
    let mut group = c.benchmark_group("search");

    let queries = [
        ("single_word", SearchQuery::new("prince")),
        ("multi_word", SearchQuery::new("quick brown fox")),
        ("typo", SearchQuery::new("wondreland")),
        ("placeholder_filter", SearchQuery::placeholder().with_filter(json!("genre = fantasy"))),
        ("facets", SearchQuery::new("galaxy").with_facets_distribution(&["genre"])),
        (
            "crop_highlight",
            SearchQuery::new("hobbit")
                .with_attributes_to_crop(&["overview"], Some(5))
                .with_attributes_to_highlight(&["*"]),
        ),
    ];

    for (name, query) in queries.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| black_box(index.search(query).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark repeated identical requests served from the query cache
fn bench_cached_search(c: &mut Criterion) {
    let index = build_index(5_000, true);
    let query = SearchQuery::new("quick brown fox").with_facets_distribution(&["genre"]);

    c.bench_function("cached_search", |b| {
        b.iter(|| black_box(index.search(&query).unwrap()));
    });
}

criterion_group!(benches, bench_add_documents, bench_search, bench_cached_search);
criterion_main!(benches);
