pub mod core;
pub mod storage;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod search;
pub mod query;
pub mod mvcc;
pub mod writer;
pub mod reader;
pub mod parallel;

/*
┌────────────────────────────────────────────────────────────────────────────────────┐
│                              FACETDEX STRUCT ARCHITECTURE                            │
└────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── CORE LAYER ────────────────────────────────────┐
│  struct Index                                                                        │
│  │ uid: String                                                                       │
│  │ config: Config                     // defaults, typo/facet bounds, timeout        │
│  │ mvcc: MVCCController               // current Arc<Snapshot> + writer mutex        │
│  │ writer: IndexWriter                // draft mutations, single writer              │
│  │ executor: QueryExecutor            // stateless search over a snapshot            │
│  │ cache: Option<QueryCache>          // LRU keyed by (version, request)             │
│  │ updates: UpdateStore               // Enqueued → Processing → Processed | Failed  │
│                                                                                      │
│  struct Document { id: DocId(u32), external_id, fields: Vec<(String, FieldValue)> }  │
│  enum FieldValue { Text, Number, Boolean, Null, Raw(arrays, objects: not indexed) }  │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── SNAPSHOT ──────────────────────────────────────┐
│  struct Snapshot (immutable once published, shared by readers)                       │
│  │ version: u64, timestamp, primary_key                                              │
│  │ fields: Arc<FieldsMap>             // name ↔ FieldId, first appearance = rank     │
│  │ documents: Arc<DocumentStore>      // DocId → Arc<Document>, external id map      │
│  │ index: Arc<InvertedIndex>          // Term → Arc<PostingList>, forward index, FST │
│  │ filterable: Arc<FilterableIndex>   // field → value → RoaringBitmap               │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────────── WRITE PATH ──────────────────────────────────┐
│  Vec<Value> ─► prepare_batch (primary key, id validation, field warnings, dedup)     │
│            ─► ParallelIndexer::analyze_batch (rayon, Analyzer = tokenizer + filters) │
│            ─► InvertedIndex / FilterableIndex / DocumentStore on the draft           │
│            ─► rebuild PrefixIndex ─► publish (pointer swap, version + 1)             │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────────── READ PATH ───────────────────────────────────┐
│  SearchQuery ─► FilterParser (nom) + FilterableIndex::validate + facet fields        │
│             ─► QueryPlanner: words → DerivedTerms (exact | prefix | Levenshtein DFA) │
│             ─► candidates ∩ filter ─► RankingScore ─► TopKCollector ─► page          │
│             ─► Formatter (projection, crop, highlight) ─► FacetAggregator            │
│             ─► SearchResponse { hits, offset, limit, nbHits, ... }                   │
│                                                                                      │
│  RankingScore order: matched words ↓, typos ↑, proximity ↑, attribute ↑,             │
│                      word position ↑, exact words ↓, BM25 ↓, DocId ↑                 │
└──────────────────────────────────────────────────────────────────────────────────────┘
*/
