use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use roaring::RoaringBitmap;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;
use crate::index::fields::FieldId;
use crate::mvcc::controller::Snapshot;
use crate::query::parser::FilterParser;
use crate::query::planner::{QueryPlan, QueryPlanner};
use crate::query::types::SearchQuery;
use crate::scoring::ranking::{pair_proximity, RankingScore};
use crate::scoring::scorer::{BM25Scorer, CollectionStats, Scorer};
use crate::search::facets::FacetAggregator;
use crate::search::formatter::Formatter;
use crate::search::results::{ScoredDocument, SearchResponse, TopKCollector};

/// Postings gathered or candidates ranked between two deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// How one query word matched one document.
#[derive(Debug, Clone)]
struct WordMatch {
    typos: u8,
    exact: bool,
    positions: Vec<(FieldId, u32)>,
    bm25: f32,
}

/// Stateless search over a snapshot.
pub struct QueryExecutor {
    pub planner: QueryPlanner,
    pub analyzer: Arc<Analyzer>,
    pub scorer: Box<dyn Scorer>,
    pub config: Config,
}

impl QueryExecutor {
    pub fn new(analyzer: Arc<Analyzer>, config: Config) -> Self {
        QueryExecutor {
            planner: QueryPlanner::new(&config),
            analyzer,
            scorer: Box::new(BM25Scorer::default()),
            config,
        }
    }

    pub fn execute(&self, snapshot: &Snapshot, query: &SearchQuery) -> Result<SearchResponse> {
        let deadline = (self.config.search_timeout_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.config.search_timeout_ms));
        self.execute_with_deadline(snapshot, query, deadline)
    }

    pub fn execute_with_deadline(
        &self,
        snapshot: &Snapshot,
        query: &SearchQuery,
        deadline: Option<Instant>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();

        // Validate everything before touching the index
        let filter = match &query.filter {
            Some(value) => FilterParser::parse_value(value)?,
            None => None,
        };
        if let Some(expr) = &filter {
            snapshot.filterable.validate(expr)?;
        }
        let aggregator = FacetAggregator::new(&snapshot.filterable, &self.config);
        let facet_fields = query.facets_distribution
            .as_deref()
            .map(|fields| aggregator.resolve_fields(fields))
            .transpose()?;

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(self.config.default_limit);

        let universe = snapshot.documents.all_ids();
        let allowed = match &filter {
            Some(expr) => Some(snapshot.filterable.evaluate(expr, universe)?),
            None => None,
        };

        let plan = self.planner.plan(&self.analyzer, query.query_text(), &snapshot.index);
        let (candidates, page) = if plan.is_placeholder() {
            let candidates = allowed.unwrap_or_else(|| universe.clone());
            check_deadline(deadline)?;
            let page: Vec<DocId> = candidates.iter().skip(offset).take(limit).map(DocId).collect();
            (candidates, page)
        } else {
            self.rank(snapshot, &plan, allowed.as_ref(), offset, limit, deadline)?
        };

        check_deadline(deadline)?;
        let formatter = Formatter::new(&self.analyzer, &plan, query, &self.config);
        let hits: Vec<_> = page
            .iter()
            .filter_map(|id| snapshot.documents.get(*id))
            .map(|doc| formatter.format(doc))
            .collect();

        check_deadline(deadline)?;
        let facets = facet_fields.map(|fields| aggregator.aggregate(&candidates, &fields));
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            query = query.query_text(),
            nb_hits = candidates.len(),
            version = snapshot.version,
            processing_time_ms,
            "search executed"
        );

        Ok(SearchResponse {
            hits,
            offset,
            limit,
            nb_hits: candidates.len() as usize,
            exhaustive_nb_hits: true,
            processing_time_ms,
            query: query.query_text().to_string(),
            exhaustive_facets_count: facets.as_ref().map(|f| f.exhaustive),
            facets_distribution: facets.map(|f| f.distribution),
        })
    }

    /// Candidates matching at least one query word (restricted to `allowed`)
    /// and the ranked page `offset..offset + limit`.
    fn rank(
        &self,
        snapshot: &Snapshot,
        plan: &QueryPlan,
        allowed: Option<&RoaringBitmap>,
        offset: usize,
        limit: usize,
        deadline: Option<Instant>,
    ) -> Result<(RoaringBitmap, Vec<DocId>)> {
        let stats = CollectionStats {
            total_docs: snapshot.index.doc_count,
            avg_field_length: snapshot.index.avg_field_length(),
        };
        let word_count = plan.words.len();

        let mut matches: HashMap<DocId, Vec<Option<WordMatch>>> = HashMap::new();
        for (w, derived) in plan.derivations.iter().enumerate() {
            for term in derived {
                check_deadline(deadline)?;
                let Some(list) = snapshot.index.lookup(&term.term) else {
                    continue;
                };
                let doc_freq = list.doc_freq();

                for (i, posting) in list.postings.iter().enumerate() {
                    if i > 0 && i % DEADLINE_CHECK_INTERVAL == 0 {
                        check_deadline(deadline)?;
                    }
                    if allowed.is_some_and(|docs| !docs.contains(posting.doc_id.0)) {
                        continue;
                    }
                    let bm25 = self.scorer.score(posting, doc_freq, &stats) / (1.0 + term.typos as f32);
                    let words = matches.entry(posting.doc_id).or_insert_with(|| vec![None; word_count]);
                    let entry = words[w].get_or_insert_with(|| WordMatch {
                        typos: term.typos,
                        exact: false,
                        positions: Vec::new(),
                        bm25: 0.0,
                    });
                    entry.typos = entry.typos.min(term.typos);
                    entry.exact |= term.exact;
                    entry.positions.extend(posting.positions.iter().map(|p| (posting.field_id, *p)));
                    entry.bm25 += bm25;
                }
            }
        }

        let candidates: RoaringBitmap = matches.keys().map(|id| id.0).collect();
        let mut collector = TopKCollector::new(offset.saturating_add(limit));
        for (i, (doc_id, words)) in matches.iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                check_deadline(deadline)?;
            }
            collector.collect(ScoredDocument::new(ranking_score(*doc_id, words)));
        }

        let page = collector.get_results().into_iter().skip(offset).map(|d| d.doc_id).collect();
        Ok((candidates, page))
    }
}

fn ranking_score(doc_id: DocId, words: &[Option<WordMatch>]) -> RankingScore {
    let mut score = RankingScore::placeholder(doc_id);
    let mut first: Option<(FieldId, u32)> = None;

    for word in words.iter().flatten() {
        score.matched_words += 1;
        score.typos += word.typos as u32;
        score.exact_words += word.exact as u32;
        score.bm25 += word.bm25;
        if let Some(min) = word.positions.iter().min() {
            first = Some(first.map_or(*min, |f| f.min(*min)));
        }
    }

    for pair in words.windows(2) {
        if let [Some(left), Some(right)] = pair {
            score.proximity += pair_proximity(&left.positions, &right.positions);
        }
    }

    if let Some((field, position)) = first {
        score.attribute = field.0;
        score.word_position = position;
    }
    score
}

fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(Error::new(
            ErrorKind::Timeout,
            "search exceeded the configured timeout".to_string(),
        )),
        _ => Ok(()),
    }
}
