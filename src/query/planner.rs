use std::collections::HashMap;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::index::inverted::{InvertedIndex, Term};
use crate::search::fuzzy::AutomatonBuilders;

/// Query words beyond this are ignored.
pub const MAX_QUERY_WORDS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryWord {
    pub text: String,
    pub index: usize,
    pub is_prefix: bool,
    pub max_typos: u8,
}

/// Dictionary term a query word expanded to.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTerm {
    pub term: Term,
    pub typos: u8,
    pub exact: bool,
}

/// Query words with the dictionary terms each one matches.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub words: Vec<QueryWord>,
    pub derivations: Vec<Vec<DerivedTerm>>,
    term_words: HashMap<String, usize>,
}

impl QueryPlan {
    pub fn is_placeholder(&self) -> bool {
        self.words.is_empty()
    }

    /// First query word a normalized token text was derived from.
    pub fn matching_word(&self, token: &str) -> Option<&QueryWord> {
        self.term_words.get(token).map(|i| &self.words[*i])
    }
}

/// Turns the `q` string into a `QueryPlan` against a given dictionary.
pub struct QueryPlanner {
    builders: AutomatonBuilders,
    config: Config,
}

impl QueryPlanner {
    pub fn new(config: &Config) -> Self {
        QueryPlanner {
            builders: AutomatonBuilders::new(),
            config: config.clone(),
        }
    }

    /// Analyze `q` into query words. The last word matches as a prefix unless
    /// the query ends with whitespace.
    pub fn words(&self, analyzer: &Analyzer, q: &str) -> Vec<QueryWord> {
        let tokens = analyzer.analyze(q);
        let count = tokens.len().min(MAX_QUERY_WORDS);
        let trailing_space = q.ends_with(char::is_whitespace);

        tokens
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(index, token)| QueryWord {
                max_typos: self.config.typos_for_word_len(token.text.len()),
                is_prefix: index + 1 == count && !trailing_space,
                text: token.text,
                index,
            })
            .collect()
    }

    pub fn plan(&self, analyzer: &Analyzer, q: &str, index: &InvertedIndex) -> QueryPlan {
        let words = self.words(analyzer, q);
        let mut derivations = Vec::with_capacity(words.len());
        let mut term_words = HashMap::new();

        for word in &words {
            let derived = self.derive(word, index);
            for d in &derived {
                term_words.entry(d.term.as_str().to_string()).or_insert(word.index);
            }
            derivations.push(derived);
        }

        tracing::debug!(
            query = q,
            words = words.len(),
            derived_terms = derivations.iter().map(Vec::len).sum::<usize>(),
            "query planned"
        );

        QueryPlan { words, derivations, term_words }
    }

    fn derive(&self, word: &QueryWord, index: &InvertedIndex) -> Vec<DerivedTerm> {
        // Exact lookups skip the FST
        if word.max_typos == 0 && !word.is_prefix {
            let term = Term::new(&word.text);
            return match index.lookup(&term) {
                Some(_) => vec![DerivedTerm { term, typos: 0, exact: true }],
                None => Vec::new(),
            };
        }

        let automaton = self.builders.automaton(&word.text, word.max_typos, word.is_prefix);
        index
            .prefix_index()
            .search_automaton(&automaton)
            .into_iter()
            .filter_map(|(text, _)| {
                let typos = automaton.distance(&text)?;
                Some(DerivedTerm {
                    exact: text == word.text,
                    term: Term::new(&text),
                    typos,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DocId;
    use crate::index::fields::FieldId;

    fn index(titles: &[&str]) -> InvertedIndex {
        let analyzer = Analyzer::default();
        let mut index = InvertedIndex::new();
        for (i, title) in titles.iter().enumerate() {
            index.index_document(DocId(i as u32), &[(FieldId(0), analyzer.analyze(title))]);
        }
        index.rebuild_prefix_index().unwrap();
        index
    }

    #[test]
    fn test_last_word_is_prefix() {
        let planner = QueryPlanner::new(&Config::default());
        let analyzer = Analyzer::default();

        let words = planner.words(&analyzer, "Le Petit");
        assert!(!words[0].is_prefix);
        assert!(words[1].is_prefix);

        let words = planner.words(&analyzer, "Le Petit ");
        assert!(!words[1].is_prefix);
    }

    #[test]
    fn test_typo_budget_by_length() {
        let planner = QueryPlanner::new(&Config::default());
        let words = planner.words(&Analyzer::default(), "the prinec hitchhikers");
        let budgets: Vec<u8> = words.iter().map(|w| w.max_typos).collect();
        assert_eq!(budgets, vec![0, 1, 2]);
    }

    #[test]
    fn test_typo_derivation() {
        let planner = QueryPlanner::new(&Config::default());
        let analyzer = Analyzer::default();
        let index = index(&["Le Petit Prince", "Pride and Prejudice"]);

        let plan = planner.plan(&analyzer, "prinec", &index);
        let derived: Vec<(&str, u8, bool)> = plan.derivations[0]
            .iter()
            .map(|d| (d.term.as_str(), d.typos, d.exact))
            .collect();
        assert_eq!(derived, vec![("prince", 1, false)]);
        assert_eq!(plan.matching_word("prince").map(|w| w.text.as_str()), Some("prinec"));
    }

    #[test]
    fn test_prefix_derivation() {
        let planner = QueryPlanner::new(&Config::default());
        let analyzer = Analyzer::default();
        let index = index(&["Pride and Prejudice", "Le Petit Prince"]);

        let plan = planner.plan(&analyzer, "pr", &index);
        let mut terms: Vec<&str> = plan.derivations[0].iter().map(|d| d.term.as_str()).collect();
        terms.sort();
        assert_eq!(terms, vec!["prejudice", "pride", "prince"]);
        assert!(plan.derivations[0].iter().all(|d| d.typos == 0 && !d.exact));
    }

    #[test]
    fn test_empty_query_is_placeholder() {
        let planner = QueryPlanner::new(&Config::default());
        let plan = planner.plan(&Analyzer::default(), "  ", &index(&["The Hobbit"]));
        assert!(plan.is_placeholder());
    }
}
