use fst::Automaton;
use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA, SINK_STATE};

/// Automaton for typo-tolerant matching against the term FST.
///
/// Transpositions count as one edit (`teh` -> `the`). A prefix automaton
/// accepts any term starting with something within `max_edit_distance` of
/// the query word.
pub struct FuzzyAutomaton {
    /// The query word to match
    term: String,

    /// Maximum allowed edit distance (0-2)
    max_edit_distance: u8,

    prefix: bool,

    dfa: DFA,
}

impl FuzzyAutomaton {
    pub fn build(builder: &LevenshteinAutomatonBuilder, term: &str, max_edit_distance: u8, prefix: bool) -> Self {
        let dfa = if prefix {
            builder.build_prefix_dfa(term)
        } else {
            builder.build_dfa(term)
        };

        Self {
            term: term.to_string(),
            max_edit_distance,
            prefix,
            dfa,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Edit distance of `candidate`, if it matches
    pub fn distance(&self, candidate: &str) -> Option<u8> {
        match self.dfa.eval(candidate) {
            Distance::Exact(d) if d <= self.max_edit_distance => Some(d),
            _ => None,
        }
    }
}

impl Automaton for FuzzyAutomaton {
    type State = u32;

    fn start(&self) -> u32 {
        self.dfa.initial_state()
    }

    fn is_match(&self, state: &u32) -> bool {
        matches!(self.dfa.distance(*state), Distance::Exact(d) if d <= self.max_edit_distance)
    }

    fn can_match(&self, state: &u32) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &u32, byte: u8) -> u32 {
        self.dfa.transition(*state, byte)
    }
}

/// One builder per allowed typo count; building the parametric tables is
/// the expensive part, so these live as long as the planner.
pub struct AutomatonBuilders {
    builders: Vec<LevenshteinAutomatonBuilder>,
}

impl AutomatonBuilders {
    pub const MAX_TYPOS: u8 = 2;

    pub fn new() -> Self {
        AutomatonBuilders {
            builders: (0..=Self::MAX_TYPOS)
                .map(|d| LevenshteinAutomatonBuilder::new(d, true))
                .collect(),
        }
    }

    pub fn automaton(&self, term: &str, max_typos: u8, prefix: bool) -> FuzzyAutomaton {
        let typos = max_typos.min(Self::MAX_TYPOS);
        FuzzyAutomaton::build(&self.builders[typos as usize], term, typos, prefix)
    }
}

impl Default for AutomatonBuilders {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of leading chars of `token` to highlight for `query`: the prefix
/// closest to `query`, preferring the longest on ties. Both sides are
/// expected normalized.
pub fn highlight_prefix_len(query: &str, token: &str) -> usize {
    if query == token {
        return token.chars().count();
    }

    let query: Vec<char> = query.chars().collect();
    let token: Vec<char> = token.chars().collect();
    let distances = prefix_distances(&query, &token);

    let mut best = 0;
    for (len, distance) in distances.iter().enumerate() {
        if *distance <= distances[best] {
            best = len;
        }
    }
    best
}

/// Distance from `a` to every prefix of `b` (index = prefix length).
fn prefix_distances(a: &[char], b: &[char]) -> Vec<usize> {
    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr_row[0] = i;

        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };

            curr_row[j] = std::cmp::min(
                std::cmp::min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost,  // substitution
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transposition_is_one_typo() {
        let builders = AutomatonBuilders::new();
        let automaton = builders.automaton("prinec", 1, false);
        assert_eq!(automaton.distance("prince"), Some(1));
        assert_eq!(automaton.distance("prinec"), Some(0));
        assert_eq!(automaton.distance("pride"), None);
    }

    #[test]
    fn test_prefix_automaton() {
        let builders = AutomatonBuilders::new();
        let automaton = builders.automaton("hob", 0, true);
        assert_eq!(automaton.distance("hobbit"), Some(0));
        assert_eq!(automaton.distance("harry"), None);
        assert!(automaton.is_prefix());
    }

    #[test]
    fn test_highlight_prefix_len() {
        assert_eq!(highlight_prefix_len("prinec", "prince"), 5);
        assert_eq!(highlight_prefix_len("prin", "prince"), 4);
        assert_eq!(highlight_prefix_len("prince", "prince"), 6);
        assert_eq!(highlight_prefix_len("hobit", "hobbit"), 6);
    }
}
