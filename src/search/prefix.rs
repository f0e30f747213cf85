use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};
use crate::core::error::Result;

/// FST over the term dictionary, used for prefix and typo-tolerant
/// candidate expansion. Values are document frequencies.
pub struct PrefixIndex {
    fst: Map<Vec<u8>>,
}

impl std::fmt::Debug for PrefixIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixIndex")
            .field("terms", &self.fst.len())
            .finish()
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        PrefixIndex::new()
    }
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self { fst: Map::default() }
    }

    /// Build FST from terms
    pub fn build<'a, I>(&mut self, terms: I) -> Result<()>
    where
        I: Iterator<Item = (&'a str, u32)>,
    {
        let mut sorted_terms: Vec<(&str, u32)> = terms.collect();

        // FST requires sorted input
        sorted_terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut builder = MapBuilder::memory();
        for (term, freq) in sorted_terms {
            builder.insert(term.as_bytes(), freq as u64)?;
        }

        self.fst = builder.into_map();
        Ok(())
    }

    /// Terms accepted by `automaton`, with their document frequency.
    pub fn search_automaton<A: Automaton>(&self, automaton: A) -> Vec<(String, u64)> {
        let mut results = Vec::new();
        let mut stream = self.fst.search(automaton).into_stream();

        while let Some((term_bytes, freq)) = stream.next() {
            if let Ok(term) = std::str::from_utf8(term_bytes) {
                results.push((term.to_string(), freq));
            }
        }

        results
    }

    pub fn len(&self) -> usize {
        self.fst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fst.is_empty()
    }
}
