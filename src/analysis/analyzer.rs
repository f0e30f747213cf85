use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline: one tokenizer followed by a chain of filters.
/// This is the pluggable boundary for language-specific tokenization.
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Unicode word splitting + case folding.
    pub fn standard(max_token_length: usize) -> Self {
        Analyzer::new("standard".to_string(),
                      Box::new(StandardTokenizer::new(max_token_length)))
            .add_filter(Box::new(LowercaseFilter))
    }

    pub fn describe(&self) -> String {
        let filters: Vec<&str> = self.filters.iter().map(|f| f.name()).collect();
        format!("{}[{} | {}]", self.name, self.tokenizer.name(), filters.join(","))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::standard(StandardTokenizer::default().max_token_length)
    }
}
