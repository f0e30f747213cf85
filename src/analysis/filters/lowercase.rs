use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Case folding. Offsets and lengths keep pointing at the original text.
pub struct LowercaseFilter;

impl TokenFilter for LowercaseFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .map(|mut token| {
                token.text = token.text.to_lowercase();
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "lowercase"
    }
}
