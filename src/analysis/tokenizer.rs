use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    /// Split `text` into words, keeping byte offsets into `text`.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Standard Unicode tokenizer: segments on UAX#29 word boundaries, then
/// splits each word on non-alphanumeric characters, so `Hitchhiker's` gives
/// `Hitchhiker` and `s`.
#[derive(Clone)]
pub struct StandardTokenizer {
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            max_token_length: 255,
        }
    }
}

impl StandardTokenizer {
    pub fn new(max_token_length: usize) -> Self {
        StandardTokenizer { max_token_length }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (offset, word) in text.unicode_word_indices() {
            for (start, piece) in alphanumeric_runs(word) {
                if piece.len() <= self.max_token_length {
                    tokens.push(Token::new(piece.to_string(), position, offset + start));
                    position += 1;
                }
            }
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}

/// Maximal runs of alphanumeric characters with their byte offset in `word`.
fn alphanumeric_runs(word: &str) -> Vec<(usize, &str)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, c) in word.char_indices() {
        match (c.is_alphanumeric(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, &word[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, &word[s..]));
    }
    runs
}
