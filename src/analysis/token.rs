use serde::{Serialize, Deserialize};

/// Token representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,      // Normalized token text
    pub position: u32,     // Word position inside the field
    pub offset: usize,     // Byte offset in the original text
    pub length: usize,     // Byte length in the original text
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Word,
    Number,
}

impl Token {
    pub fn new(text: String, position: u32, offset: usize) -> Self {
        let length = text.len();
        let token_type = if text.chars().all(|c| c.is_ascii_digit()) {
            TokenType::Number
        } else {
            TokenType::Word
        };
        Token {
            text,
            position,
            offset,
            length,
            token_type,
        }
    }

    /// Byte range of the token in the original text.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}
