use regex::Regex;

use super::Tokenize;
use crate::errors::{Result, TaggerError};
use crate::token::Token;

/// Splits text on every match of a separator pattern
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    separator: Regex,
}

impl RegexTokenizer {
    pub fn new(pattern: &str) -> Result<Self> {
        let separator =
            Regex::new(pattern).map_err(|e| TaggerError::invalid_argument("pattern", e.to_string()))?;
        Ok(Self { separator })
    }
}

impl Tokenize for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut byte_pos = 0;
        let mut char_pos = 0;
        let mut push = |piece: &str, char_pos: &mut usize| {
            let len = piece.chars().count();
            if len > 0 {
                tokens.push(Token::new(piece, *char_pos, *char_pos + len));
            }
            *char_pos += len;
        };
        for m in self.separator.find_iter(text) {
            push(&text[byte_pos..m.start()], &mut char_pos);
            char_pos += m.as_str().chars().count();
            byte_pos = m.end();
        }
        push(&text[byte_pos..], &mut char_pos);
        tokens
    }
}
