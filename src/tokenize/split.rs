use super::Tokenize;
use crate::token::Token;

/// Splits text on a literal separator, dropping empty pieces
#[derive(Debug, Clone)]
pub struct SplitTokenizer {
    separator: Vec<char>,
}

impl SplitTokenizer {
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.chars().collect(),
        }
    }
}

impl Default for SplitTokenizer {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl Tokenize for SplitTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let s: Vec<char> = text.chars().collect();
        let sep = self.separator.as_slice();
        let mut tokens = Vec::new();
        if sep.is_empty() {
            return tokens;
        }
        let mut start = 0;
        let mut i = 0;
        while i + sep.len() <= s.len() {
            if &s[i..i + sep.len()] == sep {
                if i > start {
                    tokens.push(Token::from_chars(&s, start, i));
                }
                i += sep.len();
                start = i;
            } else {
                i += 1;
            }
        }
        if start < s.len() {
            tokens.push(Token::from_chars(&s, start, s.len()));
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(tokenizer: &SplitTokenizer, text: &str, words: &[&str], starts: &[usize]) {
        let tokens = tokenizer.tokenize(text);
        assert_eq!(tokens.len(), words.len());
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.text(), words[i]);
            assert_eq!(token.start(), starts[i]);
        }
    }

    #[test]
    fn test_split_spaces_ascii() {
        check(
            &SplitTokenizer::new(" "),
            "Once we accept our limits, we go beyond them.",
            &[
                "Once", "we", "accept", "our", "limits,", "we", "go", "beyond", "them.",
            ],
            &[0, 5, 8, 15, 19, 27, 30, 33, 40],
        );
    }

    #[test]
    fn test_split_spaces_unicode() {
        check(
            &SplitTokenizer::new(" "),
            "Видимость работы это еще не работа.",
            &["Видимость", "работы", "это", "еще", "не", "работа."],
            &[0, 10, 17, 21, 25, 28],
        );
    }

    #[test]
    fn test_split_custom_separator() {
        check(
            &SplitTokenizer::new("%%%"),
            "Мишка%%%очень%%%любит%%%мёд.",
            &["Мишка", "очень", "любит", "мёд."],
            &[0, 8, 16, 24],
        );
    }

    #[test]
    fn test_split_edge_cases() {
        let tokenizer = SplitTokenizer::new(" ");
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   ").is_empty());
        check(&tokenizer, "  a  b ", &["a", "b"], &[2, 5]);
        check(&tokenizer, "single", &["single"], &[0]);
        assert!(SplitTokenizer::new("").tokenize("a b").is_empty());
    }
}
