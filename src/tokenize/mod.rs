//! Word tokenizers
//!
//! Every tokenizer implements [`Tokenize`] and returns tokens whose offsets are
//! codepoint indices into the input. [`SentenceTokenizer`] plugs an external
//! sentence splitter in front of a word tokenizer.

mod contractions;
mod regexp;
mod split;
mod treebank;

pub use self::contractions::{Contractions, EnglishContractions};
pub use self::regexp::RegexTokenizer;
pub use self::split::SplitTokenizer;
pub use self::treebank::TreebankTokenizer;

use crate::token::Token;

/// Segment text into tokens
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<T: Tokenize + ?Sized> Tokenize for &T {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

impl<T: Tokenize + ?Sized> Tokenize for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

/// A sentence found by a [`SentenceSplitter`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceSpan {
    /// Start offset in codepoints
    pub start: usize,
    /// End offset in codepoints, exclusive
    pub end: usize,
    pub text: String,
}

/// Sentence boundary detection, provided by the caller
pub trait SentenceSplitter {
    fn split(&self, text: &str) -> Vec<SentenceSpan>;
}

/// Runs a word tokenizer over every sentence of a splitter and shifts the
/// token offsets back into document coordinates.
#[derive(Debug, Clone)]
pub struct SentenceTokenizer<S, T> {
    splitter: S,
    tokenizer: T,
}

impl<S, T> SentenceTokenizer<S, T>
where
    S: SentenceSplitter,
    T: Tokenize,
{
    pub fn new(splitter: S, tokenizer: T) -> Self {
        Self {
            splitter,
            tokenizer,
        }
    }

    /// Tokenize each sentence separately
    pub fn tokenize_sentences(&self, text: &str) -> Vec<Vec<Token>> {
        self.splitter
            .split(text)
            .into_iter()
            .map(|span| {
                let mut tokens = self.tokenizer.tokenize(&span.text);
                for token in &mut tokens {
                    token.shift(span.start);
                }
                tokens
            })
            .collect()
    }
}

impl<S, T> Tokenize for SentenceTokenizer<S, T>
where
    S: SentenceSplitter,
    T: Tokenize,
{
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenize_sentences(text).into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits after every `.` followed by a space
    struct PeriodSplitter;

    impl SentenceSplitter for PeriodSplitter {
        fn split(&self, text: &str) -> Vec<SentenceSpan> {
            let chars: Vec<char> = text.chars().collect();
            let mut spans = Vec::new();
            let mut start = 0;
            for i in 0..chars.len() {
                let last = i + 1 == chars.len();
                if last || (chars[i] == '.' && chars[i + 1] == ' ') {
                    spans.push(SentenceSpan {
                        start,
                        end: i + 1,
                        text: chars[start..=i].iter().collect(),
                    });
                    start = i + 2;
                }
            }
            spans
        }
    }

    #[test]
    fn test_sentence_tokenizer_shifts_offsets() {
        let tokenizer = SentenceTokenizer::new(PeriodSplitter, TreebankTokenizer::default());
        let text = "I walk. You shop.";
        let sentences = tokenizer.tokenize_sentences(text);
        assert_eq!(sentences.len(), 2);

        let words: Vec<_> = sentences[1].iter().map(|t| t.text()).collect();
        assert_eq!(words, ["You", "shop", "."]);
        let starts: Vec<_> = sentences[1].iter().map(|t| t.start()).collect();
        assert_eq!(starts, [8, 12, 16]);

        let tokens = tokenizer.tokenize(text);
        assert_eq!(tokens.len(), 6);
        let chars: Vec<char> = text.chars().collect();
        for token in &tokens {
            let covered: String = chars[token.start()..token.end()].iter().collect();
            assert_eq!(covered, token.text());
        }
    }

    #[test]
    fn test_boxed_tokenizer() {
        let tokenizer: Box<dyn Tokenize> = Box::new(SplitTokenizer::new(" "));
        assert_eq!(tokenizer.tokenize("a b").len(), 2);
    }
}
