use super::contractions::{Contractions, EnglishContractions};
use super::Tokenize;
use crate::token::{is_digit, Token, TokenFlags};

/// Tries to cut a token starting exactly at `pos`
type Extractor = fn(&[char], usize) -> Option<Token>;

/// Extractors in priority order, the first match wins
const EXTRACTORS: &[Extractor] = &[
    extract_quote,
    extract_period,
    extract_apostrophe,
    extract_colon_comma,
    extract_double_hyphen,
    extract_symbol,
];

/// Maximum number of characters examined after a sentence-final period
const PERIOD_LOOKAHEAD: usize = 5;

fn opens_quote(c: char) -> bool {
    matches!(c, ' ' | '(' | '[' | '{' | '<')
}

fn closes_sentence(c: char) -> bool {
    matches!(c, ')' | ']' | '}' | '>' | '\'' | '"')
}

fn is_standalone(c: char) -> bool {
    matches!(
        c,
        '?' | '!' | ';' | '@' | '#' | '$' | '%' | '&' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>'
    )
}

fn extract_quote(s: &[char], pos: usize) -> Option<Token> {
    if s[pos] != '"' {
        return None;
    }
    let flag = if pos == 0 || opens_quote(s[pos - 1]) {
        TokenFlags::QUOTE_START
    } else {
        TokenFlags::QUOTE_END
    };
    Some(Token::from_chars(s, pos, pos + 1).with_flags(flag))
}

fn extract_period(s: &[char], pos: usize) -> Option<Token> {
    if s[pos] != '.' || (pos > 0 && s[pos - 1] == '.') {
        return None;
    }
    if pos + 1 == s.len() {
        return Some(Token::from_chars(s, pos, pos + 1));
    }
    if s.get(pos + 1) == Some(&'.') && s.get(pos + 2) == Some(&'.') {
        return Some(Token::from_chars(s, pos, pos + 3).with_flags(TokenFlags::ELLIPSIS));
    }
    // Only trailing brackets, quotes or spaces may follow a final period
    let window = &s[pos + 1..s.len().min(pos + 1 + PERIOD_LOOKAHEAD)];
    if window
        .iter()
        .all(|&c| closes_sentence(c) || c.is_whitespace())
    {
        Some(Token::from_chars(s, pos, pos + 1))
    } else {
        None
    }
}

fn extract_apostrophe(s: &[char], pos: usize) -> Option<Token> {
    if s[pos] != '\'' || pos == 0 || pos + 1 == s.len() {
        return None;
    }
    if s[pos - 1] != '\'' && s[pos + 1].is_whitespace() {
        Some(Token::from_chars(s, pos, pos + 1))
    } else {
        None
    }
}

fn extract_colon_comma(s: &[char], pos: usize) -> Option<Token> {
    if s[pos] != ':' && s[pos] != ',' {
        return None;
    }
    // 10:30 and 1,000 stay in one piece
    match s.get(pos + 1) {
        Some(&c) if is_digit(c) => None,
        _ => Some(Token::from_chars(s, pos, pos + 1)),
    }
}

fn extract_double_hyphen(s: &[char], pos: usize) -> Option<Token> {
    if s[pos] == '-' && s.get(pos + 1) == Some(&'-') {
        Some(Token::from_chars(s, pos, pos + 2))
    } else {
        None
    }
}

fn extract_symbol(s: &[char], pos: usize) -> Option<Token> {
    if is_standalone(s[pos]) {
        Some(Token::from_chars(s, pos, pos + 1))
    } else {
        None
    }
}

/// A word being accumulated between extracted tokens
#[derive(Debug, Clone, Copy)]
struct PendingToken {
    start: usize,
    apostrophe: bool,
}

impl PendingToken {
    fn close(self, s: &[char], end: usize) -> Token {
        let token = Token::from_chars(s, self.start, end);
        if self.apostrophe {
            token.with_flags(TokenFlags::APOSTROPHE)
        } else {
            token
        }
    }
}

/// Penn Treebank style word tokenizer.
///
/// A single left-to-right scan over the codepoints of the input, with no
/// backtracking. Punctuation, quotes, ellipses and final periods become
/// tokens of their own; optional post-passes normalize double quotes to
/// ` `` ` / `''` and expand contractions.
#[derive(Debug)]
pub struct TreebankTokenizer {
    normalize: bool,
    contractions: Option<Box<dyn Contractions>>,
}

impl TreebankTokenizer {
    /// Create a tokenizer using the English contraction table when
    /// `expand_contractions` is set
    pub fn new(normalize: bool, expand_contractions: bool) -> Self {
        let contractions: Option<Box<dyn Contractions>> = if expand_contractions {
            Some(Box::new(EnglishContractions::new()))
        } else {
            None
        };
        Self {
            normalize,
            contractions,
        }
    }

    /// Replace the contraction rules, enabling expansion
    pub fn with_contractions(mut self, contractions: Box<dyn Contractions>) -> Self {
        self.contractions = Some(contractions);
        self
    }

    pub fn normalizes_quotes(&self) -> bool {
        self.normalize
    }

    pub fn expands_contractions(&self) -> bool {
        self.contractions.is_some()
    }

    /// Tokenize a sequence of codepoints
    pub fn tokenize_chars(&self, s: &[char]) -> Vec<Token> {
        let mut tokens = scan(s);
        if self.normalize {
            normalize_quotes(&mut tokens);
        }
        match &self.contractions {
            Some(contractions) => expand_contractions(contractions.as_ref(), tokens),
            None => tokens,
        }
    }
}

impl Default for TreebankTokenizer {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl Tokenize for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        self.tokenize_chars(&chars)
    }
}

fn scan(s: &[char]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(s.len() / 4 + 1);
    let mut pending: Option<PendingToken> = None;
    let mut pos = 0;
    'scan: while pos < s.len() {
        let current = s[pos];
        if current.is_whitespace() {
            if let Some(word) = pending.take() {
                tokens.push(word.close(s, pos));
            }
            pos += 1;
            continue;
        }
        for extract in EXTRACTORS {
            if let Some(token) = extract(s, pos) {
                if let Some(word) = pending.take() {
                    tokens.push(word.close(s, pos));
                }
                pos = token.end();
                tokens.push(token);
                continue 'scan;
            }
        }
        let word = pending.get_or_insert(PendingToken {
            start: pos,
            apostrophe: false,
        });
        if current == '\'' {
            word.apostrophe = true;
        }
        pos += 1;
    }
    if let Some(word) = pending.take() {
        tokens.push(word.close(s, s.len()));
    }
    tokens
}

fn normalize_quotes(tokens: &mut [Token]) {
    for token in tokens {
        if token.is_quote_start() {
            token.set_text("``");
        } else if token.is_quote_end() {
            token.set_text("''");
        }
    }
}

fn expand_contractions(contractions: &dyn Contractions, tokens: Vec<Token>) -> Vec<Token> {
    let mut expanded = Vec::with_capacity(tokens.len());
    for token in tokens {
        match contractions.expand(&token) {
            Some((head, tail)) => {
                expanded.push(head);
                expanded.push(tail);
            }
            None => expanded.push(token),
        }
    }
    expanded
}
