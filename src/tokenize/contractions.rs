use std::fmt;

use regex::Regex;

use crate::token::{Token, TokenFlags};

/// Splits contracted forms into their linguistic parts
pub trait Contractions: fmt::Debug {
    /// Split `token` in two adjacent tokens, or return `None` when no rule
    /// applies. Implementations split at most once.
    fn expand(&self, token: &Token) -> Option<(Token, Token)>;
}

/// English contractions in the Penn Treebank convention
#[derive(Debug, Clone)]
pub struct EnglishContractions {
    /// Tried only on tokens flagged with an apostrophe
    apostrophe: Vec<Regex>,
    /// Tried on every token
    generic: Vec<Regex>,
}

const APOSTROPHE_RULES: &[&str] = &[
    r"(?i)^[^' ]+('s|'m|'d|'ll|'re|'ve|n't|')$",
    r"(?i)^d('ye)$",
    r"(?i)^mor('n)$",
    r"(?i)^'t(is)$",
    r"(?i)^'t(was)$",
];

const GENERIC_RULES: &[&str] = &[
    r"(?i)^can(not)$",
    r"(?i)^got(ta)$",
    r"(?i)^(?:gim|lem)(me)$",
    r"(?i)^(?:gon|wan)(na)$",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("contraction rules are valid patterns"))
        .collect()
}

impl EnglishContractions {
    pub fn new() -> Self {
        Self {
            apostrophe: compile(APOSTROPHE_RULES),
            generic: compile(GENERIC_RULES),
        }
    }

    fn split(re: &Regex, token: &Token) -> Option<(Token, Token)> {
        let word = token.text();
        let group = re.captures(word)?.get(1)?;
        let boundary = word[..group.start()].chars().count();
        if boundary == 0 || boundary >= token.len() {
            return None;
        }
        let (head, tail) = word.split_at(group.start());
        let mid = token.start() + boundary;
        Some((
            piece(head, token.start(), mid),
            piece(tail, mid, token.end()),
        ))
    }
}

fn piece(text: &str, start: usize, end: usize) -> Token {
    let mut token = Token::new(text, start, end);
    if text.contains('\'') {
        token.insert_flags(TokenFlags::APOSTROPHE);
    }
    token
}

impl Default for EnglishContractions {
    fn default() -> Self {
        Self::new()
    }
}

impl Contractions for EnglishContractions {
    fn expand(&self, token: &Token) -> Option<(Token, Token)> {
        if token.has_apostrophe() {
            if let Some(parts) = self.apostrophe.iter().find_map(|re| Self::split(re, token)) {
                return Some(parts);
            }
        }
        self.generic.iter().find_map(|re| Self::split(re, token))
    }
}
