//! Feature extraction for the perceptron tagger
//!
//! Features are plain strings made of a template name followed by up to
//! three context values, joined by spaces.

use std::collections::BTreeMap;

use crate::token::is_digit;

/// Sentinels framing the left side of every context array
pub const START: [&str; 2] = ["-START-", "-START2-"];
/// Sentinels framing the right side of every context array
pub const END: [&str; 2] = ["-END-", "-END2-"];

/// Sparse feature counts for one token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    counts: BTreeMap<String, u32>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of the feature `name` followed by `args`
    pub fn add(&mut self, name: &str, args: &[&str]) {
        let len = name.len() + args.iter().map(|a| a.len() + 1).sum::<usize>();
        let mut key = String::with_capacity(len);
        key.push_str(name);
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, feature: &str) -> Option<u32> {
        self.counts.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(feature, count)` in feature order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Map a word onto the form used in the context array
pub fn normalize(word: &str) -> String {
    let first = match word.chars().next() {
        Some(c) => c,
        None => return String::new(),
    };
    if word.contains('-') && first != '-' {
        "!HYPHEN".to_string()
    } else if word.chars().count() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
        "!YEAR".to_string()
    } else if is_digit(first) {
        "!DIGITS".to_string()
    } else {
        word.to_lowercase()
    }
}

/// Build the padded, normalized context array of a sentence.
///
/// The word at index `i` lands at `i + 2`.
pub fn context<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut context = Vec::with_capacity(words.len() + START.len() + END.len());
    context.extend(START.iter().map(|s| s.to_string()));
    context.extend(words.iter().map(|w| normalize(w.as_ref())));
    context.extend(END.iter().map(|s| s.to_string()));
    context
}

/// Last `n` codepoints of `word`, or the whole word when it is shorter
pub fn suffix(word: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match word.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &word[idx..],
        None => word,
    }
}

/// First `n` codepoints of `word`, or the whole word when it is shorter
pub fn prefix(word: &str, n: usize) -> &str {
    match word.char_indices().nth(n) {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}

/// Extract the features of the token at `i`.
///
/// `context` comes from [`context`], `prev` and `prev2` are the tags assigned
/// to the two preceding tokens.
pub fn extract(i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> FeatureSet {
    let i = i + START.len();
    let current = context[i].as_str();
    let (before, before2) = (context[i - 1].as_str(), context[i - 2].as_str());
    let (after, after2) = (context[i + 1].as_str(), context[i + 2].as_str());
    let mut features = FeatureSet::new();
    features.add("bias", &[]);
    features.add("i suffix", &[suffix(word, 3)]);
    features.add("i pref1", &[prefix(word, 1)]);
    features.add("i-1 tag", &[prev]);
    features.add("i-2 tag", &[prev2]);
    features.add("i tag+i-2 tag", &[prev, prev2]);
    features.add("i word", &[current]);
    features.add("i-1 tag+i word", &[prev, current]);
    features.add("i-1 word", &[before]);
    features.add("i-1 suffix", &[suffix(before, 3)]);
    features.add("i-2 word", &[before2]);
    features.add("i+1 word", &[after]);
    features.add("i+1 suffix", &[suffix(after, 3)]);
    features.add("i+2 word", &[after2]);
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("well-known"), "!HYPHEN");
        assert_eq!(normalize("-LRB-"), "-lrb-");
        assert_eq!(normalize("1984"), "!YEAR");
        assert_eq!(normalize("19845"), "!DIGITS");
        assert_eq!(normalize("3rd"), "!DIGITS");
        assert_eq!(normalize("Hello"), "hello");
        assert_eq!(normalize("МЁД"), "мёд");
        assert_eq!(normalize("٣٠"), "!DIGITS");
        assert_eq!(normalize("½"), "½");
        assert_eq!(normalize("²nd"), "²nd");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_context() {
        let context = context(&["The", "1990s"]);
        assert_eq!(
            context,
            ["-START-", "-START2-", "the", "!DIGITS", "-END-", "-END2-"]
        );
    }

    #[test]
    fn test_affixes() {
        assert_eq!(suffix("walking", 3), "ing");
        assert_eq!(suffix("мёд", 3), "мёд");
        assert_eq!(suffix("ёжик", 3), "жик");
        assert_eq!(suffix("at", 3), "at");
        assert_eq!(prefix("walking", 1), "w");
        assert_eq!(prefix("ёжик", 1), "ё");
        assert_eq!(prefix("", 1), "");
    }

    #[test]
    fn test_extract() {
        let words = ["I", "walk", "home"];
        let context = context(&words);
        let features = extract(1, "walk", &context, "PRP", "-START-");
        assert_eq!(features.len(), 14);
        assert_eq!(features.get("bias"), Some(1));
        assert_eq!(features.get("i suffix alk"), Some(1));
        assert_eq!(features.get("i pref1 w"), Some(1));
        assert_eq!(features.get("i-1 tag PRP"), Some(1));
        assert_eq!(features.get("i-2 tag -START-"), Some(1));
        assert_eq!(features.get("i tag+i-2 tag PRP -START-"), Some(1));
        assert_eq!(features.get("i word walk"), Some(1));
        assert_eq!(features.get("i-1 tag+i word PRP walk"), Some(1));
        assert_eq!(features.get("i-1 word i"), Some(1));
        assert_eq!(features.get("i-1 suffix i"), Some(1));
        assert_eq!(features.get("i-2 word -START2-"), Some(1));
        assert_eq!(features.get("i+1 word home"), Some(1));
        assert_eq!(features.get("i+1 suffix ome"), Some(1));
        assert_eq!(features.get("i+2 word -END-"), Some(1));
    }

    #[test]
    fn test_repeated_feature_accumulates() {
        let mut features = FeatureSet::new();
        features.add("i word", &["a"]);
        features.add("i word", &["a"]);
        assert_eq!(features.get("i word a"), Some(2));
        assert_eq!(features.len(), 1);
    }
}
