use crate::errors::{Result, TaggerError};

/// A training sentence: words with their gold tags
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSentence {
    words: Vec<String>,
    tags: Vec<String>,
}

impl TaggedSentence {
    /// Create a sentence, rejecting word and tag sequences of different length
    pub fn new<W, T>(words: &[W], tags: &[T]) -> Result<Self>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        if words.len() != tags.len() {
            return Err(TaggerError::invalid_argument(
                "tags",
                format!(
                    "{} words but {} tags, sequences must have the same length",
                    words.len(),
                    tags.len()
                ),
            ));
        }
        Ok(Self {
            words: words.iter().map(|w| w.as_ref().to_string()).collect(),
            tags: tags.iter().map(|t| t.as_ref().to_string()).collect(),
        })
    }

    /// Create a sentence from `(word, tag)` pairs
    pub fn from_pairs<I, W, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let (words, tags) = pairs
            .into_iter()
            .map(|(w, t)| (w.into(), t.into()))
            .unzip();
        Self { words, tags }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over `(word, tag)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.words
            .iter()
            .zip(&self.tags)
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }
}
