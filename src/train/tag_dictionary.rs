use std::collections::{BTreeSet, HashMap};

use crate::dataset::TaggedSentence;

/// Word/tag frequency statistics over a training corpus
#[derive(Debug, Clone, Default)]
pub struct TagStatistics {
    counts: HashMap<String, HashMap<String, u32>>,
    classes: BTreeSet<String>,
}

impl TagStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics over every word of every sentence
    pub fn from_sentences(sentences: &[TaggedSentence]) -> Self {
        let mut stats = Self::new();
        for sentence in sentences {
            for (word, tag) in sentence.iter() {
                stats.add(word, tag);
            }
        }
        stats
    }

    pub fn add(&mut self, word: &str, tag: &str) {
        *self
            .counts
            .entry(word.to_string())
            .or_default()
            .entry(tag.to_string())
            .or_insert(0) += 1;
        if !self.classes.contains(tag) {
            self.classes.insert(tag.to_string());
        }
    }

    /// Every tag seen
    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn into_classes(self) -> BTreeSet<String> {
        self.classes
    }

    /// Most frequent tag of `word` with its count and the word's total count.
    ///
    /// Equal counts go to the smallest tag.
    pub fn dominant(&self, word: &str) -> Option<(&str, u32, u32)> {
        let tags = self.counts.get(word)?;
        let total = tags.values().sum();
        let (tag, count) = tags
            .iter()
            .fold(None::<(&str, u32)>, |best, (tag, &count)| match best {
                Some((t, c)) if c > count || (c == count && t <= tag.as_str()) => Some((t, c)),
                _ => Some((tag.as_str(), count)),
            })?;
        Some((tag, count, total))
    }

    /// Words seen at least `frequency_threshold` times whose dominant tag
    /// covers at least `ambiguity_threshold` of their occurrences
    pub fn tag_dictionary(
        &self,
        frequency_threshold: u32,
        ambiguity_threshold: f64,
    ) -> HashMap<String, String> {
        let mut tagdict = HashMap::new();
        for word in self.counts.keys() {
            if let Some((tag, count, total)) = self.dominant(word) {
                if total >= frequency_threshold
                    && f64::from(count) / f64::from(total) >= ambiguity_threshold
                {
                    tagdict.insert(word.clone(), tag.to_string());
                }
            }
        }
        tagdict
    }
}
