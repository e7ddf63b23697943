use std::collections::{BTreeSet, HashMap};

use crate::feature::FeatureSet;

/// Sparse weight table: feature -> class -> weight.
///
/// Absent entries weigh zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weights {
    table: HashMap<String, HashMap<String, f64>>,
}

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of `feature` for `class`
    pub fn get(&self, feature: &str, class: &str) -> f64 {
        self.table
            .get(feature)
            .and_then(|classes| classes.get(class))
            .copied()
            .unwrap_or(0.0)
    }

    /// Per-class weights of a feature
    pub fn feature(&self, feature: &str) -> Option<&HashMap<String, f64>> {
        self.table.get(feature)
    }

    pub(crate) fn set(&mut self, feature: &str, class: &str, weight: f64) {
        match self.table.get_mut(feature) {
            Some(classes) => {
                classes.insert(class.to_string(), weight);
            }
            None => {
                let mut classes = HashMap::new();
                classes.insert(class.to_string(), weight);
                self.table.insert(feature.to_string(), classes);
            }
        }
    }

    /// Number of features with at least one entry
    pub fn num_features(&self) -> usize {
        self.table.len()
    }

    /// Number of `(feature, class)` entries
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(feature, class, weight)` entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.table.iter().flat_map(|(feature, classes)| {
            classes
                .iter()
                .map(move |(class, &weight)| (feature.as_str(), class.as_str(), weight))
        })
    }

    /// Sum `count * weight` per class over the features with a nonzero count
    pub fn scores<'a>(&'a self, features: &FeatureSet) -> HashMap<&'a str, f64> {
        let mut scores = HashMap::new();
        for (feature, count) in features.iter() {
            if count == 0 {
                continue;
            }
            if let Some(classes) = self.table.get(feature) {
                for (class, weight) in classes {
                    *scores.entry(class.as_str()).or_insert(0.0) += f64::from(count) * weight;
                }
            }
        }
        scores
    }

    /// Highest scoring class among `classes`.
    ///
    /// Classes without any contribution score zero. Ties go to the
    /// lexicographically smallest label. Returns `None` only when `classes`
    /// is empty.
    pub fn predict<'c>(&self, features: &FeatureSet, classes: &'c BTreeSet<String>) -> Option<&'c str> {
        let scores = self.scores(features);
        let mut best: Option<(&'c str, f64)> = None;
        for class in classes {
            let score = scores.get(class.as_str()).copied().unwrap_or(0.0);
            best = match best {
                Some((label, top)) if top > score || (top == score && label <= class.as_str()) => {
                    Some((label, top))
                }
                _ => Some((class.as_str(), score)),
            };
        }
        best.map(|(label, _)| label)
    }
}
