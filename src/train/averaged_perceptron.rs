use std::collections::{BTreeSet, HashMap};

use crate::feature::FeatureSet;
use crate::weights::Weights;

/// Decimal places kept by averaged weights
const WEIGHT_PRECISION: i32 = 3;

/// Round half away from zero to [`WEIGHT_PRECISION`] decimals
pub(crate) fn round_weight(value: f64) -> f64 {
    let scale = 10f64.powi(WEIGHT_PRECISION);
    (value * scale).round() / scale
}

/// Lazy averaging bookkeeping of one `(feature, class)` weight
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    /// Integral of the weight up to `tstamp`
    total: f64,
    /// Step of the last write
    tstamp: u64,
}

/// Online averaged perceptron.
///
/// Weights are averaged lazily: the integral of a weight over time is only
/// brought up to date when that weight changes, and once more in
/// [`average`](AveragedPerceptron::average).
#[derive(Debug, Clone)]
pub struct AveragedPerceptron {
    weights: Weights,
    tallies: HashMap<(String, String), Tally>,
    /// Update counter
    step: u64,
    classes: BTreeSet<String>,
}

impl AveragedPerceptron {
    /// Create an untrained perceptron over a fixed set of classes
    pub fn new(classes: BTreeSet<String>) -> Self {
        Self {
            weights: Weights::new(),
            tallies: HashMap::new(),
            step: 0,
            classes,
        }
    }

    /// Number of updates so far
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    /// Current, non-averaged weights
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Predict with the current weights
    pub fn predict(&self, features: &FeatureSet) -> Option<&str> {
        self.weights.predict(features, &self.classes)
    }

    /// Record one training decision.
    ///
    /// The step counter advances even when the guess was right.
    pub fn update(&mut self, truth: &str, guess: &str, features: &FeatureSet) {
        self.step += 1;
        if truth == guess {
            return;
        }
        for (feature, _) in features.iter() {
            self.update_feature(feature, truth, 1.0);
            self.update_feature(feature, guess, -1.0);
        }
    }

    fn update_feature(&mut self, feature: &str, class: &str, delta: f64) {
        let weight = self.weights.get(feature, class);
        let tally = self
            .tallies
            .entry((feature.to_string(), class.to_string()))
            .or_default();
        tally.total += (self.step - tally.tstamp) as f64 * weight;
        tally.tstamp = self.step;
        self.weights.set(feature, class, weight + delta);
    }

    /// Finish training and return the time-averaged weights.
    ///
    /// Averages are rounded to three decimals; entries averaging to zero are
    /// dropped.
    pub fn average(self) -> Weights {
        let mut averaged = Weights::new();
        if self.step == 0 {
            return averaged;
        }
        let step = self.step;
        for (feature, class, weight) in self.weights.iter() {
            let tally = self
                .tallies
                .get(&(feature.to_string(), class.to_string()))
                .copied()
                .unwrap_or_default();
            let total = tally.total + (step - tally.tstamp) as f64 * weight;
            let value = round_weight(total / step as f64);
            if value != 0.0 {
                averaged.set(feature, class, value);
            }
        }
        averaged
    }
}
