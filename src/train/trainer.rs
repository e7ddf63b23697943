use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::averaged_perceptron::AveragedPerceptron;
use super::tag_dictionary::TagStatistics;
use crate::dataset::TaggedSentence;
use crate::errors::{Result, TaggerError};
use crate::feature::{self, START};
use crate::model::Model;

/// Training parameters.
#[derive(Debug, Clone)]
pub struct TrainingParams {
    epochs: usize,
    frequency_threshold: u32,
    ambiguity_threshold: f64,
    shuffle_seed: Option<u64>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 5,
            frequency_threshold: 20,
            ambiguity_threshold: 0.97,
            shuffle_seed: None,
        }
    }
}

impl TrainingParams {
    /// Number of passes over the training sentences
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn set_epochs(&mut self, epochs: usize) -> Result<()> {
        if epochs < 1 {
            return Err(TaggerError::invalid_argument(
                "epochs",
                "must be at least 1",
            ));
        }
        self.epochs = epochs;
        Ok(())
    }

    /// Minimum number of occurrences for a word to enter the tag dictionary
    pub fn frequency_threshold(&self) -> u32 {
        self.frequency_threshold
    }

    pub fn set_frequency_threshold(&mut self, threshold: u32) -> Result<()> {
        if threshold < 1 {
            return Err(TaggerError::invalid_argument(
                "frequency_threshold",
                "must be at least 1",
            ));
        }
        self.frequency_threshold = threshold;
        Ok(())
    }

    /// Minimum share of the dominant tag for a word to enter the tag dictionary
    pub fn ambiguity_threshold(&self) -> f64 {
        self.ambiguity_threshold
    }

    pub fn set_ambiguity_threshold(&mut self, threshold: f64) -> Result<()> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(TaggerError::invalid_argument(
                "ambiguity_threshold",
                "must be in (0, 1]",
            ));
        }
        self.ambiguity_threshold = threshold;
        Ok(())
    }

    pub fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Seed the sentence shuffling between epochs, `None` seeds from entropy
    pub fn set_shuffle_seed(&mut self, seed: Option<u64>) {
        self.shuffle_seed = seed;
    }
}

/// Averaged perceptron trainer over tagged sentences
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    /// Training sentences
    sentences: Vec<TaggedSentence>,
    params: TrainingParams,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: TrainingParams) -> Self {
        Self {
            sentences: Vec::new(),
            params,
        }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TrainingParams {
        &mut self.params
    }

    /// Set the number of epochs (builder pattern)
    pub fn with_epochs(mut self, epochs: usize) -> Result<Self> {
        self.params.set_epochs(epochs)?;
        Ok(self)
    }

    /// Set the shuffle seed (builder pattern)
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.params.set_shuffle_seed(Some(seed));
        self
    }

    /// Append a training sentence
    pub fn append<W, T>(&mut self, words: &[W], tags: &[T]) -> Result<()>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        self.sentences.push(TaggedSentence::new(words, tags)?);
        Ok(())
    }

    pub fn append_sentence(&mut self, sentence: TaggedSentence) {
        self.sentences.push(sentence);
    }

    /// Number of training sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Clear all training data
    pub fn clear(&mut self) {
        self.sentences.clear();
    }

    /// Train a fresh model on the appended sentences
    pub fn train(&self) -> Result<Model> {
        self.train_with_progress(|_, _| {})
    }

    /// Train a fresh model, calling `progress(completed, total)` after every
    /// sentence of every epoch
    pub fn train_with_progress<F>(&self, progress: F) -> Result<Model>
    where
        F: FnMut(usize, usize),
    {
        train_model(&self.params, &self.sentences, progress)
    }
}

/// Run the averaged perceptron over `sentences` and return the averaged model
pub(crate) fn train_model<F>(
    params: &TrainingParams,
    sentences: &[TaggedSentence],
    mut progress: F,
) -> Result<Model>
where
    F: FnMut(usize, usize),
{
    let stats = TagStatistics::from_sentences(sentences);
    if stats.classes().is_empty() {
        return Err(TaggerError::invalid_argument(
            "sentences",
            "no training data",
        ));
    }
    let tagdict = stats.tag_dictionary(params.frequency_threshold(), params.ambiguity_threshold());
    let mut perceptron = AveragedPerceptron::new(stats.into_classes());

    let epochs = params.epochs();
    let total = sentences.len() * epochs;
    info!(
        "training on {} sentences for {} epochs, {} classes, {} words in the tag dictionary",
        sentences.len(),
        epochs,
        perceptron.classes().len(),
        tagdict.len()
    );

    let mut order: Vec<usize> = (0..sentences.len()).collect();
    let mut rng = match params.shuffle_seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut completed = 0;
    for epoch in 0..epochs {
        let mut correct = 0usize;
        let mut seen = 0usize;
        for &idx in &order {
            let sentence = &sentences[idx];
            let context = feature::context(sentence.words());
            let (mut prev, mut prev2) = (START[0].to_string(), START[1].to_string());
            for (i, (word, truth)) in sentence.iter().enumerate() {
                let guess = match tagdict.get(word) {
                    Some(tag) => tag.clone(),
                    None => {
                        let features = feature::extract(i, word, &context, &prev, &prev2);
                        let guess = perceptron
                            .predict(&features)
                            .map(str::to_string)
                            .ok_or(TaggerError::Untrained)?;
                        perceptron.update(truth, &guess, &features);
                        guess
                    }
                };
                if guess == truth {
                    correct += 1;
                }
                seen += 1;
                prev2 = std::mem::replace(&mut prev, guess);
            }
            completed += 1;
            progress(completed, total);
        }

        info!(
            "epoch {}/{}: {}/{} correct ({:.3}%)",
            epoch + 1,
            epochs,
            correct,
            seen,
            if seen > 0 {
                100.0 * correct as f64 / seen as f64
            } else {
                0.0
            }
        );
        if epoch + 1 < epochs {
            order.shuffle(&mut rng);
        }
    }

    debug!("averaging weights over {} updates", perceptron.step());
    let classes = perceptron.classes().clone();
    let weights = perceptron.average();
    Model::new(weights, tagdict, classes)
}
