//! Training module for the averaged perceptron tagger
//!
//! This module contains the perceptron with lazy weight averaging, the tag
//! dictionary builder and the trainer that drives them over a corpus.

mod averaged_perceptron;
mod tag_dictionary;
mod trainer;

// Re-export public types
pub use self::averaged_perceptron::AveragedPerceptron;
pub use self::tag_dictionary::TagStatistics;
pub use self::trainer::{Trainer, TrainingParams};

pub(crate) use self::trainer::train_model;
