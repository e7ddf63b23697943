//! Pure Rust part-of-speech tagger
//!
//! This library tokenizes English text with treebank rules and tags it with a
//! greedy averaged perceptron. It covers both training and prediction.
//!
//! # Examples
//!
//! ## Training
//!
//! ```no_run
//! use postag::{TaggedSentence, Tagger, TreebankTokenizer};
//!
//! let sentences = vec![
//!     TaggedSentence::new(&["I", "walk", "home"], &["PRP", "VBP", "NN"])?,
//!     TaggedSentence::new(&["You", "run", "fast"], &["PRP", "VBP", "RB"])?,
//! ];
//!
//! let mut tagger = Tagger::new(TreebankTokenizer::default());
//! tagger.train(&sentences, 5)?;
//! tagger.save("model.postag")?;
//! # Ok::<(), postag::TaggerError>(())
//! ```
//!
//! ## Prediction
//!
//! ```no_run
//! use postag::{Tagger, TreebankTokenizer};
//!
//! let tagger = Tagger::load(TreebankTokenizer::default(), "model.postag")?;
//! for token in tagger.tag("They'll walk home.")? {
//!     println!("{}", token);
//! }
//! # Ok::<(), postag::TaggerError>(())
//! ```

mod dataset;
mod dictionary;
mod errors;
mod model;
mod model_writer;
mod tagger;
mod token;
mod weights;

/// Feature extraction shared by training and tagging
pub mod feature;
/// Tokenizers producing offset-annotated tokens
pub mod tokenize;
/// Training module containing all components for training tagging models
pub mod train;

// Re-export main types
pub use self::dataset::TaggedSentence;
pub use self::errors::{Result, TaggerError};
pub use self::model::Model;
pub use self::model_writer::ModelWriter;
pub use self::tagger::Tagger;
pub use self::token::{Token, TokenFlags};
pub use self::tokenize::{
    RegexTokenizer, SentenceSplitter, SentenceSpan, SentenceTokenizer, SplitTokenizer, Tokenize,
    TreebankTokenizer,
};
pub use self::weights::Weights;

// Re-export training types for convenience
pub use self::train::{Trainer, TrainingParams};
