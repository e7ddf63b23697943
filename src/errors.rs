//! Definition of errors.

use std::io;

use thiserror::Error;

pub type Result<T, E = TaggerError> = std::result::Result<T, E>;

/// Errors surfaced by the tokenizer, the tagger and the model loader.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// The persisted model is malformed: a section is missing, has the wrong
    /// type or refers to an unknown id.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// A parameter or a training record was rejected.
    #[error("invalid argument: {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    /// Prediction was requested from a model that knows no classes.
    #[error("model has no classes, train or load a model first")]
    Untrained,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TaggerError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(msg.into())
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }
}
