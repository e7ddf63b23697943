use std::path::Path;

use crate::dataset::TaggedSentence;
use crate::errors::{Result, TaggerError};
use crate::feature::{self, START};
use crate::model::Model;
use crate::token::Token;
use crate::tokenize::Tokenize;
use crate::train::{train_model, TrainingParams};

/// The tagger tokenizes text and assigns a part-of-speech tag to every token
/// using a greedy left-to-right averaged perceptron.
#[derive(Debug, Clone)]
pub struct Tagger<T> {
    tokenizer: T,
    model: Model,
    params: TrainingParams,
}

impl<T: Tokenize> Tagger<T> {
    /// Create a tagger with an empty model
    pub fn new(tokenizer: T) -> Self {
        Self::with_model(tokenizer, Model::default())
    }

    pub fn with_model(tokenizer: T, model: Model) -> Self {
        Self {
            tokenizer,
            model,
            params: TrainingParams::default(),
        }
    }

    /// Create a tagger with a model loaded from file
    pub fn load<P: AsRef<Path>>(tokenizer: T, path: P) -> Result<Self> {
        Ok(Self::with_model(tokenizer, Model::open(path)?))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Parameters used by [`train`](Tagger::train)
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TrainingParams {
        &mut self.params
    }

    /// Tokenize `text` and tag every token
    pub fn tag(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = self.tokenizer.tokenize(text);
        let words: Vec<&str> = tokens.iter().map(Token::text).collect();
        let tags = self.tag_words(&words)?;
        for (token, tag) in tokens.iter_mut().zip(tags) {
            token.set_tag(tag);
        }
        Ok(tokens)
    }

    /// Tag a sentence that is already split into words
    pub fn tag_words<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        let context = feature::context(words);
        let (mut prev, mut prev2) = (START[0].to_string(), START[1].to_string());
        let mut tags = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            let word = word.as_ref();
            let tag = match self.model.lookup(word) {
                Some(tag) => tag.to_string(),
                None => {
                    let features = feature::extract(i, word, &context, &prev, &prev2);
                    self.model
                        .predict(&features)
                        .ok_or(TaggerError::Untrained)?
                        .to_string()
                }
            };
            prev2 = std::mem::replace(&mut prev, tag.clone());
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Share of correctly tagged words over `sentences`, zero when there are
    /// no words
    pub fn evaluate(&self, sentences: &[TaggedSentence]) -> Result<f64> {
        let mut correct = 0usize;
        let mut total = 0usize;
        for sentence in sentences {
            let guesses = self.tag_words(sentence.words())?;
            correct += guesses
                .iter()
                .zip(sentence.tags())
                .filter(|(guess, truth)| guess == truth)
                .count();
            total += sentence.len();
        }
        if total == 0 {
            return Ok(0.0);
        }
        Ok(correct as f64 / total as f64)
    }

    /// Replace the model with one trained on `sentences` for `epochs` passes
    pub fn train(&mut self, sentences: &[TaggedSentence], epochs: usize) -> Result<()> {
        self.train_with_progress(sentences, epochs, |_, _| {})
    }

    /// Like [`train`](Tagger::train), reporting `(completed, total)` sentence
    /// counts along the way
    pub fn train_with_progress<F>(
        &mut self,
        sentences: &[TaggedSentence],
        epochs: usize,
        progress: F,
    ) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let mut params = self.params.clone();
        params.set_epochs(epochs)?;
        self.model = train_model(&params, sentences, progress)?;
        Ok(())
    }

    /// Write the model to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.model.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::SplitTokenizer;

    fn corpus() -> Vec<TaggedSentence> {
        vec![
            TaggedSentence::from_pairs(vec![("I", "PRP"), ("walk", "VBP"), ("home", "NN")]),
            TaggedSentence::from_pairs(vec![("You", "PRP"), ("walk", "VBP"), ("fast", "RB")]),
            TaggedSentence::from_pairs(vec![("I", "PRP"), ("run", "VBP"), ("home", "NN")]),
        ]
    }

    #[test]
    fn test_untrained() {
        let tagger = Tagger::new(SplitTokenizer::default());
        assert!(tagger.tag("").unwrap().is_empty());
        assert!(matches!(tagger.tag("hello"), Err(TaggerError::Untrained)));
    }

    #[test]
    fn test_train_and_tag() {
        let mut tagger = Tagger::new(SplitTokenizer::default());
        tagger.params_mut().set_shuffle_seed(Some(3));
        tagger.train(&corpus(), 10).unwrap();

        let tokens = tagger.tag("I walk home").unwrap();
        let tags: Vec<_> = tokens.iter().map(|t| t.tag().unwrap()).collect();
        assert_eq!(tags, ["PRP", "VBP", "NN"]);
        assert_eq!(tokens[1].start(), 2);
        assert_eq!(tagger.evaluate(&corpus()).unwrap(), 1.0);
    }

    #[test]
    fn test_train_rejects_zero_epochs() {
        let mut tagger = Tagger::new(SplitTokenizer::default());
        let err = tagger.train(&corpus(), 0).unwrap_err();
        assert!(matches!(err, TaggerError::InvalidArgument { arg: "epochs", .. }));
    }

    #[test]
    fn test_evaluate_empty() {
        let tagger = Tagger::new(SplitTokenizer::default());
        assert_eq!(tagger.evaluate(&[]).unwrap(), 0.0);
    }
}
