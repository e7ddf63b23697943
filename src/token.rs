use std::fmt;

use bitflags::bitflags;
use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Nd}$").expect("digit class is a valid pattern"));

/// Whether `c` is a decimal digit of any script, Unicode category `Nd`.
///
/// Other numeric characters such as `½` or `Ⅻ` are not digits.
pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || (!c.is_ascii() && DECIMAL_DIGIT.is_match(c.encode_utf8(&mut [0; 4])))
}

bitflags! {
    /// Classification flags set by the tokenizer
    #[derive(Default)]
    pub struct TokenFlags: u8 {
        /// Opening double quote
        const QUOTE_START = 0x01;
        /// Closing double quote
        const QUOTE_END = 0x02;
        /// Three-dot ellipsis
        const ELLIPSIS = 0x04;
        /// The token contains an apostrophe and may be a contraction
        const APOSTROPHE = 0x08;
    }
}

/// A contiguous span of the input text.
///
/// Offsets are codepoint indices into the text handed to the tokenizer and
/// `end` is exclusive. The text may differ from the covered span when quote
/// normalization rewrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    text: String,
    start: usize,
    end: usize,
    flags: TokenFlags,
    tag: Option<String>,
}

impl Token {
    /// Create a token covering `start..end`
    pub fn new<S: Into<String>>(text: S, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            flags: TokenFlags::empty(),
            tag: None,
        }
    }

    pub(crate) fn from_chars(chars: &[char], start: usize, end: usize) -> Self {
        Self::new(chars[start..end].iter().collect::<String>(), start, end)
    }

    pub(crate) fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start offset in codepoints
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset in codepoints, exclusive
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of codepoints covered in the source text
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    pub fn is_quote_start(&self) -> bool {
        self.flags.contains(TokenFlags::QUOTE_START)
    }

    pub fn is_quote_end(&self) -> bool {
        self.flags.contains(TokenFlags::QUOTE_END)
    }

    pub fn is_ellipsis(&self) -> bool {
        self.flags.contains(TokenFlags::ELLIPSIS)
    }

    pub fn has_apostrophe(&self) -> bool {
        self.flags.contains(TokenFlags::APOSTROPHE)
    }

    /// Part-of-speech tag, set once the token went through a tagger
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub(crate) fn set_tag<S: Into<String>>(&mut self, tag: S) {
        self.tag = Some(tag.into());
    }

    pub(crate) fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }

    pub(crate) fn insert_flags(&mut self, flags: TokenFlags) {
        self.flags |= flags;
    }

    pub(crate) fn shift(&mut self, offset: usize) {
        self.start += offset;
        self.end += offset;
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..{})", self.text, self.start, self.end)?;
        if let Some(tag) = &self.tag {
            write!(f, "/{}", tag)?;
        }
        Ok(())
    }
}
