//! Program images and their wire format.
//!
//! The wire format is a single line of comma-separated signed decimal
//! integers. Word `i` of the image is loaded at address `i`.

use crate::error::LoadError;
use crate::Word;
use std::fmt;
use std::str::FromStr;

/// An immutable Intcode program image.
///
/// VMs copy the image into their own memory at construction; the image
/// itself is never mutated by execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    /// Create a program from its memory words.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Parse the comma-separated wire format.
    ///
    /// Whitespace around tokens (including a trailing newline) is ignored.
    /// Empty tokens are rejected, so `1,,2` and `1,2,` are malformed.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut words = Vec::new();
        for (index, token) in text.split(',').enumerate() {
            let token = token.trim();
            let word = token.parse::<Word>().map_err(|_| LoadError::InvalidToken {
                index,
                token: token.to_string(),
            })?;
            words.push(word);
        }

        Ok(Self { words })
    }

    /// The memory words of this image, starting at address 0.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words in the image.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the image has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<i64>> for Program {
    fn from(words: Vec<i64>) -> Self {
        Self::new(words.into_iter().map(Word::from).collect())
    }
}

impl FromStr for Program {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Writes the image back in wire format, without a trailing newline.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}
