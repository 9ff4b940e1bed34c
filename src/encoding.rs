//! State encoders
//!
//! Encoders turn raw observations (grid coordinates, a letter, a question) into
//! fixed-length feature vectors the value approximator can consume. Every
//! encoder is pure: the same input always yields the same vector.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Feature vector fed to the approximator.
pub type StateVector = Vec<f64>;

/// Number of letters in the encoding alphabet (`a`..=`z`).
pub const ALPHABET_SIZE: usize = 26;

/// Maps a raw observation to a fixed-length [`StateVector`].
pub trait StateEncoder<Raw: ?Sized> {
    /// Length of every vector produced by [`StateEncoder::encode`].
    fn state_size(&self) -> usize;

    /// Encode a raw observation.
    fn encode(&self, raw: &Raw) -> StateVector;
}

/// Alphabet position of a letter (`'a'` → 0), case-insensitive.
///
/// Returns `None` for anything outside `a..=z`.
pub fn letter_index(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    lower
        .is_ascii_lowercase()
        .then(|| (lower as u8 - b'a') as usize)
}

/// Letter at an alphabet position, clamped into `a..=z`.
pub fn letter_at(index: usize) -> char {
    (b'a' + index.min(ALPHABET_SIZE - 1) as u8) as char
}

/// Copies grid coordinates into a length-2 vector, unnormalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateEncoder;

impl StateEncoder<(i32, i32)> for CoordinateEncoder {
    fn state_size(&self) -> usize {
        2
    }

    fn encode(&self, &(x, y): &(i32, i32)) -> StateVector {
        vec![f64::from(x), f64::from(y)]
    }
}

/// Places a single category index in a length-1 vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarIndexEncoder;

impl StateEncoder<usize> for ScalarIndexEncoder {
    fn state_size(&self) -> usize {
        1
    }

    fn encode(&self, index: &usize) -> StateVector {
        vec![*index as f64]
    }
}

/// Text encodings over the 26-letter alphabet.
///
/// Input is lower-cased and stripped of everything outside `a..=z` (accented
/// letters included) before counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Per-letter occurrence count divided by the total letter count.
    #[default]
    Frequency,
    /// 1.0 if the letter occurs at least once, else 0.0.
    Presence,
}

impl TextEncoding {
    fn letter_counts(text: &str) -> ([usize; ALPHABET_SIZE], usize) {
        let mut counts = [0usize; ALPHABET_SIZE];
        let mut total = 0;
        for index in text.chars().filter_map(letter_index) {
            counts[index] += 1;
            total += 1;
        }
        (counts, total)
    }
}

impl StateEncoder<str> for TextEncoding {
    fn state_size(&self) -> usize {
        ALPHABET_SIZE
    }

    fn encode(&self, text: &str) -> StateVector {
        let (counts, total) = Self::letter_counts(text);
        if total == 0 {
            return vec![0.0; ALPHABET_SIZE];
        }

        counts
            .iter()
            .map(|&count| match self {
                TextEncoding::Frequency => count as f64 / total as f64,
                TextEncoding::Presence if count > 0 => 1.0,
                TextEncoding::Presence => 0.0,
            })
            .collect()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Frequency => write!(f, "frequency"),
            TextEncoding::Presence => write!(f, "presence"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" | "freq" => Ok(TextEncoding::Frequency),
            "presence" => Ok(TextEncoding::Presence),
            other => Err(Error::parse_option(
                "text encoding",
                other,
                "frequency, presence",
            )),
        }
    }
}
