//! Line-oriented corpora: key lists and seed lists.
//!
//! A corpus is split into lines, and each line into tokens on a [`Delimiter`]. Tokens are trimmed
//! and empty tokens are skipped, so trailing delimiters and blank lines are harmless.

use super::{CorpusError, KeySet};
use alloc::{string::ToString, vec::Vec};

/// How a line is split into tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Delimiter {
    /// Any run of whitespace.
    #[default]
    Whitespace,
    /// A specific character.
    Char(char),
    /// Don't split: one token per line.
    Line,
}

impl Delimiter {
    /// Split one line into trimmed, non-empty tokens.
    #[inline]
    pub fn split(self, line: &str) -> impl Iterator<Item = &str> {
        line.split(move |c: char| match self {
            Self::Whitespace => c.is_whitespace(),
            Self::Char(delimiter) => c == delimiter,
            Self::Line => false,
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
    }
}

/// Split a corpus into tokens, each with its 1-based line number.
#[inline]
pub fn tokens(text: &str, delimiter: Delimiter) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .flat_map(move |(index, line)| delimiter.split(line).map(move |token| (index + 1, token)))
}

/// Parse one seed record.
fn parse_seed(line: usize, token: &str) -> Result<u64, CorpusError> {
    token.parse().map_err(|source| CorpusError::Malformed {
        line,
        token: token.to_string(),
        source,
    })
}

/// Parse a numeric corpus, e.g. a list of primes, into seeds.
///
/// # Errors
///
/// Fails on the first record that is not a non-negative integer fitting into `u64`.
#[inline]
pub fn parse_seeds(text: &str, delimiter: Delimiter) -> Result<Vec<u64>, CorpusError> {
    tokens(text, delimiter)
        .map(|(line, token)| parse_seed(line, token))
        .collect()
}

/// Read a numeric corpus into seeds.
///
/// # Errors
///
/// Fails on I/O errors and on the first malformed record.
#[cfg(feature = "std")]
#[inline]
pub fn read_seeds<R: std::io::BufRead>(
    reader: R,
    delimiter: Delimiter,
) -> Result<Vec<u64>, CorpusError> {
    let mut seeds = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        for token in delimiter.split(&line) {
            seeds.push(parse_seed(index + 1, token)?);
        }
    }
    Ok(seeds)
}

/// Read a key corpus.
///
/// # Errors
///
/// Fails on I/O errors and on duplicate keys.
#[cfg(feature = "std")]
#[inline]
pub fn read_keys<R: std::io::BufRead>(
    reader: R,
    delimiter: Delimiter,
) -> Result<KeySet, super::Error> {
    let mut keys = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(CorpusError::from)?;
        keys.extend(delimiter.split(&line).map(ToString::to_string));
    }
    Ok(KeySet::new(keys)?)
}
