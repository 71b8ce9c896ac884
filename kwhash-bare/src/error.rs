use super::{reduce::InvalidReduction, Reduction};
use alloc::string::String;
use core::num::ParseIntError;
use displaydoc::Display;
use thiserror::Error;

/// The search was set up wrong. Detected before any candidate is evaluated.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// key {key:?} appears at positions {first} and {second}
    DuplicateKey {
        /// The key.
        key: String,
        /// Position of the first occurrence.
        first: usize,
        /// Position of the second occurrence.
        second: usize,
    },

    /// {keys} keys cannot fit into the {capacity} slots of `{reduction}`
    SlotSpaceTooSmall {
        /// The number of keys.
        keys: usize,
        /// The number of slots.
        capacity: u128,
        /// The offending reduction.
        reduction: Reduction,
    },

    /// invalid reduction `{reduction}`: {source}
    InvalidReduction {
        /// The offending reduction.
        reduction: Reduction,
        /// What is wrong with it.
        source: InvalidReduction,
    },
}

/// A corpus could not be read.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum CorpusError {
    /// line {line}: {token:?} is not an integer: {source}
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The record.
        token: String,
        /// Why it didn't parse.
        source: ParseIntError,
    },

    /// failed to read corpus: {0}
    #[cfg(feature = "std")]
    Io(#[from] std::io::Error),
}

/// Any failure that is not a negative search result.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum Error {
    /// {0}
    Config(#[from] ConfigError),

    /// {0}
    Corpus(#[from] CorpusError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        let error = ConfigError::DuplicateKey {
            key: "if".into(),
            first: 0,
            second: 3,
        };
        assert_eq!(error.to_string(), r#"key "if" appears at positions 0 and 3"#);

        let error = ConfigError::SlotSpaceTooSmall {
            keys: 5,
            capacity: 4,
            reduction: Reduction::bits(2),
        };
        assert_eq!(error.to_string(), "5 keys cannot fit into the 4 slots of `h & 0x3`");

        let error = ConfigError::InvalidReduction {
            reduction: Reduction::modulo(0),
            source: InvalidReduction::ZeroModulus,
        };
        assert_eq!(error.to_string(), "invalid reduction `h mod 0`: modulus is zero");

        let error: Error = error.into();
        assert_eq!(error.to_string(), "invalid reduction `h mod 0`: modulus is zero");
    }
}
