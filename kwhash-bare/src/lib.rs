//! This crate provides types for [`kwhash`](https://docs.rs/kwhash). Use that crate instead.
//!
//! The crate searches a small, closed family of cheap hash functions for one that maps a fixed key
//! set (language keywords, operators) to distinct small integers, so that a lexer can recognize a
//! keyword with a single array index.
//!
//! The pieces, from leaf to root:
//!
//! - [`family`]: the registry of candidate functions.
//! - [`reduce`]: turns a raw digest into a bounded slot.
//! - `prove`: checks slots for collisions (`build` feature).
//! - `search`: enumerates candidates and picks a winner (`build` feature).
//! - `emit`: turns a winner into a declarative table (`build` feature).
//! - [`Keywords`]: the runtime lookup table built from that table.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod candidate;
#[cfg(feature = "codegen")]
pub mod codegen;
#[cfg(feature = "build")]
pub mod corpus;
#[cfg(feature = "build")]
pub mod emit;
#[cfg(feature = "build")]
mod error;
pub mod family;
#[cfg(feature = "build")]
mod key;
mod keywords;
#[cfg(feature = "build")]
pub mod prove;
pub mod reduce;
#[cfg(feature = "build")]
pub mod search;

pub use candidate::Candidate;
#[cfg(feature = "build")]
pub use error::{ConfigError, CorpusError, Error};
pub use family::{HashFn, HashFunction};
#[cfg(feature = "build")]
pub use key::KeySet;
pub use keywords::Keywords;
pub use reduce::Reduction;

/// Public (but hidden) reexports for codegen to access.
#[doc(hidden)]
pub mod low_level {
    pub use super::keywords::Entries;
}

#[cfg(all(test, feature = "build"))]
mod tests;
