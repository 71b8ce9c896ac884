//! Perfect hashing for keyword and operator sets.
//!
//! A lexer that needs to recognize a fixed set of reserved words can avoid a chain of string
//! comparisons by hashing the candidate word once and indexing a small table. This crate finds the
//! hash function for that table by brute force: it enumerates a small family of cheap functions
//! (byte-pair arithmetic and classic string folds), reduces each digest to a bounded slot, and keeps
//! the first candidate under which no two keys share a slot.
//!
//!
//! # Usage
//!
//! The result is a [`Keywords`] table mapping each key to its ordinal. It can be obtained in
//! several ways:
//!
//! 1. In compile time, with the [`keywords!`] macro. Zero-cost in runtime.
//! 2. In `build.rs`, by running a [`search`] and translating the table with [`codegen`], then
//!    `include!`ing the generated code. Allows reading keys from files and tuning the search space.
//! 3. In runtime, by running a [`search`] and calling [`Table::keywords`](emit::Table::keywords).
//!
//! ```rust
//! const KEYWORDS: kwhash::Keywords<'static> = kwhash::keywords!("if", "in", "is", "for", "while");
//!
//! assert_eq!(KEYWORDS.get("for"), Some(3));
//! assert_eq!(KEYWORDS.get("fro"), None);
//! ```
//!
//!
//! # Features
//!
//! - `std` (default): reading key and seed corpora from [`BufRead`](std::io::BufRead).
//! - `alloc`: runtime-allocated tables.
//! - `build`: the search itself, without code generation.
//! - `codegen`: translating tables to Rust code.
//! - `parallel`: evaluating candidates on the `rayon` pool. Results are identical to sequential
//!   runs.
//! - `serde`: (de)serialization of descriptors, configurations and results.
//!
//! Without `build`, only the runtime lookup is available, which works in `no_std` without an
//! allocator.

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod macros;

pub use kwhash_bare::*;
