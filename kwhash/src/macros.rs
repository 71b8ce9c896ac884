//! Macros for compile time generation.
//!
//! [`keywords!`] runs the same search as [`SearchSpace::for_keys`](crate::search::SearchSpace::for_keys)
//! while the crate is compiled and expands to the resulting table, so the program carries neither
//! the search nor the key list beyond the table itself.
//!
//! Keys must be string literals. The search picks the narrowest slot width that admits a
//! collision-free candidate; if none of the widths up to 16 bits does, compilation fails. For finer
//! control over the search space, use [`codegen`](crate::codegen) from `build.rs` instead.
use super::*;

#[doc(hidden)]
pub use kwhash_macros;

// Two reasons for `macro_rules!` instead of a direct reexport:
// 1. Document the accepted syntax.
// 2. Pass `$crate` to the macro.

/// Create a [`Keywords`] table in compile time.
///
/// See [module-level documentation](self) for more information.
///
///
/// # Example
///
/// [`keywords!`] evaluates to a `Keywords<'static>` that borrows a static array, so it fits in a
/// `const`:
///
/// ```rust
/// const OPERATORS: kwhash::Keywords<'static> = kwhash::keywords!("**", "//", "<<", ">>");
///
/// assert_eq!(OPERATORS.get("<<"), Some(2));
/// assert_eq!(OPERATORS.get("<>"), None);
/// ```
///
/// Ordinals are positions in the macro input. Duplicate keys are rejected.
///
///
/// # Mutability
///
/// Add `mut;` to the beginning of the macro arguments to allocate the table on the heap instead.
/// The result can no longer be put in a `const`, but needs neither `'static` data nor promotion:
///
/// ```rust
/// let keywords = kwhash::keywords!(mut; "def", "class");
/// assert_eq!(keywords.get("class"), Some(1));
/// ```
#[cfg(doc)]
#[macro_export]
macro_rules! keywords {
    // Not actually valid/usable macro rules, but close enough for docs.
    (
        $(mut;)?
        $($key:literal),* $(,)?
    ) => {
        // Doesn't need to typecheck, but needs to parse.
        ()
    };
}

#[cfg(not(doc))]
#[macro_export]
macro_rules! keywords {
    ($($tt:tt)*) => {
        $crate::macros::kwhash_macros::keywords!(crate $crate; $($tt)*)
    };
}

pub use keywords;
