//! Code generation.
//!
//! Searching is too slow to repeat on every program start, so the usual workflow is to search in
//! `build.rs`, turn the resulting [`Keywords`](crate::Keywords) table into a Rust expression with
//! this module, write it to `OUT_DIR` and `include!` it. The `keywords!` macro does the same in a
//! procedural macro.
//!
//! Descriptors, reductions, candidates and tables implement [`Codegen`], as do the handful of
//! primitive types they are made of.
//!
//!
//! # Typing
//!
//! Integer literals are unsuffixed and slices are emitted as `&[..]`, so the expression relies on
//! the surrounding context (usually the type of a `static`) for inference.
//!
//!
//! # Mutability and `const`
//!
//! By default, tables borrow a static array and the expression is `const`-evaluable. After
//! `set_mutability(true)`, tables own a `Vec` instead, which needs `alloc` but no promotion.
//!
//!
//! # Example
//!
//! ```rust
//! # extern crate kwhash_bare as kwhash;
//! use kwhash::{emit::Order, search::{Search, SearchConfig, SearchSpace}, KeySet};
//!
//! let keys = KeySet::new(["if", "in", "is"]).unwrap();
//! let search = Search::new(&keys, SearchSpace::for_keys(keys.len()), SearchConfig::new()).unwrap();
//! let solution = search.first(&mut ()).into_result().unwrap();
//! let keywords = solution.table(Order::Keys).keywords().unwrap();
//!
//! let code = kwhash::codegen::CodeGenerator::new().generate(&keywords);
//! assert!(code.to_string().contains("__Keywords :: __from_raw_parts"));
//! ```
//!
//! ```ignore
//! static KEYWORDS: kwhash::Keywords<'static> = include!(concat!(env!("OUT_DIR"), "/keywords.rs"));
//! ```

use alloc::{
    collections::{BTreeMap, BTreeSet},
    format,
    string::String,
};
use proc_macro2::{Ident, Literal, TokenStream, TokenTree};
use quote::{format_ident, quote};

/// Code generator.
///
/// The output is a block that imports every item it mentions under a `__`-prefixed alias and then
/// evaluates the value:
///
/// ```ignore
/// {
///     extern crate alloc as _Alloc; // only if an `alloc` item is used
///     use ::core::option::Option::Some as __Some;
///     use ::kwhash::Keywords as __Keywords;
///     __Keywords::__from_raw_parts(/* ... */)
/// }
/// ```
///
/// Aliases keep long tables short and cannot clash with names at the `include!` site. Imports are
/// sorted by path, so the same value always produces the same code.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    /// Crate name to path overrides, see [`set_crate`](Self::set_crate).
    crates: BTreeMap<String, TokenStream>,

    /// Imported paths and their aliases.
    imports: BTreeMap<String, Ident>,

    /// Aliases in use, to keep them unique.
    taken: BTreeSet<String>,

    /// Whether an `alloc` item was imported.
    needs_alloc: bool,

    /// See [module-level documentation](self).
    mutability: bool,
}

impl CodeGenerator {
    /// Create a code generator with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate owned, heap-allocated tables instead of `const`-friendly borrowed ones.
    #[inline]
    pub fn set_mutability(&mut self, mutability: bool) {
        self.mutability = mutability;
    }

    /// Check if generating owned tables.
    #[inline]
    #[must_use]
    pub const fn mutability(&self) -> bool {
        self.mutability
    }

    /// Resolve crate `name` to `path` instead of `::name`.
    ///
    /// The `keywords!` macro maps `kwhash` to `$crate`, so the facade can be renamed by the user.
    #[inline]
    pub fn set_crate(&mut self, name: &str, path: TokenStream) {
        self.crates.insert(name.into(), path);
    }

    /// Turn a value into a self-contained expression.
    #[inline]
    pub fn generate<T: Codegen>(mut self, value: &T) -> TokenStream {
        let value = self.piece(value);

        let extern_alloc = if self.needs_alloc && !self.crates.contains_key("alloc") {
            self.crates.insert("alloc".into(), quote!(_Alloc));
            quote!(extern crate alloc as _Alloc;)
        } else {
            TokenStream::new()
        };

        let imports = self
            .imports
            .iter()
            .map(|(path, alias)| self.import(path, alias));

        quote!({
            #extern_alloc
            #(#imports)*
            #value
        })
    }

    /// A `use` item importing `path` as `alias`.
    fn import(&self, path: &str, alias: &Ident) -> TokenStream {
        let mut segments = path.split("::");
        let krate = segments.next().unwrap_or_default();
        let root = self.crates.get(krate).cloned().unwrap_or_else(|| {
            let krate = format_ident!("{krate}");
            quote!(::#krate)
        });
        let segments = segments.map(|segment| format_ident!("{segment}"));
        quote!(use #root #(::#segments)* as #alias;)
    }

    /// Turn a value into an expression that may use this generator's imports.
    #[inline]
    pub fn piece<T: Codegen>(&mut self, piece: &T) -> TokenStream {
        piece.generate_piece(self)
    }

    /// An array expression.
    #[inline]
    pub fn array<'a, T: 'a + Codegen>(
        &mut self,
        elements: impl IntoIterator<Item = &'a T>,
    ) -> TokenStream {
        let elements = elements.into_iter().map(|element| self.piece(element));
        quote!([#(#elements),*])
    }

    /// Import an item and return its alias.
    ///
    /// `path` is written without a leading `::`, starting with a crate name, e.g.
    /// `kwhash::family::HashFn` or `core::option::Option::Some`. The crate is resolved as configured
    /// with [`set_crate`](Self::set_crate). Importing the same path twice returns the same alias;
    /// different paths ending with the same name get numbered aliases (`__String`, `__String2`).
    #[inline]
    pub fn path(&mut self, path: &str) -> TokenStream {
        if let Some(alias) = self.imports.get(path) {
            return quote!(#alias);
        }

        let (krate, name) = match (path.split_once("::"), path.rsplit_once("::")) {
            (Some((krate, _)), Some((_, name))) => (krate, name),
            _ => (path, path),
        };
        self.needs_alloc |= krate == "alloc";

        let mut alias = format!("__{name}");
        let mut n = 1_usize;
        while !self.taken.insert(alias.clone()) {
            n += 1;
            alias = format!("__{name}{n}");
        }

        let alias = format_ident!("{alias}");
        self.imports.insert(path.into(), alias.clone());
        quote!(#alias)
    }
}

/// Values that can be turned into code.
///
/// Types whose public constructors validate or compute expose a `#[doc(hidden)]`
/// `__from_raw_parts` constructor for generated code to call.
pub trait Codegen: Sized {
    /// Emit an expression for this value.
    ///
    /// Call this through [`CodeGenerator::piece`] from other implementations, and use
    /// [`CodeGenerator::generate`] for the final output.
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream;
}

/// [`Codegen`] for types with an unsuffixed [`Literal`] constructor.
macro_rules! unsuffixed {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Codegen for $ty {
                #[inline]
                fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
                    TokenTree::Literal(Literal::$method(*self)).into()
                }
            }
        )*
    };
}

unsuffixed! {
    u32 => u32_unsuffixed,
    u64 => u64_unsuffixed,
    usize => usize_unsuffixed,
    i64 => i64_unsuffixed,
}

impl Codegen for &str {
    #[inline]
    fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
        TokenTree::Literal(Literal::string(self)).into()
    }
}

impl Codegen for bool {
    #[inline]
    fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
        if *self {
            quote!(true)
        } else {
            quote!(false)
        }
    }
}

impl<T: Codegen> Codegen for Option<T> {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        let Some(value) = self else {
            return gen.path("core::option::Option::None");
        };
        let some = gen.path("core::option::Option::Some");
        let value = gen.piece(value);
        quote!(#some(#value))
    }
}

impl<A: Codegen, B: Codegen> Codegen for (A, B) {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        let a = gen.piece(&self.0);
        let b = gen.piece(&self.1);
        quote!((#a, #b))
    }
}
