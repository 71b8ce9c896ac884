//! Procedural macros for [`kwhash`](https://docs.rs/kwhash). Use that crate instead.

#![allow(clippy::std_instead_of_alloc, reason = "we're not in #[no_std]")]

mod parse;

use self::parse::Input;
use kwhash::{
    codegen::CodeGenerator,
    emit::Order,
    search::{Search, SearchConfig, SearchSpace, Solution},
    KeySet,
};
use proc_macro2::TokenStream;
use proc_macro_error2::{emit_call_site_error, emit_error, set_dummy};
use quote::quote;
use std::collections::HashMap;
use syn::{parse_macro_input, LitStr};

/// Check for duplicates and build the key set.
fn parse_keys<'a>(literals: impl Iterator<Item = &'a LitStr> + Clone) -> Result<KeySet, ()> {
    let mut seen = HashMap::new();
    for (i, literal) in literals.clone().enumerate() {
        if let Some(j) = seen.insert(literal.value(), i) {
            let old = literals.clone().nth(j);
            emit_error!(old, "this key is repeated...");
            emit_error!(literal, "...here");
            return Err(());
        }
    }

    KeySet::new(literals.map(LitStr::value)).map_err(|error| {
        emit_call_site_error!("{}", error);
    })
}

/// Search the default space for `keys`.
fn search(keys: &KeySet) -> Result<Solution, ()> {
    let search = Search::new(keys, SearchSpace::for_keys(keys.len()), SearchConfig::new())
        .map_err(|error| {
            emit_call_site_error!("{}", error);
        })?;

    search.first(&mut ()).into_result().map_err(|exhausted| {
        emit_call_site_error!(
            "no perfect hash function found for these keys\n{}\nuse `kwhash::codegen` from `build.rs` to search a larger space",
            exhausted,
        );
    })
}

// This option does not enable the `proc_macro_hack` crate. It only tweaks the error output to be
// valid in expression position.
#[proc_macro_error2::proc_macro_error(proc_macro_hack)]
/// See `kwhash::keywords!`.
#[proc_macro]
pub fn keywords(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    set_dummy(quote!(::core::unreachable!()));

    let input = parse_macro_input!(item as Input);

    let Ok(keys) = parse_keys(input.keys.iter()) else {
        return quote! {}.into();
    };
    let Ok(solution) = search(&keys) else {
        return quote! {}.into();
    };
    let table = solution.table(Order::Keys);
    let Some(keywords) = table.keywords() else {
        emit_call_site_error!("the table for these keys is too large");
        return quote! {}.into();
    };

    let mut gen = CodeGenerator::new();
    if let Some(path) = &input.context.kwhash_crate {
        gen.set_crate("kwhash", path.clone());
    }
    gen.set_mutability(input.context.mutable);

    let keywords: TokenStream = gen.generate(&keywords);
    keywords.into()
}
