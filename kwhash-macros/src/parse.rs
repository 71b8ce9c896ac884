use proc_macro2::{TokenStream, TokenTree};
use syn::{
    parse::{Parse, ParseStream, Result},
    punctuated::Punctuated,
    LitStr, Token,
};

/// Options preceding the keys.
#[derive(Debug)]
pub struct Context {
    /// Path to the `kwhash` crate, as passed by the wrapper macro.
    pub kwhash_crate: Option<TokenStream>,
    /// Whether `mut;` was given.
    pub mutable: bool,
}

impl Parse for Context {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        // `$crate` is not a valid path for `syn`, so collect raw tokens up to the semicolon.
        let kwhash_crate = if input.parse::<Token![crate]>().is_ok() {
            let mut path = TokenStream::new();
            while !input.peek(Token![;]) {
                path.extend([input.parse::<TokenTree>()?]);
            }
            input.parse::<Token![;]>()?;
            Some(path)
        } else {
            None
        };

        let mutable = if input.peek(Token![mut]) {
            input.parse::<Token![mut]>()?;
            input.parse::<Token![;]>()?;
            true
        } else {
            false
        };

        Ok(Self {
            kwhash_crate,
            mutable,
        })
    }
}

type Comma = Token![,];

/// Macro input: options, then comma-separated string literals.
#[derive(Debug)]
pub struct Input {
    /// Leading `crate ...;` and `mut;` options.
    pub context: Context,
    /// The keys, in order.
    pub keys: Punctuated<LitStr, Comma>,
}

impl Parse for Input {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        Ok(Self {
            context: input.parse::<Context>()?,
            keys: Punctuated::parse_terminated(input)?,
        })
    }
}
