#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use proc_macro::TokenStream;

/// Shared attribute/item parsing helpers used by every macro in this crate.
mod common;

/// Implements the `#[main]` entry-point attribute macro.
mod entry;

/// Implements `impl_deserialize_field!` and the `Deserialize` choice derive.
mod config;

/// Wraps an `async fn main` so it boots the Relay application runtime before
/// running the original body.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    match entry::main(attr.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(tokens) => tokens.into(),
    }
}

/// Generates a tolerant field-name enum (and its `MapAccess` polling helpers)
/// for a hand-rolled `Deserialize` impl:
/// `impl_deserialize_field!(Field, eq_fn, primary_a, primary_b | alias_b)`.
#[proc_macro]
pub fn impl_deserialize_field(input: TokenStream) -> TokenStream {
    config::impl_deserialize_field(input)
}

/// Derives `Deserialize` for a unit-only enum whose variants are matched by
/// their snake_case name or an explicit `#[relay(alias = "...")]`.
#[proc_macro_derive(Deserialize, attributes(relay))]
pub fn derive_deserialize(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    match config::config_choice(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.into_compile_error().into(),
    }
}
