//! # A procedural macro for NMEA 0183 field layouts
//!
//! `nmea0183-decoder-derive` provides the `FromFields` derive used by
//! [`nmea0183-decoder`] to declare how a sentence's comma-separated fields map
//! onto a record. The generated code walks a `FieldCursor` one field at a time,
//! so a record decodes either completely or not at all.
//!
//! [`nmea0183-decoder`]: https://crates.io/crates/nmea0183-decoder

use generate::generate_from_fields_impl;
use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod generate;
mod meta;

#[doc = include_str!("../README.md")]
#[proc_macro_derive(FromFields, attributes(nmea))]
pub fn derive_from_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_from_fields_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
