use std::{collections::HashSet, fmt::Display};

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{
    Attribute, Error, Expr, Ident, Lit, Result, Token, Type, parenthesized,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    token::Paren,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MetaAttributeType {
    Map,
    ParseAs,
    Parser,
    Skip,
    With,
}

impl MetaAttributeType {
    pub fn from_ident(ident: &Ident) -> Option<Self> {
        match ident.to_string().as_str() {
            "map" => Some(Self::Map),
            "parse_as" => Some(Self::ParseAs),
            "parser" => Some(Self::Parser),
            "skip" => Some(Self::Skip),
            "with" => Some(Self::With),
            _ => None,
        }
    }

    fn takes_argument(&self) -> bool {
        !matches!(self, Self::Skip)
    }

    /// Attributes that decide how the field itself is read. At most one may be present.
    fn is_source(&self) -> bool {
        matches!(self, Self::ParseAs | Self::Parser | Self::Skip | Self::With)
    }
}

impl Display for MetaAttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Map => "map",
            Self::ParseAs => "parse_as",
            Self::Parser => "parser",
            Self::Skip => "skip",
            Self::With => "with",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
pub struct MetaAttribute {
    pub r#type: MetaAttributeType,
    arg: Option<TokenStream>,
    span: Span,
}

impl MetaAttribute {
    pub fn arg(&self) -> Result<&TokenStream> {
        self.arg.as_ref().ok_or_else(|| {
            Error::new(
                self.span,
                format!("nmea0183-decoder-derive: `{}` requires an argument", self.r#type),
            )
        })
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl Parse for MetaAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident: Ident = input.parse()?;
        let r#type = MetaAttributeType::from_ident(&ident).ok_or_else(|| {
            Error::new(ident.span(), "nmea0183-decoder-derive: Unknown nmea attribute")
        })?;

        let arg = if r#type.takes_argument() {
            let tokens = match r#type {
                MetaAttributeType::ParseAs => parse_argument::<Type>(input)?,
                _ => parse_argument::<Expr>(input)?,
            };
            Some(tokens)
        } else {
            None
        };

        Ok(MetaAttribute {
            r#type,
            arg,
            span: ident.span(),
        })
    }
}

struct List<T: Parse>(Vec<T>);

impl<T: Parse> Parse for List<T> {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(List(
            Punctuated::<T, Token![,]>::parse_terminated(input)?
                .into_iter()
                .collect(),
        ))
    }
}

// Accepts both `name(value)` and `name = "value"`.
fn parse_argument<P>(input: ParseStream) -> Result<TokenStream>
where
    P: Parse + ToTokens,
{
    if input.peek(Token![=]) {
        let _: Token![=] = input.parse()?;
        let value = Lit::parse(input)?;

        match value {
            Lit::Str(string) => {
                let parsed: P = string.parse()?;
                Ok(quote! { #parsed })
            }
            _ => Err(Error::new(
                value.span(),
                "nmea0183-decoder-derive: Unexpected type for nmea attribute content",
            )),
        }
    } else if input.peek(Paren) {
        let content;
        parenthesized!(content in input);
        let parsed: P = content.parse()?;
        Ok(quote! { #parsed })
    } else {
        Err(Error::new(
            input.span(),
            "nmea0183-decoder-derive: Expected '= <value>' or '(<value>)' for nmea attribute",
        ))
    }
}

pub fn parse_field_level_attributes(attrs: &[Attribute]) -> Result<Vec<MetaAttribute>> {
    let mut seen = HashSet::new();
    let mut source: Option<MetaAttributeType> = None;

    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("nmea"))
        .map(|attr| attr.parse_args::<List<MetaAttribute>>())
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flat_map(|list| list.0.into_iter())
        .map(|meta_attr| {
            if !seen.insert(meta_attr.r#type) {
                return Err(Error::new(
                    meta_attr.span(),
                    format!(
                        "nmea0183-decoder-derive: Duplicate nmea attribute `{}`",
                        meta_attr.r#type
                    ),
                ));
            }

            if meta_attr.r#type.is_source() {
                if let Some(previous) = source {
                    return Err(Error::new(
                        meta_attr.span(),
                        format!(
                            "nmea0183-decoder-derive: Attribute `{}` cannot be used with `{}`",
                            meta_attr.r#type, previous
                        ),
                    ));
                }
                source = Some(meta_attr.r#type);
            }

            if (meta_attr.r#type == MetaAttributeType::Map
                && source == Some(MetaAttributeType::Skip))
                || (meta_attr.r#type == MetaAttributeType::Skip
                    && seen.contains(&MetaAttributeType::Map))
            {
                return Err(Error::new(
                    meta_attr.span(),
                    "nmea0183-decoder-derive: Attribute `map` cannot be used with `skip`",
                ));
            }

            Ok(meta_attr)
        })
        .collect()
}
