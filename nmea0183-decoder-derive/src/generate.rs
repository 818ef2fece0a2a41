use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Data, DataStruct, DeriveInput, Error, Fields, GenericArgument, Ident, PathArguments, Result,
    Type, TypePath,
};

use crate::meta::{MetaAttribute, MetaAttributeType, parse_field_level_attributes};

pub fn generate_from_fields_impl(input: &DeriveInput) -> Result<TokenStream> {
    let named = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(named),
            ..
        }) => &named.named,
        Data::Struct(_) => {
            return Err(Error::new(
                input.ident.span(),
                "nmea0183-decoder-derive: Only structs with named fields are supported",
            ));
        }
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "nmea0183-decoder-derive: Only structs are supported",
            ));
        }
    };

    let cursor = Ident::new("nmea_cursor", Span::call_site());
    let mut steps = Vec::with_capacity(named.len());
    let mut names = Vec::with_capacity(named.len());

    for field in named {
        let name = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(input.ident.span(), "nmea0183-decoder-derive: Unnamed field"))?;
        let attributes = parse_field_level_attributes(&field.attrs)?;
        let value = generate_field_step(&field.ty, &attributes, &cursor)?;

        steps.push(quote! { let #name = #value; });
        names.push(name);
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics nmea0183_decoder::FromFields for #name #ty_generics #where_clause {
            fn from_fields(
                #cursor: &mut nmea0183_decoder::FieldCursor<'_>,
            ) -> ::core::result::Result<Self, nmea0183_decoder::FieldError> {
                #(#steps)*
                ::core::result::Result::Ok(Self { #(#names),* })
            }
        }
    })
}

fn generate_field_step(
    ty: &Type,
    attributes: &[MetaAttribute],
    cursor: &Ident,
) -> Result<TokenStream> {
    let mut source = None;
    let mut map = None;

    for attribute in attributes {
        match attribute.r#type {
            MetaAttributeType::Map => map = Some(attribute.arg()?),
            _ => source = Some(attribute),
        }
    }

    let mut converts = false;
    let value = match source {
        None => quote! { <#ty as nmea0183_decoder::FieldParse>::from_cursor(#cursor)? },
        Some(attribute) => match attribute.r#type {
            MetaAttributeType::Skip => {
                return Ok(quote! {{
                    #cursor.skip();
                    <#ty as ::core::default::Default>::default()
                }});
            }
            MetaAttributeType::With => {
                let with = attribute.arg()?;
                quote! { (#with)(#cursor)? }
            }
            MetaAttributeType::Parser => {
                let parser = attribute.arg()?;
                if is_option(ty) {
                    quote! { #cursor.next_optional_with(#parser)? }
                } else {
                    quote! { #cursor.next_with(#parser)? }
                }
            }
            MetaAttributeType::ParseAs => {
                let parse_as = attribute.arg()?;
                converts = true;
                quote! { <#parse_as as nmea0183_decoder::FieldParse>::from_cursor(#cursor)? }
            }
            MetaAttributeType::Map => {
                return Err(Error::new(
                    attribute.span(),
                    "nmea0183-decoder-derive: `map` needs a value to transform",
                ));
            }
        },
    };

    Ok(match map {
        Some(map) => quote! { (#map)(#value) },
        None if converts => quote! { ::core::convert::Into::into(#value) },
        None => value,
    })
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return false;
    };

    path.segments.last().is_some_and(|segment| {
        segment.ident == "Option"
            && matches!(
                &segment.arguments,
                PathArguments::AngleBracketed(args)
                    if matches!(args.args.first(), Some(GenericArgument::Type(_)))
            )
    })
}
