// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[derive(Wire)]` for wirepack.
//!
//! Resolves the member-selection policy of a type at compile time and emits a
//! `Wire` impl that hands the ordered member list to `ObjectBuilder`. Flat
//! structs marked `#[wire(fixed)]` and fieldless `#[repr(int)]` enums get a
//! `FixedLayout` impl instead and are copied as raw bytes.

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DataEnum, DeriveInput, Field, Fields,
    Generics, Ident, LitStr, Member, Type, Visibility,
};

const SELECT_EXPLICIT: u8 = 0;
const SELECT_PUBLIC: u8 = 1;
const SELECT_NON_PUBLIC: u8 = 2;
const SELECT_ALL: u8 = 3;

/// Container-level `#[wire(...)]` options.
struct ContainerAttrs {
    reference: bool,
    fixed: bool,
    selection: u8,
}

/// Per-field override.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldOverride {
    None,
    Include,
    Skip,
}

/// One selected member.
struct MemberField {
    member: Member,
    name: String,
    ty: Type,
}

/// `#[derive(Wire)]` macro: generates a `wirepack::Wire` impl.
///
/// Container attributes:
/// - `#[wire(reference)]`: reference object, encoded with a presence flag
/// - `#[wire(fixed)]`: flat struct of fixed-layout members, copied as raw bytes
/// - `#[wire(select = "...")]`: member selection, any comma-separated mix of
///   `explicit`, `public`, `non_public`, `all` (default `all`); `fields` and
///   `properties` are accepted as `public`
///
/// Field attributes:
/// - `#[wire(include)]`: always encode this field
/// - `#[wire(skip)]`: never encode this field (it decodes as its default)
///
/// Object types decode through `Default`. Fieldless enums need an integer
/// `#[repr]`; their discriminant is the wire value.
///
/// Example:
/// ```ignore
/// use wirepack::Wire;
///
/// #[derive(Wire, Default)]
/// #[wire(reference, select = "public")]
/// pub struct Account {
///     pub id: u64,
///     pub owner: Option<String>,
///     cache: Vec<u8>,          // not public: not encoded
///     #[wire(include)]
///     revision: u32,           // forced in
/// }
///
/// #[derive(Wire, Clone, Copy)]
/// #[repr(u8)]
/// enum Color { Red = 1, Green = 2 }
/// ```
#[proc_macro_derive(Wire, attributes(wire))]
pub fn derive_wire(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let attrs = parse_container_attrs(&input.attrs)?;
    if attrs.reference && attrs.fixed {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`reference` and `fixed` are mutually exclusive",
        ));
    }

    match &input.data {
        Data::Struct(data) if attrs.fixed => expand_fixed_struct(input, &data.fields),
        Data::Struct(data) => expand_object(input, &attrs, &data.fields),
        Data::Enum(data) => {
            if attrs.reference || attrs.fixed {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "enums are always fixed-layout; `reference`/`fixed` do not apply",
                ));
            }
            expand_enum(input, data)
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "unions are not supported",
        )),
    }
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs {
        reference: false,
        fixed: false,
        selection: SELECT_ALL,
    };
    for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("reference") {
                out.reference = true;
                Ok(())
            } else if meta.path.is_ident("fixed") {
                out.fixed = true;
                Ok(())
            } else if meta.path.is_ident("select") {
                let lit: LitStr = meta.value()?.parse()?;
                out.selection = parse_selection(&lit)?;
                Ok(())
            } else {
                Err(meta.error("unknown container attribute; expected `reference`, `fixed` or `select`"))
            }
        })?;
    }
    Ok(out)
}

fn parse_selection(lit: &LitStr) -> syn::Result<u8> {
    let mut bits = SELECT_EXPLICIT;
    for mode in lit.value().split(',').map(str::trim) {
        bits |= match mode {
            "explicit" => SELECT_EXPLICIT,
            "public" | "fields" | "properties" => SELECT_PUBLIC,
            "non_public" => SELECT_NON_PUBLIC,
            "all" => SELECT_ALL,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!(
                        "unknown selection mode `{other}`; expected explicit, public, non_public or all"
                    ),
                ))
            }
        };
    }
    Ok(bits)
}

fn parse_field_override(field: &Field) -> syn::Result<FieldOverride> {
    let mut out = FieldOverride::None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("wire")) {
        attr.parse_nested_meta(|meta| {
            let next = if meta.path.is_ident("include") {
                FieldOverride::Include
            } else if meta.path.is_ident("skip") {
                FieldOverride::Skip
            } else {
                return Err(meta.error("unknown field attribute; expected `include` or `skip`"));
            };
            if out != FieldOverride::None && out != next {
                return Err(meta.error("`include` and `skip` are mutually exclusive"));
            }
            out = next;
            Ok(())
        })?;
    }
    Ok(out)
}

fn is_selected(field: &Field, selection: u8, over: FieldOverride) -> bool {
    match over {
        FieldOverride::Include => true,
        FieldOverride::Skip => false,
        FieldOverride::None => {
            let mode = if matches!(field.vis, Visibility::Public(_)) {
                SELECT_PUBLIC
            } else {
                SELECT_NON_PUBLIC
            };
            selection & mode != 0
        }
    }
}

fn member_of(index: usize, field: &Field) -> (Member, String) {
    match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (Member::Unnamed(index.into()), index.to_string()),
    }
}

fn add_bound(generics: &Generics, bound: TokenStream2) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#bound));
    }
    generics
}

// ============================================================================
// Objects
// ============================================================================

fn expand_object(
    input: &DeriveInput,
    attrs: &ContainerAttrs,
    fields: &Fields,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let mut members = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let over = parse_field_override(field)?;
        if is_selected(field, attrs.selection, over) {
            let (member, name) = member_of(index, field);
            members.push(MemberField {
                member,
                name,
                ty: field.ty.clone(),
            });
        }
    }

    let mut generics = add_bound(&input.generics, quote!(::wirepack::Wire));
    if !input.generics.params.is_empty() {
        // Decoding starts from `Default`; generic parameters must not block it.
        let (_, ty_generics, _) = input.generics.split_for_impl();
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#name #ty_generics: ::core::default::Default));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let reference = attrs.reference;
    let kind = if reference {
        quote!(::wirepack::ObjectKind::Reference)
    } else {
        quote!(::wirepack::ObjectKind::Value)
    };
    let selection = attrs.selection;

    let chain = members.iter().map(|m| {
        let MemberField { member, name, ty } = m;
        quote! {
            .member::<#ty>(#name, |v| &v.#member, |v| &mut v.#member)?
        }
    });

    Ok(quote! {
        impl #impl_generics ::wirepack::Wire for #name #ty_generics #where_clause {
            #[inline]
            fn shape() -> ::wirepack::Shape {
                ::wirepack::Shape::Object { reference: #reference }
            }

            fn build_processor(
                ctx: &mut ::wirepack::BuildContext<'_>,
            ) -> ::wirepack::Result<::wirepack::Processor<Self>> {
                ::wirepack::ObjectBuilder::<Self>::new(
                    ctx,
                    #kind,
                    ::wirepack::MemberSelection::from_bits(#selection),
                )
                #(#chain)*
                .build()
            }
        }
    })
}

// ============================================================================
// Fixed-layout structs
// ============================================================================

fn expand_fixed_struct(input: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    for field in fields.iter() {
        if parse_field_override(field)? != FieldOverride::None {
            return Err(syn::Error::new_spanned(
                field,
                "fixed-layout structs encode every field; `include`/`skip` do not apply",
            ));
        }
    }

    let tys: Vec<&Type> = fields.iter().map(|f| &f.ty).collect();
    let members: Vec<Member> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| member_of(i, f).0)
        .collect();
    let temps: Vec<Ident> = (0..tys.len()).map(|i| format_ident!("__f{}", i)).collect();

    let construct = match fields {
        Fields::Named(_) => quote!(Self { #(#members: #temps),* }),
        Fields::Unnamed(_) => quote!(Self(#(#temps),*)),
        Fields::Unit => quote!(Self),
    };

    let generics = add_bound(&input.generics, quote!(::wirepack::FixedLayout));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::wirepack::FixedLayout for #name #ty_generics #where_clause {
            const SIZE: usize = 0 #(+ <#tys as ::wirepack::FixedLayout>::SIZE)*;

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn write_to(&self, dst: &mut [u8]) {
                let mut offset = 0usize;
                #(
                    let size = <#tys as ::wirepack::FixedLayout>::SIZE;
                    ::wirepack::FixedLayout::write_to(&self.#members, &mut dst[offset..offset + size]);
                    offset += size;
                )*
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn read_from(src: &[u8]) -> ::wirepack::Result<Self> {
                let mut offset = 0usize;
                #(
                    let size = <#tys as ::wirepack::FixedLayout>::SIZE;
                    let #temps = <#tys as ::wirepack::FixedLayout>::read_from(&src[offset..offset + size])?;
                    offset += size;
                )*
                Ok(#construct)
            }
        }

        impl #impl_generics ::wirepack::Wire for #name #ty_generics #where_clause {
            #[inline]
            fn shape() -> ::wirepack::Shape {
                ::wirepack::Shape::Fixed {
                    size: <Self as ::wirepack::FixedLayout>::SIZE,
                }
            }

            fn build_processor(
                _ctx: &mut ::wirepack::BuildContext<'_>,
            ) -> ::wirepack::Result<::wirepack::Processor<Self>> {
                Ok(::wirepack::Processor::fixed())
            }
        }
    })
}

// ============================================================================
// Fieldless enums
// ============================================================================

fn repr_type(attrs: &[Attribute]) -> syn::Result<Option<Ident>> {
    const INTEGER_REPRS: &[&str] = &[
        "u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "usize", "isize",
    ];
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if INTEGER_REPRS.contains(&ident.to_string().as_str()) {
                    found = Some(ident.clone());
                }
            }
            // `repr(C)`, `repr(align(..))` and friends are not ours to judge.
            if meta.input.peek(syn::token::Paren) {
                let _content;
                syn::parenthesized!(_content in meta.input);
            }
            Ok(())
        })?;
    }
    Ok(found)
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic enums are not supported",
        ));
    }
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "only fieldless enums are supported; use a struct for data-carrying values",
            ));
        }
    }
    let Some(repr) = repr_type(&input.attrs)? else {
        return Err(syn::Error::new_spanned(
            name,
            "fieldless enums need an integer #[repr(..)] to fix their wire size",
        ));
    };

    let variants: Vec<&Ident> = data.variants.iter().map(|v| &v.ident).collect();
    let type_name = name.to_string();

    Ok(quote! {
        impl ::wirepack::FixedLayout for #name {
            const SIZE: usize = <#repr as ::wirepack::FixedLayout>::SIZE;

            #[inline]
            fn write_to(&self, dst: &mut [u8]) {
                let raw: #repr = match self {
                    #(Self::#variants => Self::#variants as #repr,)*
                };
                ::wirepack::FixedLayout::write_to(&raw, dst);
            }

            fn read_from(src: &[u8]) -> ::wirepack::Result<Self> {
                let raw = <#repr as ::wirepack::FixedLayout>::read_from(src)?;
                #(
                    if raw == Self::#variants as #repr {
                        return Ok(Self::#variants);
                    }
                )*
                Err(::wirepack::CodecError::InvalidValue {
                    type_name: #type_name,
                    reason: ::std::format!("unknown discriminant {}", raw),
                })
            }
        }

        impl ::wirepack::Wire for #name {
            #[inline]
            fn shape() -> ::wirepack::Shape {
                ::wirepack::Shape::Fixed {
                    size: <Self as ::wirepack::FixedLayout>::SIZE,
                }
            }

            fn build_processor(
                _ctx: &mut ::wirepack::BuildContext<'_>,
            ) -> ::wirepack::Result<::wirepack::Processor<Self>> {
                Ok(::wirepack::Processor::fixed())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(tokens: TokenStream2) -> syn::Result<String> {
        let input: DeriveInput = syn::parse2(tokens)?;
        expand(&input).map(|t| t.to_string())
    }

    #[test]
    fn test_selection_modes_combine() {
        let lit: LitStr = parse_quote!("public, non_public");
        assert_eq!(parse_selection(&lit).unwrap(), SELECT_ALL);
        let lit: LitStr = parse_quote!("explicit");
        assert_eq!(parse_selection(&lit).unwrap(), SELECT_EXPLICIT);
        let lit: LitStr = parse_quote!("everything");
        assert!(parse_selection(&lit).is_err());
    }

    #[test]
    fn test_public_selection_filters_members() {
        let out = derive(quote! {
            #[wire(select = "public")]
            struct S {
                pub a: u32,
                b: u32,
                #[wire(include)]
                c: u8,
                #[wire(skip)]
                pub d: u8,
            }
        })
        .unwrap();
        assert!(out.contains("\"a\""));
        assert!(!out.contains("\"b\""));
        assert!(out.contains("\"c\""));
        assert!(!out.contains("\"d\""));
    }

    #[test]
    fn test_conflicting_attributes_are_rejected() {
        assert!(derive(quote! {
            #[wire(reference, fixed)]
            struct S { a: u8 }
        })
        .is_err());
        assert!(derive(quote! {
            struct S { #[wire(include, skip)] a: u8 }
        })
        .is_err());
        assert!(derive(quote! {
            enum E { A, B }
        })
        .is_err());
        assert!(derive(quote! {
            #[repr(u8)]
            enum E { A(u8) }
        })
        .is_err());
    }

    #[test]
    fn test_repr_enum_is_fixed_layout() {
        let out = derive(quote! {
            #[repr(C, u16)]
            enum Mode { Off = 0, On = 7 }
        })
        .unwrap();
        assert!(out.contains("FixedLayout for Mode"));
        assert!(out.contains("as u16"));
    }
}
