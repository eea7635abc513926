use crate::fn_parser::{self, ReturnKind};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Expr, ExprLit, ItemFn, Lit, MetaNameValue};

#[derive(Default)]
pub struct MemoizeAttr {
    pub at_most: Option<usize>,
    pub id: Option<String>,
}

impl Parse for MemoizeAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attr = MemoizeAttr::default();
        let options = Punctuated::<MetaNameValue, Comma>::parse_terminated(input)?;
        for option in options {
            let lit = match &option.value {
                Expr::Lit(ExprLit { lit, .. }) => lit,
                other => return Err(syn::Error::new_spanned(other, "Expected a literal")),
            };
            if option.path.is_ident("at_most") {
                match lit {
                    Lit::Int(int) => {
                        let n = int.base10_parse::<usize>()?;
                        if n == 0 {
                            return Err(syn::Error::new_spanned(int, "at_most must be a positive integer"));
                        }
                        attr.at_most = Some(n);
                    }
                    _ => return Err(syn::Error::new_spanned(lit, "at_most expects an integer literal")),
                }
            } else if option.path.is_ident("id") {
                match lit {
                    Lit::Str(s) => attr.id = Some(s.value()),
                    _ => return Err(syn::Error::new_spanned(lit, "id expects a string literal")),
                }
            } else {
                return Err(syn::Error::new_spanned(&option.path, "unknown #[memoize] option, expected `at_most` or `id`"));
            }
        }
        Ok(attr)
    }
}

pub fn expand(attr: &MemoizeAttr, item_fn: &ItemFn) -> Result<TokenStream, syn::Error> {
    let signature = fn_parser::parse_signature(item_fn)?;
    let vis = &item_fn.vis;
    let fn_ident = &item_fn.sig.ident;
    let memo_ident = format_ident!("{}_memoized", fn_ident);
    let names: Vec<_> = signature.params.iter().map(|p| &p.name).collect();
    let types: Vec<_> = signature.params.iter().map(|p| &p.tpe).collect();

    let op_id = match &attr.id {
        Some(id) => quote! { #id },
        None => quote! { concat!(module_path!(), "::", stringify!(#fn_ident)) },
    };
    let at_most = match attr.at_most {
        Some(n) => quote! { ::core::option::Option::Some(#n) },
        None => quote! { ::core::option::Option::None },
    };
    let closure = quote! { |(#(#names,)*): (#(#types,)*)| #fn_ident(#(#names),*) };

    let (wrapper_ty, register) = match &signature.output {
        ReturnKind::Plain(ret) => (
            quote! { ::recall::MemoFn<(#(#types,)*), #ret> },
            quote! { registry.memoize(#op_id, #at_most, #closure) },
        ),
        ReturnKind::Fallible { ok, err } => (
            quote! { ::recall::TryMemoFn<(#(#types,)*), #ok, #err> },
            quote! { registry.memoize_fallible(#op_id, #at_most, #closure) },
        ),
    };

    Ok(quote! {
        #item_fn

        #[doc = concat!("Registers [`", stringify!(#fn_ident), "`] as a memoized operation and returns its cached wrapper.")]
        #vis fn #memo_ident(registry: &::recall::Registry) -> ::core::result::Result<#wrapper_ty, ::recall::MemoError> {
            #register
        }
    })
}
