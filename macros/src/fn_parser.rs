use proc_macro2::Ident;
use syn::spanned::Spanned;
use syn::{FnArg, GenericArgument, ItemFn, Pat, PathArguments, ReturnType, Type};

pub struct ParamDef {
    pub name: Ident,
    pub tpe: Type,
}

pub enum ReturnKind {
    Plain(Type),
    Fallible { ok: Type, err: Type },
}

pub struct MemoSignature {
    pub params: Vec<ParamDef>,
    pub output: ReturnKind,
}

pub fn parse_signature(item_fn: &ItemFn) -> Result<MemoSignature, syn::Error> {
    let sig = &item_fn.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(asyncness.span(), "#[memoize] does not support async functions"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(sig.generics.span(), "#[memoize] needs concrete argument and result types, generic functions share no single cache"));
    }
    let params = sig.inputs.iter().map(parse_param).collect::<Result<Vec<_>, _>>()?;
    let output = match &sig.output {
        ReturnType::Default => ReturnKind::Plain(syn::parse_quote!(())),
        ReturnType::Type(_, ty) => {
            reject_impl_trait(ty)?;
            classify_return(ty)
        }
    };
    Ok(MemoSignature { params, output })
}

fn parse_param(arg: &FnArg) -> Result<ParamDef, syn::Error> {
    match arg {
        FnArg::Receiver(receiver) => Err(syn::Error::new(
            receiver.self_token.span,
            "#[memoize] cannot wrap methods taking `self`, a cached result may only depend on the argument list",
        )),
        FnArg::Typed(pat_type) => {
            let name = match &*pat_type.pat {
                Pat::Ident(pat_ident) if pat_ident.by_ref.is_none() && pat_ident.subpat.is_none() => pat_ident.ident.clone(),
                other => return Err(syn::Error::new(other.span(), "#[memoize] arguments must be plain identifiers")),
            };
            let tpe = (*pat_type.ty).clone();
            if let Type::Reference(reference) = &tpe {
                return Err(syn::Error::new(reference.span(), "#[memoize] arguments must be owned types, references cannot be stored in a cache key"));
            }
            reject_impl_trait(&tpe)?;
            Ok(ParamDef { name, tpe })
        }
    }
}

fn reject_impl_trait(ty: &Type) -> Result<(), syn::Error> {
    match ty {
        Type::ImplTrait(_) => Err(syn::Error::new(ty.span(), "#[memoize] needs nameable types, `impl Trait` is not supported")),
        _ => Ok(()),
    }
}

// Only the two-parameter form is recognised; aliases like io::Result<T> are cached as plain values.
fn classify_return(ty: &Type) -> ReturnKind {
    if let Type::Path(tp) = ty {
        if let Some(seg) = tp.path.segments.last() {
            if seg.ident == "Result" {
                if let PathArguments::AngleBracketed(args) = &seg.arguments {
                    let types: Vec<&Type> = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(t) => Some(t),
                            _ => None,
                        })
                        .collect();
                    if let [ok, err] = types.as_slice() {
                        return ReturnKind::Fallible { ok: (*ok).clone(), err: (*err).clone() };
                    }
                }
            }
        }
    }
    ReturnKind::Plain(ty.clone())
}
