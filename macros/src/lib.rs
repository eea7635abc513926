//! Declaration layer of recall: `#[memoize]` turns a free function into a registrable,
//! cache-backed operation without changing the function itself.
extern crate proc_macro;
mod fn_parser;
mod macro_utils;
mod memoize;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::{parse_macro_input, ItemFn};

/// Adds `<name>_memoized(&Registry)` next to the annotated function.
///
/// ```ignore
/// #[memoize(at_most = 100)]
/// fn distance(a: (i64, i64), b: (i64, i64)) -> f64 { ... }
///
/// let distance = distance_memoized(&registry)?;
/// distance.call(((0, 0), (3, 4)))?;
/// ```
///
/// Options: `at_most = <positive integer>` caps the number of distinct argument
/// sets stored, `id = "..."` replaces the default `module_path!()::name` identifier.
/// Functions returning `Result<T, E>` get a `TryMemoFn` that caches `Ok` values only.
#[proc_macro_attribute]
#[proc_macro_error]
pub fn memoize(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = parse_macro_input!(attr as memoize::MemoizeAttr);
    let item_fn = parse_macro_input!(item as ItemFn);
    let fn_ident = item_fn.sig.ident.clone();
    let stream = match memoize::expand(&attr_args, &item_fn) {
        Ok(stream) => stream,
        Err(e) => return e.to_compile_error().into(),
    };
    macro_utils::submit_fn_to_stream(stream, "memoize", &fn_ident, ".rs")
}
