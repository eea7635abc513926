use crate::arg_macros::impl_arguments_for_tuple;
use crate::value::Value;

/// An ordered argument list that can be turned into cache key input.
pub trait Arguments {
    fn to_values(&self) -> Vec<Value>;
}

impl Arguments for () {
    fn to_values(&self) -> Vec<Value> {
        Vec::new()
    }
}

impl Arguments for Vec<Value> {
    fn to_values(&self) -> Vec<Value> {
        self.clone()
    }
}

impl<const N: usize> Arguments for [Value; N] {
    fn to_values(&self) -> Vec<Value> {
        self.to_vec()
    }
}

impl_arguments_for_tuple!(A);
impl_arguments_for_tuple!(A, B);
impl_arguments_for_tuple!(A, B, C);
impl_arguments_for_tuple!(A, B, C, D);
impl_arguments_for_tuple!(A, B, C, D, E);
impl_arguments_for_tuple!(A, B, C, D, E, F);
impl_arguments_for_tuple!(A, B, C, D, E, F, G);
impl_arguments_for_tuple!(A, B, C, D, E, F, G, H);
