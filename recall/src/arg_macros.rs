/// Builds the ordered argument list of a call: `args![1, "a", vec![2, 3]]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToValue::to_value(&$arg)),+]
    };
}

macro_rules! impl_arguments_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: $crate::ToValue),+> $crate::Arguments for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_values(&self) -> Vec<$crate::Value> {
                let ($($name,)+) = self;
                vec![$($crate::ToValue::to_value($name)),+]
            }
        }
    };
}

macro_rules! impl_to_value_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: $crate::ToValue),+> $crate::ToValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_value(&self) -> $crate::Value {
                let ($($name,)+) = self;
                $crate::Value::Tuple(vec![$($crate::ToValue::to_value($name)),+])
            }
        }
    };
}

pub(crate) use impl_arguments_for_tuple;
pub(crate) use impl_to_value_for_tuple;
