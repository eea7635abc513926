use crate::error::MemoError;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical, hashable form of a single argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Unit,
    Bool(bool),
    Int(i128),
    Float(u64),
    Char(char),
    Str(Box<str>),
    Bytes(Box<[u8]>),
    Optional(Option<Box<KeyPart>>),
    Tuple(Box<[KeyPart]>),
    List(Box<[KeyPart]>),
    Set(Box<[KeyPart]>),
    Map(Box<[(KeyPart, KeyPart)]>),
}

impl KeyPart {
    fn from_value(value: &Value, position: usize) -> Result<Self, MemoError> {
        let part = match value {
            Value::Unit => KeyPart::Unit,
            Value::Bool(b) => KeyPart::Bool(*b),
            Value::Int(i) => KeyPart::Int(*i),
            Value::Float(x) => KeyPart::Float(float_bits(*x, position)?),
            Value::Char(c) => KeyPart::Char(*c),
            Value::Str(s) => KeyPart::Str(s.as_str().into()),
            Value::Bytes(b) => KeyPart::Bytes(b.as_slice().into()),
            Value::Optional(inner) => match inner {
                Some(v) => KeyPart::Optional(Some(Box::new(Self::from_value(v, position)?))),
                None => KeyPart::Optional(None),
            },
            Value::Tuple(items) => KeyPart::Tuple(Self::from_values(items, position)?),
            Value::List(items) => KeyPart::List(Self::from_values(items, position)?),
            Value::Set(items) => {
                let mut parts = Self::from_values(items, position)?.into_vec();
                parts.sort();
                parts.dedup();
                KeyPart::Set(parts.into_boxed_slice())
            }
            Value::Map(entries) => {
                // later duplicates replace earlier ones, the same way a map literal would
                let mut sorted = BTreeMap::new();
                for (k, v) in entries {
                    sorted.insert(Self::from_value(k, position)?, Self::from_value(v, position)?);
                }
                KeyPart::Map(sorted.into_iter().collect())
            }
            Value::Opaque(type_name) => {
                return Err(MemoError::non_hashable(position, format!("{} has no structural equality", type_name)))
            }
        };
        Ok(part)
    }

    fn from_values(values: &[Value], position: usize) -> Result<Box<[KeyPart]>, MemoError> {
        values.iter().map(|v| Self::from_value(v, position)).collect()
    }
}

fn float_bits(x: f64, position: usize) -> Result<u64, MemoError> {
    if x.is_nan() {
        Err(MemoError::non_hashable(position, "NaN is not equal to itself"))
    } else if x == 0.0 {
        Ok(0.0f64.to_bits())
    } else {
        Ok(x.to_bits())
    }
}

/// Ordered, immutable key built from the full argument list of one call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    parts: Box<[KeyPart]>,
}

impl CacheKey {
    /// Canonicalizes `args` positionally. Zero arguments give the single
    /// empty key; any argument without stable equality fails the whole build.
    pub fn build(args: &[Value]) -> Result<Self, MemoError> {
        let parts = args
            .iter()
            .enumerate()
            .map(|(position, value)| KeyPart::from_value(value, position))
            .collect::<Result<Box<[KeyPart]>, MemoError>>()?;
        Ok(CacheKey { parts })
    }

    pub fn empty() -> Self {
        CacheKey { parts: Box::new([]) }
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Unit => write!(f, "()"),
            KeyPart::Bool(b) => write!(f, "{}", b),
            KeyPart::Int(i) => write!(f, "{}", i),
            KeyPart::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            KeyPart::Char(c) => write!(f, "{:?}", c),
            KeyPart::Str(s) => write!(f, "{:?}", s),
            KeyPart::Bytes(b) => write!(f, "bytes[{}]", b.len()),
            KeyPart::Optional(Some(v)) => write!(f, "Some({})", v),
            KeyPart::Optional(None) => write!(f, "None"),
            KeyPart::Tuple(items) => write!(f, "({})", join(items)),
            KeyPart::List(items) => write!(f, "[{}]", join(items)),
            KeyPart::Set(items) => write!(f, "{{{}}}", join(items)),
            KeyPart::Map(entries) => {
                let body: Vec<String> = entries.iter().map(|(k, v)| format!("{} => {}", k, v)).collect();
                write!(f, "{{{}}}", body.join(", "))
            }
        }
    }
}

fn join(parts: &[KeyPart]) -> String {
    parts.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join(&self.parts))
    }
}
