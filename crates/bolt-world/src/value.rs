//! Typed argument values.

use std::collections::BTreeMap;

use crate::address::Pubkey;

/// A runtime value for one instruction argument.
///
/// Variants mirror [`FieldType`](crate::schema::FieldType); the codec
/// rejects any pairing that does not line up.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    F32(f32),
    F64(f64),
    PublicKey(Pubkey),
    Bytes(Vec<u8>),
    String(String),
    Option(Option<Box<ArgValue>>),
    Vec(Vec<ArgValue>),
    Array(Vec<ArgValue>),
}

impl ArgValue {
    pub fn none() -> Self {
        ArgValue::Option(None)
    }

    pub fn some(value: impl Into<ArgValue>) -> Self {
        ArgValue::Option(Some(Box::new(value.into())))
    }

    /// Short name of the variant, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::U8(_) => "u8",
            ArgValue::U16(_) => "u16",
            ArgValue::U32(_) => "u32",
            ArgValue::U64(_) => "u64",
            ArgValue::U128(_) => "u128",
            ArgValue::I8(_) => "i8",
            ArgValue::I16(_) => "i16",
            ArgValue::I32(_) => "i32",
            ArgValue::I64(_) => "i64",
            ArgValue::I128(_) => "i128",
            ArgValue::F32(_) => "f32",
            ArgValue::F64(_) => "f64",
            ArgValue::PublicKey(_) => "publicKey",
            ArgValue::Bytes(_) => "bytes",
            ArgValue::String(_) => "string",
            ArgValue::Option(_) => "option",
            ArgValue::Vec(_) => "vec",
            ArgValue::Array(_) => "array",
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(v: $ty) -> Self {
                    ArgValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    f32 => F32,
    f64 => F64,
    Pubkey => PublicKey,
    Vec<u8> => Bytes,
    String => String,
}

impl From<&[u8]> for ArgValue {
    fn from(v: &[u8]) -> Self {
        ArgValue::Bytes(v.to_vec())
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::String(v.to_string())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        ArgValue::Option(v.map(|inner| Box::new(inner.into())))
    }
}

/// Named arguments for one instruction call.
///
/// Ordered by name so that debug output is stable; encoding order always
/// follows the instruction's field list, never this map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(BTreeMap<String, ArgValue>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, ArgValue)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, ArgValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
