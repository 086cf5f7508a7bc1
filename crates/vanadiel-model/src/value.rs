//! Dynamically typed attribute values.
//!
//! Parsers produce a small closed set of value kinds. Every value carries its
//! kind, so serializers and the fixes overlay dispatch on the variant rather
//! than on runtime type inspection.

use crate::Record;

/// A value stored under a [`Record`] key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed integer. All integer fields widen to `i64`.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Decoded text.
    String(String),
    /// Nested attribute map.
    Map(Record),
    /// Ordered list of values.
    List(Vec<Value>),
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Map,
    List,
}

impl Value {
    /// The kind tag of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Map(_) => ValueKind::Map,
            Value::List(_) => ValueKind::List,
        }
    }

    /// Try to get this value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as a float. Integers widen.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a nested record.
    #[inline]
    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable access to a nested record.
    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get this value as a list.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Mutable access to a list.
    #[inline]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    #[inline]
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Record> for Value {
    #[inline]
    fn from(v: Record) -> Self {
        Value::Map(v)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Map(m) => write!(f, "Map[{}]", m.len()),
            Value::List(l) => write!(f, "List[{}]", l.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7u16), Value::Int(7));
        assert_eq!(Value::from(-1i8), Value::Int(-1));
        assert_eq!(Value::from(2.5f32), Value::Float(2.5));
        assert_eq!(Value::from("Fire"), Value::String("Fire".into()));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_int(), None);
        assert_eq!(Value::String("a".into()).as_str(), Some("a"));
        assert_eq!(Value::List(vec![]).kind(), ValueKind::List);
    }
}
