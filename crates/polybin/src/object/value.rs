// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values exchanged between the codec and objects.

use super::{downcast, Object, ObjectType};
use crate::codec::CodecError;
use crate::model::{Schema, Type, TypeTag};

/// A field value.
///
/// Enums carry their constant name; an unknown constant read from the wire
/// becomes [`UNKNOWN_ENUM_CONSTANT`](crate::config::UNKNOWN_ENUM_CONSTANT).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Object(Box<dyn Object>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wire tag this value would be written with. None for null.
    pub fn tag(&self) -> Option<TypeTag> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int8(_) => TypeTag::Int8,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::String(_) | Value::Enum(_) => TypeTag::String,
            Value::List(_) | Value::Array(_) => TypeTag::List,
            Value::Map(_) => TypeTag::Map,
            Value::Object(_) => TypeTag::Custom,
        })
    }

    /// Short description for error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Enum(c) => format!("enum constant {}", c),
            Value::Array(_) => "array".to_string(),
            Value::Object(o) => o.class_name().to_string(),
            other => other.tag().map_or("null", TypeTag::name).to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload of a string or enum value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or array.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) | Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Value::Object(o) => Some(o.as_ref()),
            _ => None,
        }
    }

    /// Downcast a nested object to its concrete type.
    pub fn into_typed<T: ObjectType>(self) -> Result<T, CodecError> {
        match self {
            Value::Object(o) => downcast::<T>(o).map(|b| *b),
            other => Err(mismatch(T::CLASS_NAME, &other)),
        }
    }

    /// Structural check against a schema type. Objects must be instances of
    /// the declared class or one of its subclasses.
    pub fn conforms_to(&self, typ: &Type, schema: &Schema) -> bool {
        match (self, typ) {
            (Value::Null, _) => true,
            (Value::Bool(_), Type::Bool)
            | (Value::Int8(_), Type::Int8)
            | (Value::Int16(_), Type::Int16)
            | (Value::Int32(_), Type::Int32)
            | (Value::Int64(_), Type::Int64)
            | (Value::Float32(_), Type::Float32)
            | (Value::Float64(_), Type::Float64)
            | (Value::String(_), Type::String) => true,
            (Value::Enum(_), Type::Enum(_)) => true,
            (Value::List(items) | Value::Array(items), Type::List(e) | Type::Array(e)) => {
                items.iter().all(|i| !i.is_null() && i.conforms_to(e, schema))
            }
            (Value::Map(entries), Type::Map(k, v)) => entries
                .iter()
                .all(|(a, b)| !a.is_null() && a.conforms_to(k, schema) && b.conforms_to(v, schema)),
            (Value::Object(o), Type::Custom(expected)) => schema
                .class_by_name(o.class_name())
                .map_or(false, |actual| schema.is_subclass_of(actual, *expected)),
            _ => false,
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> CodecError {
    CodecError::UnexpectedType {
        expected: expected.to_string(),
        found: found.kind_name(),
    }
}

/// Conversion out of a [`Value`], used by hand-written and generated
/// `set_field` implementations.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, CodecError>;
}

/// Conversion into a [`Value`], used by `present_fields` implementations.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, CodecError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_conversions!(bool, Bool, "bool");
impl_value_conversions!(i8, Int8, "int8");
impl_value_conversions!(i16, Int16, "int16");
impl_value_conversions!(i32, Int32, "int32");
impl_value_conversions!(i64, Int64, "int64");
impl_value_conversions!(f32, Float32, "float32");
impl_value_conversions!(f64, Float64, "float64");
impl_value_conversions!(String, String, "string");

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Box<dyn Object> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Object(o) => Ok(o),
            other => Err(mismatch("object", &other)),
        }
    }
}

impl IntoValue for Box<dyn Object> {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

/// Lists and arrays both convert.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::List(items) | Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

/// Null converts to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}
