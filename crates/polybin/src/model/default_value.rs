// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field default values.
//!
//! A default starts out as JSON text attached to a field and is materialized
//! against the field's linked type when the schema is linked. Objects are JSON
//! maps keyed by field name; the reserved `"__TYPE"` key selects a subtype.

use super::error::LinkError;
use super::schema::Schema;
use super::types::{ClassRef, EnumRef, Type};
use crate::object::{DynamicObject, Object, Value};
use serde_json::Value as Json;
use std::sync::Arc;

/// JSON key naming the concrete class of an object default.
pub const TYPE_KEY: &str = "__TYPE";

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// JSON text, not yet checked against the field type.
    Unlinked(String),
    Bool(bool),
    /// Any integer width, range-checked at link time.
    Int(i64),
    Float(f64),
    String(String),
    Enum { ty: EnumRef, constant: String },
    /// List or array.
    List(Vec<DefaultValue>),
    Map(Vec<(DefaultValue, DefaultValue)>),
    /// Object literal; field ids resolved against `class` and its ancestors.
    Object {
        class: ClassRef,
        fields: Vec<(u16, DefaultValue)>,
    },
}

impl DefaultValue {
    pub fn is_linked(&self) -> bool {
        match self {
            DefaultValue::Unlinked(_) => false,
            DefaultValue::List(items) => items.iter().all(DefaultValue::is_linked),
            DefaultValue::Map(entries) => entries.iter().all(|(k, v)| k.is_linked() && v.is_linked()),
            DefaultValue::Object { fields, .. } => fields.iter().all(|(_, v)| v.is_linked()),
            _ => true,
        }
    }

    /// Parse `text` and materialize it against `typ`.
    pub(crate) fn link(text: &str, typ: &Type, schema: &Schema, field: &str) -> Result<Self, LinkError> {
        let json: Json = serde_json::from_str(text).map_err(|e| LinkError::InvalidDefault {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Materializer { schema, field }.value(&json, typ)
    }

    /// Runtime value for a field of type `typ`. None when the default does
    /// not fit the type or is still unlinked.
    pub fn to_value(&self, typ: &Type, schema: &Arc<Schema>) -> Option<Value> {
        Some(match (self, typ) {
            (DefaultValue::Bool(b), Type::Bool) => Value::Bool(*b),
            (DefaultValue::Int(i), Type::Int8) => Value::Int8(i8::try_from(*i).ok()?),
            (DefaultValue::Int(i), Type::Int16) => Value::Int16(i16::try_from(*i).ok()?),
            (DefaultValue::Int(i), Type::Int32) => Value::Int32(i32::try_from(*i).ok()?),
            (DefaultValue::Int(i), Type::Int64) => Value::Int64(*i),
            (DefaultValue::Float(f), Type::Float32) => Value::Float32(*f as f32),
            (DefaultValue::Float(f), Type::Float64) => Value::Float64(*f),
            (DefaultValue::String(s), Type::String) => Value::String(s.clone()),
            (DefaultValue::Enum { constant, .. }, Type::Enum(_)) => Value::Enum(constant.clone()),
            (DefaultValue::List(items), Type::List(e)) => Value::List(
                items
                    .iter()
                    .map(|i| i.to_value(e, schema))
                    .collect::<Option<_>>()?,
            ),
            (DefaultValue::List(items), Type::Array(e)) => Value::Array(
                items
                    .iter()
                    .map(|i| i.to_value(e, schema))
                    .collect::<Option<_>>()?,
            ),
            (DefaultValue::Map(entries), Type::Map(k, v)) => Value::Map(
                entries
                    .iter()
                    .map(|(a, b)| Some((a.to_value(k, schema)?, b.to_value(v, schema)?)))
                    .collect::<Option<_>>()?,
            ),
            (DefaultValue::Object { class, fields }, Type::Custom(_)) => {
                // Only the listed fields are set; the literal is the whole default.
                let mut obj = DynamicObject::bare(schema, *class)?;
                for (id, dv) in fields {
                    let field = schema.field_by_id(*class, *id)?;
                    let value = dv.to_value(field.typ(), schema)?;
                    obj.set_field(*id, value).ok()?;
                }
                Value::Object(Box::new(obj))
            }
            _ => return None,
        })
    }
}

struct Materializer<'s> {
    schema: &'s Schema,
    field: &'s str,
}

impl Materializer<'_> {
    fn invalid(&self, reason: impl Into<String>) -> LinkError {
        LinkError::InvalidDefault {
            field: self.field.to_string(),
            reason: reason.into(),
        }
    }

    fn mismatch(&self, json: &Json, typ: &Type) -> LinkError {
        self.invalid(format!("{} is not a valid {}", json, self.schema.type_name(typ)))
    }

    fn unresolved(&self, name: String) -> LinkError {
        LinkError::UnresolvedReference {
            name,
            context: self.field.to_string(),
        }
    }

    fn value(&self, json: &Json, typ: &Type) -> Result<DefaultValue, LinkError> {
        match typ {
            Type::Bool => json
                .as_bool()
                .map(DefaultValue::Bool)
                .ok_or_else(|| self.mismatch(json, typ)),
            Type::Int8 => self.int(json, typ, i8::MIN.into(), i8::MAX.into()),
            Type::Int16 => self.int(json, typ, i16::MIN.into(), i16::MAX.into()),
            Type::Int32 => self.int(json, typ, i32::MIN.into(), i32::MAX.into()),
            Type::Int64 => self.int(json, typ, i64::MIN, i64::MAX),
            Type::Float32 | Type::Float64 => json
                .as_f64()
                .map(DefaultValue::Float)
                .ok_or_else(|| self.mismatch(json, typ)),
            Type::String => json
                .as_str()
                .map(|s| DefaultValue::String(s.to_string()))
                .ok_or_else(|| self.mismatch(json, typ)),
            Type::Enum(r) => {
                let name = json.as_str().ok_or_else(|| self.mismatch(json, typ))?;
                self.enum_constant(*r, name)
            }
            Type::List(e) | Type::Array(e) => {
                let items = json.as_array().ok_or_else(|| self.mismatch(json, typ))?;
                items
                    .iter()
                    .map(|item| self.value(item, e))
                    .collect::<Result<Vec<_>, _>>()
                    .map(DefaultValue::List)
            }
            Type::Map(k, v) => {
                let obj = json.as_object().ok_or_else(|| self.mismatch(json, typ))?;
                obj.iter()
                    .map(|(key, val)| Ok((self.key(key, k)?, self.value(val, v)?)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(DefaultValue::Map)
            }
            Type::Custom(c) => self.object(json, *c),
            Type::Unlinked(name) => Err(self.unresolved(name.clone())),
        }
    }

    fn int(&self, json: &Json, typ: &Type, min: i64, max: i64) -> Result<DefaultValue, LinkError> {
        let i = json.as_i64().ok_or_else(|| self.mismatch(json, typ))?;
        if i < min || i > max {
            return Err(self.invalid(format!(
                "{} out of range for {}",
                i,
                self.schema.type_name(typ)
            )));
        }
        Ok(DefaultValue::Int(i))
    }

    /// JSON object keys are always strings; parse them as the key type.
    fn key(&self, key: &str, typ: &Type) -> Result<DefaultValue, LinkError> {
        let bad_key = || self.invalid(format!("map key '{}' is not a valid {}", key, self.schema.type_name(typ)));
        match typ {
            Type::String => Ok(DefaultValue::String(key.to_string())),
            Type::Bool => key.parse().map(DefaultValue::Bool).map_err(|_| bad_key()),
            Type::Int8 | Type::Int16 | Type::Int32 | Type::Int64 => {
                let i: i64 = key.parse().map_err(|_| bad_key())?;
                self.int(&Json::from(i), typ, int_min(typ), int_max(typ))
            }
            Type::Float32 | Type::Float64 => key.parse().map(DefaultValue::Float).map_err(|_| bad_key()),
            Type::Enum(r) => self.enum_constant(*r, key),
            _ => Err(bad_key()),
        }
    }

    fn enum_constant(&self, r: EnumRef, name: &str) -> Result<DefaultValue, LinkError> {
        let e = self
            .schema
            .enum_type(r)
            .ok_or_else(|| self.unresolved(format!("enum#{}", r.index())))?;
        if !e.contains(name) {
            return Err(self.unresolved(format!("{}.{}", e.name(), name)));
        }
        Ok(DefaultValue::Enum {
            ty: r,
            constant: name.to_string(),
        })
    }

    fn object(&self, json: &Json, declared: ClassRef) -> Result<DefaultValue, LinkError> {
        let obj = json
            .as_object()
            .ok_or_else(|| self.mismatch(json, &Type::Custom(declared)))?;

        let class = match obj.get(TYPE_KEY) {
            None => declared,
            Some(name) => {
                let name = name
                    .as_str()
                    .ok_or_else(|| self.invalid(format!("{} must be a type name", TYPE_KEY)))?;
                let class = self
                    .schema
                    .class_by_name(name)
                    .ok_or_else(|| self.unresolved(name.to_string()))?;
                if !self.schema.is_subclass_of(class, declared) {
                    return Err(self.invalid(format!(
                        "{} is not assignable to {}",
                        name,
                        self.schema.type_name(&Type::Custom(declared))
                    )));
                }
                class
            }
        };

        let mut fields = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            if key == TYPE_KEY {
                continue;
            }
            let field = self.schema.field_by_name(class, key).ok_or_else(|| {
                self.unresolved(format!("{}.{}", self.schema.type_name(&Type::Custom(class)), key))
            })?;
            fields.push((field.id(), self.value(val, field.typ())?));
        }
        Ok(DefaultValue::Object { class, fields })
    }
}

fn int_min(typ: &Type) -> i64 {
    match typ {
        Type::Int8 => i8::MIN.into(),
        Type::Int16 => i16::MIN.into(),
        Type::Int32 => i32::MIN.into(),
        _ => i64::MIN,
    }
}

fn int_max(typ: &Type) -> i64 {
    match typ {
        Type::Int8 => i8::MAX.into(),
        Type::Int16 => i16::MAX.into(),
        Type::Int32 => i32::MAX.into(),
        _ => i64::MAX,
    }
}
