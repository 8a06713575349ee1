// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven objects.

use super::{Object, Value};
use crate::codec::CodecError;
use crate::model::{ClassRef, Field, Schema};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An instance of any linked schema class, holding field values by id.
///
/// Used where no generated struct exists: schema-only consumers, tooling,
/// and object-typed default values.
#[derive(Clone)]
pub struct DynamicObject {
    schema: Arc<Schema>,
    class: ClassRef,
    values: BTreeMap<u16, Value>,
}

impl DynamicObject {
    /// New instance with every field default applied.
    pub fn new(schema: &Arc<Schema>, class: ClassRef) -> Option<Self> {
        let mut obj = Self::bare(schema, class)?;
        for field in schema.all_fields(class) {
            if let Some(value) = field
                .default_value()
                .and_then(|dv| dv.to_value(field.typ(), schema))
            {
                obj.values.insert(field.id(), value);
            }
        }
        Some(obj)
    }

    /// New instance with no field set.
    pub fn bare(schema: &Arc<Schema>, class: ClassRef) -> Option<Self> {
        schema.class(class)?;
        Some(Self {
            schema: Arc::clone(schema),
            class,
            values: BTreeMap::new(),
        })
    }

    pub fn by_name(schema: &Arc<Schema>, class_name: &str) -> Option<Self> {
        Self::new(schema, schema.class_by_name(class_name)?)
    }

    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        let field = self.schema.field_by_name(self.class, field_name)?;
        self.values.get(&field.id())
    }

    pub fn get_by_id(&self, field_id: u16) -> Option<&Value> {
        self.values.get(&field_id)
    }

    /// Set a field by name. Null clears it.
    pub fn set(&mut self, field_name: &str, value: impl Into<Value>) -> Result<(), CodecError> {
        let id = self.field(field_name)?.id();
        self.set_field(id, value.into())?;
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field_name: &str, value: impl Into<Value>) -> Result<Self, CodecError> {
        self.set(field_name, value)?;
        Ok(self)
    }

    pub fn unset(&mut self, field_name: &str) -> Option<Value> {
        let id = self.schema.field_by_name(self.class, field_name)?.id();
        self.values.remove(&id)
    }

    fn field(&self, field_name: &str) -> Result<&Field, CodecError> {
        self.schema
            .field_by_name(self.class, field_name)
            .ok_or_else(|| CodecError::InvalidValue(format!("{} has no field '{}'", self.class_name(), field_name)))
    }
}

impl Object for DynamicObject {
    fn class_name(&self) -> &str {
        self.schema.class(self.class).map_or("", |c| c.name())
    }

    fn present_fields(&self) -> Vec<(u16, Value)> {
        self.values.iter().map(|(id, v)| (*id, v.clone())).collect()
    }

    fn set_field(&mut self, field_id: u16, value: Value) -> Result<bool, CodecError> {
        let Some(field) = self.schema.field_by_id(self.class, field_id) else {
            return Ok(false);
        };
        if value.is_null() {
            self.values.remove(&field_id);
            return Ok(true);
        }
        if !value.conforms_to(field.typ(), &self.schema) {
            return Err(CodecError::UnexpectedType {
                expected: self.schema.type_name(field.typ()),
                found: value.kind_name(),
            });
        }
        self.values.insert(field_id, value);
        Ok(true)
    }

    fn is_field_set(&self, field_id: u16) -> bool {
        self.values.contains_key(&field_id)
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class_name());
        for (id, value) in &self.values {
            match self.schema.field_by_id(self.class, *id) {
                Some(field) => s.field(field.name(), value),
                None => s.field("?", value),
            };
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomType, EnumType, Type, FLAG_REQUIRED};

    fn schema() -> Arc<Schema> {
        let mut s = Schema::new();
        s.add_enum(EnumType::new("demo.Level", ["LOW", "HIGH"]));
        s.add_class(
            CustomType::new("demo.Task")
                .with_field(Field::new("demo.Task", "title", Type::String).with_flag(FLAG_REQUIRED))
                .with_field(Field::new("demo.Task", "level", Type::named("demo.Level")).with_default("\"LOW\""))
                .with_field(Field::new("demo.Task", "sub", Type::named("demo.Task")).with_default(r#"{"title": "child"}"#)),
        );
        Arc::new(s.link().expect("link"))
    }

    #[test]
    fn test_defaults_applied() {
        let s = schema();
        let task = DynamicObject::by_name(&s, "demo.Task").expect("class");
        assert_eq!(task.get("level"), Some(&Value::Enum("LOW".into())));
        assert_eq!(task.get("title"), None);

        let sub = task.get("sub").and_then(Value::as_object).expect("object default");
        assert_eq!(sub.class_name(), "demo.Task");
        assert_eq!(sub.present_fields().len(), 1);
    }

    #[test]
    fn test_set_validates_type() {
        let s = schema();
        let mut task = DynamicObject::by_name(&s, "demo.Task").expect("class");
        task.set("title", "write docs").expect("set");
        assert_eq!(task.get("title"), Some(&Value::String("write docs".into())));
        assert!(matches!(
            task.set("title", 5i32),
            Err(CodecError::UnexpectedType { .. })
        ));
        assert!(matches!(task.set("nope", 5i32), Err(CodecError::InvalidValue(_))));
    }

    #[test]
    fn test_null_clears() {
        let s = schema();
        let mut task = DynamicObject::by_name(&s, "demo.Task").expect("class");
        assert!(task.is_field_set(crate::hash::hash16("level")));
        task.set("level", Value::Null).expect("clear");
        assert!(task.get("level").is_none());
        assert_eq!(task.unset("sub").map(|v| v.tag()), Some(Some(crate::model::TypeTag::Custom)));
    }

    #[test]
    fn test_debug_uses_field_names() {
        let s = schema();
        let task = DynamicObject::bare(&s, s.class_by_name("demo.Task").expect("class"))
            .expect("bare")
            .with("title", "x")
            .expect("set");
        assert_eq!(format!("{:?}", task), "demo.Task { title: String(\"x\") }");
    }
}
