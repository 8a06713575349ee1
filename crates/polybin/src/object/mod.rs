// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The object contract between the codec and schema-backed classes.
//!
//! The codec never inspects a class reflectively. Each class exposes its
//! serialized state as `(field id, Value)` pairs and accepts decoded values
//! through [`Object::set_field`]. Generated code implements [`Object`] on
//! plain structs; [`DynamicObject`] implements it for any linked schema class.

mod dynamic;
mod value;

pub use dynamic::DynamicObject;
pub use value::{FromValue, IntoValue, Value};

use crate::codec::CodecError;
use std::any::Any;
use std::fmt;

/// Cloning and downcasting support, implemented for every `Object + Clone`.
pub trait ObjectBase {
    fn clone_object(&self) -> Box<dyn Object>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Object + Clone> ObjectBase for T {
    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A serializable class instance.
pub trait Object: ObjectBase + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified class name, as registered in the class registry.
    fn class_name(&self) -> &str;

    /// Fields that currently hold a value, by field id. Fields without a
    /// value (absent optionals, null references) are left out.
    fn present_fields(&self) -> Vec<(u16, Value)>;

    /// Store a decoded value.
    ///
    /// Returns `Ok(false)` when the class has no field with this id, and an
    /// error when the value does not fit the field.
    fn set_field(&mut self, field_id: u16, value: Value) -> Result<bool, CodecError>;

    /// Whether the field currently holds a value.
    fn is_field_set(&self, field_id: u16) -> bool {
        self.present_fields().iter().any(|(id, _)| *id == field_id)
    }
}

/// A statically known class, readable with
/// [`BinaryReader::read_typed`](crate::BinaryReader::read_typed).
pub trait ObjectType: Object + Clone + Default {
    const CLASS_NAME: &'static str;
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

/// Objects are equal when they have the same class and the same present
/// field values.
impl PartialEq for dyn Object {
    fn eq(&self, other: &Self) -> bool {
        if self.class_name() != other.class_name() {
            return false;
        }
        let mut a = self.present_fields();
        let mut b = other.present_fields();
        a.sort_by_key(|(id, _)| *id);
        b.sort_by_key(|(id, _)| *id);
        a == b
    }
}

/// Move a boxed object into its concrete type.
pub fn downcast<T: Object>(obj: Box<dyn Object>) -> Result<Box<T>, CodecError> {
    let found = obj.class_name().to_string();
    obj.into_any()
        .downcast::<T>()
        .map_err(|_| CodecError::UnexpectedType {
            expected: std::any::type_name::<T>().to_string(),
            found,
        })
}
