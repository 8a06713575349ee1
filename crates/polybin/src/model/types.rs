// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type variants, enum types and custom (class) types.
//!
//! Named types live in a [`Schema`](super::Schema) arena and are referenced by
//! index ([`ClassRef`], [`EnumRef`]), so classes that reference each other
//! cyclically never form ownership cycles. Before linking, a named reference is
//! a [`Type::Unlinked`] placeholder holding the fully-qualified name.

use super::field::Field;
use super::tag::TypeTag;
use crate::hash::hash16;
use std::fmt;

/// Index of a custom type inside its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef(u32);

/// Index of an enum type inside its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumRef(u32);

impl ClassRef {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl EnumRef {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Field type.
///
/// `List` and `Array` share a wire tag. `Unlinked` only exists between
/// schema parsing and [`Schema::link`](super::Schema::link).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    List(Box<Type>),
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Enum(EnumRef),
    Custom(ClassRef),
    /// Reference to a named enum or custom type, not yet resolved.
    Unlinked(String),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    /// Placeholder for a named enum or custom type.
    pub fn named(name: impl Into<String>) -> Self {
        Type::Unlinked(name.into())
    }

    /// Wire tag of this type. None while unlinked.
    pub fn tag(&self) -> Option<TypeTag> {
        Some(match self {
            Type::Bool => TypeTag::Bool,
            Type::Int8 => TypeTag::Int8,
            Type::Int16 => TypeTag::Int16,
            Type::Int32 => TypeTag::Int32,
            Type::Int64 => TypeTag::Int64,
            Type::Float32 => TypeTag::Float32,
            Type::Float64 => TypeTag::Float64,
            Type::String | Type::Enum(_) => TypeTag::String,
            Type::List(_) | Type::Array(_) => TypeTag::List,
            Type::Map(..) => TypeTag::Map,
            Type::Custom(_) => TypeTag::Custom,
            Type::Unlinked(_) => return None,
        })
    }

    /// True iff no nested reference is still a name.
    pub fn is_linked(&self) -> bool {
        match self {
            Type::List(e) | Type::Array(e) => e.is_linked(),
            Type::Map(k, v) => k.is_linked() && v.is_linked(),
            Type::Unlinked(_) => false,
            _ => true,
        }
    }

    /// Element type of a list or array.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(e) | Type::Array(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::Int8
                | Type::Int16
                | Type::Int32
                | Type::Int64
                | Type::Float32
                | Type::Float64
        )
    }
}

/// Renders without schema context; named types show their arena index.
/// Use [`Schema::type_name`](super::Schema::type_name) for full names.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Int8 => f.write_str("int8"),
            Type::Int16 => f.write_str("int16"),
            Type::Int32 => f.write_str("int32"),
            Type::Int64 => f.write_str("int64"),
            Type::Float32 => f.write_str("float32"),
            Type::Float64 => f.write_str("float64"),
            Type::String => f.write_str("string"),
            Type::List(e) => write!(f, "list[{}]", e),
            Type::Array(e) => write!(f, "array[{}]", e),
            Type::Map(k, v) => write!(f, "map[{}, {}]", k, v),
            Type::Enum(r) => write!(f, "enum#{}", r.0),
            Type::Custom(r) => write!(f, "class#{}", r.0),
            Type::Unlinked(name) => write!(f, "{}?", name),
        }
    }
}

/// Enumeration: a finite ordered set of named constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    constants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    pub fn contains(&self, constant: &str) -> bool {
        self.constants.iter().any(|c| c == constant)
    }

    pub fn ordinal(&self, constant: &str) -> Option<usize> {
        self.constants.iter().position(|c| c == constant)
    }
}

/// Custom type: a named class with fields, an optional super type and a
/// 16-bit type id.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomType {
    name: String,
    type_id16: u16,
    super_type: Option<Type>,
    fields: Vec<Field>,
}

impl CustomType {
    /// New class whose type id is the 16-bit hash of `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_id16: hash16(&name),
            name,
            super_type: None,
            fields: Vec::new(),
        }
    }

    /// Override the hashed type id.
    #[must_use]
    pub fn with_type_id(mut self, id: u16) -> Self {
        self.type_id16 = id;
        self
    }

    /// Set the super type, usually `Type::named("pkg.Base")`.
    #[must_use]
    pub fn extends(mut self, super_type: Type) -> Self {
        self.super_type = Some(super_type);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last dot-separated segment of the name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn type_id16(&self) -> u16 {
        self.type_id16
    }

    pub fn has_type_id_override(&self) -> bool {
        self.type_id16 != hash16(&self.name)
    }

    pub fn super_type(&self) -> Option<&Type> {
        self.super_type.as_ref()
    }

    /// Fields declared on this class (inherited fields excluded).
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_linked(&self) -> bool {
        self.super_type.as_ref().map_or(true, Type::is_linked)
            && self.fields.iter().all(Field::is_linked)
    }

    /// Same class with other linked parts; used by the linker.
    pub(crate) fn transform(&self, super_type: Option<Type>, fields: Vec<Field>) -> Self {
        Self {
            name: self.name.clone(),
            type_id16: self.type_id16,
            super_type,
            fields,
        }
    }
}
