// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptors.

use super::default_value::DefaultValue;
use super::types::Type;
use crate::hash::{hash16, id_to_base64};
use std::fmt;

pub const FLAG_REQUIRED: &str = "required";
pub const FLAG_POLYMORPHIC: &str = "polymorphic";
pub const FLAG_PARKED: &str = "parked";
pub const FLAG_TRANSIENT: &str = "transient";
pub const FLAG_STATIC: &str = "static";

/// A named, typed member of a custom type.
///
/// Immutable: the `transform_*` methods return a new field. The flag
/// projections are computed once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    owner: String,
    name: String,
    typ: Type,
    flags: Vec<String>,
    id: u16,
    default_value: Option<DefaultValue>,
    required: bool,
    polymorphic: bool,
    parked: bool,
    transient: bool,
    is_static: bool,
}

impl Field {
    /// New field with the hashed id and no flags.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, typ: Type) -> Self {
        let name = name.into();
        Self {
            owner: owner.into(),
            id: hash16(&name),
            name,
            typ,
            flags: Vec::new(),
            default_value: None,
            required: false,
            polymorphic: false,
            parked: false,
            transient: false,
            is_static: false,
        }
    }

    /// Add a flag. Unknown flags are kept and rendered but carry no meaning.
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        match flag.as_str() {
            FLAG_REQUIRED => self.required = true,
            FLAG_POLYMORPHIC => self.polymorphic = true,
            FLAG_PARKED => self.parked = true,
            FLAG_TRANSIENT => self.transient = true,
            FLAG_STATIC => self.is_static = true,
            _ => {}
        }
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }

    /// Replace the hashed id with an explicit one.
    #[must_use]
    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Attach an unlinked default (JSON text), materialized at link time.
    #[must_use]
    pub fn with_default(mut self, json: impl Into<String>) -> Self {
        self.default_value = Some(DefaultValue::Unlinked(json.into()));
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Display form of the id: base64 of its big-endian bytes.
    pub fn id_base64(&self) -> String {
        id_to_base64(self.id)
    }

    /// True when the id differs from the hash of the name.
    pub fn has_id_override(&self) -> bool {
        self.id != hash16(&self.name)
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default_value.as_ref()
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the field travels on the wire at all.
    pub fn is_serialized(&self) -> bool {
        !(self.parked || self.transient || self.is_static)
    }

    pub fn is_linked(&self) -> bool {
        self.typ.is_linked() && self.default_value.as_ref().map_or(true, DefaultValue::is_linked)
    }

    /// Same field with another type.
    #[must_use]
    pub fn transform_type(&self, typ: Type) -> Field {
        Field {
            typ,
            ..self.clone()
        }
    }

    /// Same field with another default value.
    #[must_use]
    pub fn transform_default(&self, default_value: DefaultValue) -> Field {
        Field {
            default_value: Some(default_value),
            ..self.clone()
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (flags: [{}])", self.name, self.typ, self.flags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults_to_hashed_id() {
        let f = Field::new("demo.Person", "name", Type::String);
        assert_eq!(f.id(), hash16("name"));
        assert!(!f.has_id_override());
        assert!(f.is_serialized());
        assert!(!f.is_required());
        assert!(!f.has_default_value());
    }

    #[test]
    fn test_field_flags() {
        let f = Field::new("demo.Person", "secret", Type::String)
            .with_flag(FLAG_TRANSIENT)
            .with_flag(FLAG_REQUIRED)
            .with_flag("custom-annotation");
        assert!(f.is_transient());
        assert!(f.is_required());
        assert!(!f.is_serialized());
        assert_eq!(f.flags(), ["transient", "required", "custom-annotation"]);
    }

    #[test]
    fn test_field_id_override() {
        let f = Field::new("demo.Person", "id", Type::Int32).with_id(1);
        assert_eq!(f.id(), 1);
        assert!(f.has_id_override());
        assert_eq!(f.id_base64(), "AAE");

        // An explicit id equal to the hash is not an override.
        let same = Field::new("demo.Person", "id", Type::Int32).with_id(hash16("id"));
        assert!(!same.has_id_override());
        assert_eq!(same, Field::new("demo.Person", "id", Type::Int32));
    }

    #[test]
    fn test_field_transform_keeps_identity() {
        let f = Field::new("demo.Person", "friend", Type::named("demo.Person"))
            .with_flag(FLAG_POLYMORPHIC)
            .with_default("null");
        let g = f.transform_type(Type::Int32);
        assert_eq!(g.name(), "friend");
        assert_eq!(g.id(), f.id());
        assert!(g.is_polymorphic());
        assert_eq!(g.typ(), &Type::Int32);
        assert_eq!(f.typ(), &Type::named("demo.Person"));

        let h = g.transform_default(DefaultValue::Int(3));
        assert_eq!(h.default_value(), Some(&DefaultValue::Int(3)));
        assert!(h.is_linked());
    }

    #[test]
    fn test_field_display() {
        let f = Field::new("demo.Person", "tags", Type::list(Type::String)).with_flag(FLAG_REQUIRED);
        assert_eq!(f.to_string(), "tags: list[string] (flags: [required])");
    }
}
