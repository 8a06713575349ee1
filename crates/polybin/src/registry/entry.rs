// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::hash::id_to_base64;
use crate::model::{ClassRef, Schema};
use crate::object::{DynamicObject, Object, ObjectType};
use std::fmt;
use std::sync::Arc;

/// Zero-argument constructor of a registered class.
pub type Constructor = Arc<dyn Fn() -> Box<dyn Object> + Send + Sync>;

/// One registered class: its identities, its linked descriptor and a
/// constructor.
///
/// `ancestry` holds the 16-bit type ids of the class and its ancestors,
/// most-derived first. It is both the fingerprint list written for the
/// class and the basis of assignability checks.
#[derive(Clone)]
pub struct ClassRegistryEntry {
    local_id: u32,
    class_name: String,
    type_hash16: u16,
    fingerprints: Vec<u16>,
    ancestry: Vec<u16>,
    schema: Arc<Schema>,
    class: ClassRef,
    ctor: Constructor,
}

impl ClassRegistryEntry {
    /// Entry for `class` of `schema`. None if the class is not in the schema.
    pub fn new(local_id: u32, schema: &Arc<Schema>, class: ClassRef, ctor: Constructor) -> Option<Self> {
        let descriptor = schema.class(class)?;
        let type_hash16 = descriptor.type_id16();
        Some(Self {
            local_id,
            class_name: descriptor.name().to_string(),
            type_hash16,
            fingerprints: vec![type_hash16],
            ancestry: schema.type_ids16(class),
            schema: Arc::clone(schema),
            class,
            ctor,
        })
    }

    /// Entry for a generated type, constructed through `Default`.
    pub fn for_type<T: ObjectType>(local_id: u32, schema: &Arc<Schema>) -> Option<Self> {
        let class = schema.class_by_name(T::CLASS_NAME)?;
        Self::new(local_id, schema, class, Arc::new(|| Box::new(T::default()) as Box<dyn Object>))
    }

    /// Entry whose instances are [`DynamicObject`]s with defaults applied.
    pub fn dynamic(local_id: u32, schema: &Arc<Schema>, class: ClassRef) -> Option<Self> {
        let prototype = DynamicObject::new(schema, class)?;
        Self::new(local_id, schema, class, Arc::new(move || Box::new(prototype.clone()) as Box<dyn Object>))
    }

    /// Also resolve this entry from `legacy_id`.
    #[must_use]
    pub fn with_alias(mut self, legacy_id: u16) -> Self {
        if !self.fingerprints.contains(&legacy_id) {
            self.fingerprints.push(legacy_id);
        }
        self
    }

    pub fn local_id(&self) -> u32 {
        self.local_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn type_hash16(&self) -> u16 {
        self.type_hash16
    }

    pub fn type_hash_base64(&self) -> String {
        id_to_base64(self.type_hash16)
    }

    /// Every 16-bit id that resolves to this entry.
    pub fn fingerprints(&self) -> &[u16] {
        &self.fingerprints
    }

    /// Type ids of the class and its ancestors, most-derived first.
    pub fn ancestry(&self) -> &[u16] {
        &self.ancestry
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn construct(&self) -> Box<dyn Object> {
        (self.ctor)()
    }

    /// True if the class is `type_hash16` or one of its subclasses.
    pub fn is_instance_of(&self, type_hash16: u16) -> bool {
        self.ancestry.contains(&type_hash16)
    }
}

impl fmt::Debug for ClassRegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistryEntry")
            .field("local_id", &self.local_id)
            .field("class_name", &self.class_name)
            .field("type_hash16", &format_args!("{:#06x}", self.type_hash16))
            .field("fingerprints", &self.fingerprints)
            .field("ancestry", &self.ancestry)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ClassRegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({:#06x}/{})",
            self.local_id,
            self.class_name,
            self.type_hash16,
            self.type_hash_base64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash16;
    use crate::model::{CustomType, Type};

    fn schema() -> Arc<Schema> {
        let mut s = Schema::new();
        s.add_class(CustomType::new("geo.Shape"));
        s.add_class(CustomType::new("geo.Circle").extends(Type::named("geo.Shape")));
        Arc::new(s.link().expect("link"))
    }

    #[test]
    fn test_entry_ancestry() {
        let s = schema();
        let circle = s.class_by_name("geo.Circle").expect("circle");
        let entry = ClassRegistryEntry::dynamic(2, &s, circle).expect("entry");
        assert_eq!(entry.class_name(), "geo.Circle");
        assert_eq!(entry.type_hash16(), hash16("geo.Circle"));
        assert_eq!(entry.ancestry(), [hash16("geo.Circle"), hash16("geo.Shape")]);
        assert!(entry.is_instance_of(hash16("geo.Shape")));
        assert!(!entry.is_instance_of(hash16("geo.Square")));
        assert_eq!(entry.construct().class_name(), "geo.Circle");
    }

    #[test]
    fn test_entry_aliases() {
        let s = schema();
        let shape = s.class_by_name("geo.Shape").expect("shape");
        let entry = ClassRegistryEntry::dynamic(1, &s, shape)
            .expect("entry")
            .with_alias(0x0BAD)
            .with_alias(0x0BAD);
        assert_eq!(entry.fingerprints(), [hash16("geo.Shape"), 0x0BAD]);
        assert_eq!(entry.ancestry(), [hash16("geo.Shape")]);
        assert_eq!(entry.to_string(), "1: geo.Shape (0x34fd/NP0)");
    }
}
