// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class registry.
//!
//! Maps local ids, class names and 16-bit fingerprints to registered
//! classes. The registry is built once, before any decode, and is read-only
//! afterwards; share it by reference between readers and writers on any
//! number of threads.
//!
//! # Example
//!
//! ```
//! use polybin::model::{CustomType, Field, Schema, Type};
//! use polybin::ClassRegistry;
//! use std::sync::Arc;
//!
//! let mut schema = Schema::new();
//! schema.add_class(CustomType::new("demo.Point").with_field(Field::new("demo.Point", "x", Type::Int32)));
//! let schema = Arc::new(schema.link()?);
//!
//! let mut registry = ClassRegistry::new();
//! registry.register_schema(&schema)?;
//! assert!(registry.get_by_name("demo.Point").is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod entry;
mod lookup;

pub use entry::{ClassRegistryEntry, Constructor};
pub use lookup::{Capabilities, Capability, ClassLookup, RestrictedLookup};

use crate::hash::id_from_base64;
use crate::model::Schema;
use crate::object::{Object, ObjectType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{registry} does not support lookup by {capability}")]
    Unsupported {
        registry: String,
        capability: Capability,
    },

    #[error("invalid base64 type id '{0}'")]
    InvalidBase64Id(String),

    #[error("class {0} is not declared in the schema")]
    UnknownClass(String),

    #[error("registry has no schema to resolve {0} against")]
    NoSchema(String),

    #[error("schema must be linked before registration")]
    UnlinkedSchema,

    #[error("{class} has type id {declared:#06x} in the schema, not {registered:#06x}")]
    TypeHashMismatch {
        class: String,
        declared: u16,
        registered: u16,
    },
}

/// Index of registered classes.
///
/// Every [`register`](Self::register) call updates the local id, name and
/// fingerprint indices together. A later registration with a colliding key
/// evicts the earlier entry from every index, so each entry reachable by
/// one key is reachable by all of its keys.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    name: String,
    schema: Option<Arc<Schema>>,
    by_local_id: HashMap<u32, Arc<ClassRegistryEntry>>,
    by_name: HashMap<String, Arc<ClassRegistryEntry>>,
    by_fingerprint: HashMap<u16, Arc<ClassRegistryEntry>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::named("ClassRegistry")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Schema used by [`add`](Self::add) and [`register_type`](Self::register_type).
    #[must_use]
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    pub fn register(&mut self, entry: ClassRegistryEntry) {
        self.register_shared(Arc::new(entry));
    }

    fn register_shared(&mut self, entry: Arc<ClassRegistryEntry>) {
        let mut displaced: Vec<Arc<ClassRegistryEntry>> = Vec::new();
        let holders = std::iter::once(self.by_local_id.get(&entry.local_id()))
            .chain(std::iter::once(self.by_name.get(entry.class_name())))
            .chain(entry.fingerprints().iter().map(|id| self.by_fingerprint.get(id)));
        for old in holders.flatten() {
            if !displaced.iter().any(|d| Arc::ptr_eq(d, old)) {
                displaced.push(Arc::clone(old));
            }
        }
        for old in &displaced {
            self.evict(old);
        }

        self.by_local_id.insert(entry.local_id(), Arc::clone(&entry));
        self.by_name
            .insert(entry.class_name().to_string(), Arc::clone(&entry));
        for id in entry.fingerprints() {
            self.by_fingerprint.insert(*id, Arc::clone(&entry));
        }
    }

    fn evict(&mut self, old: &Arc<ClassRegistryEntry>) {
        if self.by_local_id.get(&old.local_id()).is_some_and(|e| Arc::ptr_eq(e, old)) {
            self.by_local_id.remove(&old.local_id());
        }
        if self.by_name.get(old.class_name()).is_some_and(|e| Arc::ptr_eq(e, old)) {
            self.by_name.remove(old.class_name());
        }
        for id in old.fingerprints() {
            if self.by_fingerprint.get(id).is_some_and(|e| Arc::ptr_eq(e, old)) {
                self.by_fingerprint.remove(id);
            }
        }
        log::debug!("[ClassRegistry] {}: {} replaced", self.name, old);
    }

    /// Register `class_name` of the attached schema.
    ///
    /// `type_hash16` must be the class's type id in that schema; overrides
    /// belong on the class itself ([`CustomType::with_type_id`]) so that
    /// ancestry and field constraints agree with the registry.
    ///
    /// [`CustomType::with_type_id`]: crate::model::CustomType::with_type_id
    pub fn add(
        &mut self,
        local_id: u32,
        class_name: &str,
        type_hash16: u16,
        ctor: Constructor,
    ) -> Result<(), RegistryError> {
        let schema = self.require_schema(class_name)?;
        let class = schema
            .class_by_name(class_name)
            .ok_or_else(|| RegistryError::UnknownClass(class_name.to_string()))?;
        let entry = ClassRegistryEntry::new(local_id, &schema, class, ctor)
            .ok_or_else(|| RegistryError::UnknownClass(class_name.to_string()))?;
        if entry.type_hash16() != type_hash16 {
            return Err(RegistryError::TypeHashMismatch {
                class: class_name.to_string(),
                declared: entry.type_hash16(),
                registered: type_hash16,
            });
        }
        self.register(entry);
        Ok(())
    }

    /// Register a generated type against the attached schema.
    pub fn register_type<T: ObjectType>(&mut self, local_id: u32) -> Result<(), RegistryError> {
        let schema = self.require_schema(T::CLASS_NAME)?;
        let entry = ClassRegistryEntry::for_type::<T>(local_id, &schema)
            .ok_or_else(|| RegistryError::UnknownClass(T::CLASS_NAME.to_string()))?;
        self.register(entry);
        Ok(())
    }

    /// Register every class of a linked schema with a [`DynamicObject`]
    /// constructor. Local ids continue after the highest one in use.
    ///
    /// [`DynamicObject`]: crate::object::DynamicObject
    pub fn register_schema(&mut self, schema: &Arc<Schema>) -> Result<(), RegistryError> {
        if !schema.is_linked() {
            return Err(RegistryError::UnlinkedSchema);
        }
        let base = self.by_local_id.keys().max().map_or(0, |id| id + 1);
        for (offset, (class, descriptor)) in (0u32..).zip(schema.classes()) {
            let entry = ClassRegistryEntry::dynamic(base + offset, schema, class)
                .ok_or_else(|| RegistryError::UnknownClass(descriptor.name().to_string()))?;
            self.register(entry);
        }
        if self.schema.is_none() {
            self.schema = Some(Arc::clone(schema));
        }
        log::debug!(
            "[ClassRegistry] {}: registered {} classes from schema",
            self.name,
            schema.class_count()
        );
        Ok(())
    }

    /// Merge every entry of `other`. Colliding keys take `other`'s entry.
    pub fn add_registry(&mut self, other: &ClassRegistry) {
        for entry in other.entries() {
            self.register_shared(Arc::clone(entry));
        }
        if self.schema.is_none() {
            self.schema = other.schema.clone();
        }
    }

    pub fn get_by_name(&self, class_name: &str) -> Option<&Arc<ClassRegistryEntry>> {
        self.by_name.get(class_name)
    }

    pub fn get_by_local_id(&self, local_id: u32) -> Option<&Arc<ClassRegistryEntry>> {
        self.by_local_id.get(&local_id)
    }

    pub fn get_by_type_hash(&self, type_hash16: u16) -> Option<&Arc<ClassRegistryEntry>> {
        self.by_fingerprint.get(&type_hash16)
    }

    /// First entry matching any of `ids`, tried in order.
    pub fn resolve_by_fingerprints(&self, ids: &[u16]) -> Option<&Arc<ClassRegistryEntry>> {
        ids.iter().find_map(|id| self.by_fingerprint.get(id))
    }

    pub fn instantiate(&self, entry: &ClassRegistryEntry) -> Box<dyn Object> {
        entry.construct()
    }

    /// True iff `entry`'s class is the class with `expected_hash16` or one of
    /// its subclasses.
    pub fn check_assignable(&self, entry: &ClassRegistryEntry, expected_hash16: u16) -> bool {
        entry.is_instance_of(expected_hash16)
    }

    /// Sorted local ids.
    pub fn registered_local_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_local_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted class names.
    pub fn registered_class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entries ordered by local id.
    pub fn entries(&self) -> Vec<&Arc<ClassRegistryEntry>> {
        let mut entries: Vec<_> = self.by_local_id.values().collect();
        entries.sort_by_key(|e| e.local_id());
        entries
    }

    pub fn len(&self) -> usize {
        self.by_local_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_local_id.is_empty()
    }

    fn require_schema(&self, class_name: &str) -> Result<Arc<Schema>, RegistryError> {
        let schema = self
            .schema
            .clone()
            .ok_or_else(|| RegistryError::NoSchema(class_name.to_string()))?;
        if !schema.is_linked() {
            return Err(RegistryError::UnlinkedSchema);
        }
        Ok(schema)
    }
}

impl ClassLookup for ClassRegistry {
    fn lookup_name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn local_id_from_ids16(&self, ids: &[u16]) -> Result<Option<u32>, RegistryError> {
        Ok(self.resolve_by_fingerprints(ids).map(|e| e.local_id()))
    }

    fn local_id_from_names(&self, names: &[&str]) -> Result<Option<u32>, RegistryError> {
        Ok(names
            .iter()
            .find_map(|n| self.get_by_name(n))
            .map(|e| e.local_id()))
    }

    fn local_id_from_base64_ids(&self, ids: &[&str]) -> Result<Option<u32>, RegistryError> {
        let ids = ids
            .iter()
            .map(|text| id_from_base64(text).ok_or_else(|| RegistryError::InvalidBase64Id(text.to_string())))
            .collect::<Result<Vec<u16>, _>>()?;
        self.local_id_from_ids16(&ids)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("name", &self.name)
            .field("classes", &self.registered_class_names())
            .finish()
    }
}

impl fmt::Display for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} classes)", self.name, self.len())?;
        for entry in self.entries() {
            writeln!(f, "  {}", entry)?;
        }
        Ok(())
    }
}
