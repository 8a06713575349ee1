// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema arena and the two-pass linker.
//!
//! A [`Schema`] owns every custom and enum type of a compilation unit. Types
//! reference each other through [`ClassRef`]/[`EnumRef`] indices, which keeps
//! self-referencing and mutually recursive classes free of ownership cycles.
//!
//! [`Schema::link`] turns a freshly built schema into a linked one:
//!
//! 1. every [`Type::Unlinked`] name is resolved against the symbol table, for
//!    super types and field types alike;
//! 2. every JSON default is materialized against its (now linked) field type.
//!
//! Linking also rejects duplicate field ids across a class hierarchy, 16-bit
//! type id collisions and cyclic inheritance. Linking is pure: the input is
//! consumed and a new schema is returned, and an already linked schema is
//! returned unchanged.

use super::default_value::DefaultValue;
use super::error::LinkError;
use super::field::Field;
use super::types::{ClassRef, CustomType, EnumRef, EnumType, Type};
use crate::hash::hash64;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// A symbol table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedType {
    Class(ClassRef),
    Enum(EnumRef),
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: Vec<CustomType>,
    enums: Vec<EnumType>,
    names: HashMap<String, NamedType>,
    linked: bool,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom type. A later type with the same name shadows the
    /// earlier one in lookups and fails linking.
    pub fn add_class(&mut self, class: CustomType) -> ClassRef {
        let r = ClassRef::new(self.classes.len() as u32);
        self.names.insert(class.name().to_string(), NamedType::Class(r));
        self.classes.push(class);
        self.linked = false;
        r
    }

    pub fn add_enum(&mut self, e: EnumType) -> EnumRef {
        let r = EnumRef::new(self.enums.len() as u32);
        self.names.insert(e.name().to_string(), NamedType::Enum(r));
        self.enums.push(e);
        self.linked = false;
        r
    }

    pub fn class(&self, r: ClassRef) -> Option<&CustomType> {
        self.classes.get(r.index())
    }

    pub fn enum_type(&self, r: EnumRef) -> Option<&EnumType> {
        self.enums.get(r.index())
    }

    pub fn lookup(&self, name: &str) -> Option<NamedType> {
        self.names.get(name).copied()
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassRef> {
        match self.lookup(name)? {
            NamedType::Class(r) => Some(r),
            NamedType::Enum(_) => None,
        }
    }

    pub fn enum_by_name(&self, name: &str) -> Option<EnumRef> {
        match self.lookup(name)? {
            NamedType::Enum(r) => Some(r),
            NamedType::Class(_) => None,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassRef, &CustomType)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassRef::new(i as u32), c))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumRef, &EnumType)> {
        self.enums
            .iter()
            .enumerate()
            .map(|(i, e)| (EnumRef::new(i as u32), e))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Direct super class, if any and if linked.
    pub fn super_class(&self, r: ClassRef) -> Option<ClassRef> {
        match self.class(r)?.super_type()? {
            Type::Custom(s) => Some(*s),
            _ => None,
        }
    }

    /// `r` followed by its ancestors, most-derived first.
    pub fn ancestors(&self, r: ClassRef) -> Ancestors<'_> {
        Ancestors {
            schema: self,
            next: Some(r),
            remaining: self.classes.len(),
        }
    }

    /// Type ids of `r` and its ancestors, most-derived first. This is the
    /// fingerprint list written ahead of a polymorphic object.
    pub fn type_ids16(&self, r: ClassRef) -> Vec<u16> {
        self.ancestors(r).map(|(_, c)| c.type_id16()).collect()
    }

    /// True if `r` is `base` or inherits from it.
    pub fn is_subclass_of(&self, r: ClassRef, base: ClassRef) -> bool {
        self.ancestors(r).any(|(a, _)| a == base)
    }

    /// Declared and inherited fields, root ancestor's fields first.
    pub fn all_fields(&self, r: ClassRef) -> Vec<&Field> {
        let chain: Vec<&CustomType> = self.ancestors(r).map(|(_, c)| c).collect();
        chain.iter().rev().flat_map(|c| c.fields()).collect()
    }

    pub fn field_by_id(&self, r: ClassRef, id: u16) -> Option<&Field> {
        self.ancestors(r)
            .flat_map(|(_, c)| c.fields())
            .find(|f| f.id() == id)
    }

    pub fn field_by_name(&self, r: ClassRef, name: &str) -> Option<&Field> {
        self.ancestors(r)
            .flat_map(|(_, c)| c.fields())
            .find(|f| f.name() == name)
    }

    /// Human-readable type name with named references spelled out.
    pub fn type_name(&self, typ: &Type) -> String {
        match typ {
            Type::List(e) => format!("list[{}]", self.type_name(e)),
            Type::Array(e) => format!("array[{}]", self.type_name(e)),
            Type::Map(k, v) => format!("map[{}, {}]", self.type_name(k), self.type_name(v)),
            Type::Enum(r) => self
                .enum_type(*r)
                .map_or_else(|| typ.to_string(), |e| e.name().to_string()),
            Type::Custom(r) => self
                .class(*r)
                .map_or_else(|| typ.to_string(), |c| c.name().to_string()),
            other => other.to_string(),
        }
    }

    /// 64-bit hash over a canonical rendering of the class layout: name,
    /// type id, super type and every serialized field (id, name, type, flags).
    pub fn structural_fingerprint(&self, r: ClassRef) -> Option<u64> {
        let class = self.class(r)?;
        let mut canon = format!("{}#{:04x}", class.name(), class.type_id16());
        if let Some(s) = self.super_class(r) {
            let _ = write!(canon, ":{}", self.type_name(&Type::Custom(s)));
        }
        for field in self.all_fields(r) {
            let _ = write!(
                canon,
                ";{:04x}={}:{}[{}]",
                field.id(),
                field.name(),
                self.type_name(field.typ()),
                field.flags().join(",")
            );
        }
        Some(hash64(canon.as_bytes()))
    }

    /// Resolve names, validate, and materialize defaults.
    pub fn link(self) -> Result<Schema, LinkError> {
        if self.linked {
            return Ok(self);
        }
        self.check_names()?;
        self.check_type_ids()?;

        // Pass 1: types.
        let classes = self
            .classes
            .iter()
            .map(|c| self.resolve_class(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mut linked = Schema {
            classes,
            enums: self.enums,
            names: self.names,
            linked: false,
        };
        linked.check_inheritance()?;
        linked.check_field_ids()?;

        // Pass 2: defaults, which may reference any linked class.
        let classes = linked
            .classes
            .iter()
            .map(|c| linked.link_defaults(c))
            .collect::<Result<Vec<_>, _>>()?;
        linked.classes = classes;
        linked.linked = true;
        log::debug!(
            "[Schema] linked {} classes, {} enums",
            linked.classes.len(),
            linked.enums.len()
        );
        Ok(linked)
    }

    fn check_names(&self) -> Result<(), LinkError> {
        let mut seen = HashSet::new();
        let names = self
            .classes
            .iter()
            .map(CustomType::name)
            .chain(self.enums.iter().map(EnumType::name));
        for name in names {
            if !seen.insert(name) {
                return Err(LinkError::DuplicateName(name.to_string()));
            }
        }
        Ok(())
    }

    fn check_type_ids(&self) -> Result<(), LinkError> {
        let mut seen: HashMap<u16, &str> = HashMap::new();
        for class in &self.classes {
            if let Some(first) = seen.insert(class.type_id16(), class.name()) {
                return Err(LinkError::TypeIdCollision {
                    id: class.type_id16(),
                    first: first.to_string(),
                    second: class.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve_class(&self, class: &CustomType) -> Result<CustomType, LinkError> {
        let super_type = match class.super_type() {
            None => None,
            Some(t) => match self.resolve_type(t, class.name())? {
                t @ Type::Custom(_) => Some(t),
                _ => {
                    return Err(LinkError::InvalidSuperType {
                        class: class.name().to_string(),
                    })
                }
            },
        };
        let fields = class
            .fields()
            .iter()
            .map(|f| {
                let context = format!("{}.{}", class.name(), f.name());
                Ok(f.transform_type(self.resolve_type(f.typ(), &context)?))
            })
            .collect::<Result<Vec<_>, LinkError>>()?;
        Ok(class.transform(super_type, fields))
    }

    fn resolve_type(&self, typ: &Type, context: &str) -> Result<Type, LinkError> {
        let unresolved = |name: String| LinkError::UnresolvedReference {
            name,
            context: context.to_string(),
        };
        Ok(match typ {
            Type::Unlinked(name) => match self.lookup(name) {
                Some(NamedType::Class(r)) => Type::Custom(r),
                Some(NamedType::Enum(r)) => Type::Enum(r),
                None => return Err(unresolved(name.clone())),
            },
            Type::List(e) => Type::list(self.resolve_type(e, context)?),
            Type::Array(e) => Type::array(self.resolve_type(e, context)?),
            Type::Map(k, v) => Type::map(self.resolve_type(k, context)?, self.resolve_type(v, context)?),
            Type::Custom(r) if self.class(*r).is_none() => {
                return Err(unresolved(typ.to_string()));
            }
            Type::Enum(r) if self.enum_type(*r).is_none() => {
                return Err(unresolved(typ.to_string()));
            }
            other => other.clone(),
        })
    }

    fn check_inheritance(&self) -> Result<(), LinkError> {
        for (r, class) in self.classes() {
            let mut seen = HashSet::from([r]);
            let mut cur = self.super_class(r);
            while let Some(s) = cur {
                if !seen.insert(s) {
                    return Err(LinkError::CyclicInheritance(class.name().to_string()));
                }
                cur = self.super_class(s);
            }
        }
        Ok(())
    }

    fn check_field_ids(&self) -> Result<(), LinkError> {
        for (r, class) in self.classes() {
            let mut seen: HashMap<u16, &str> = HashMap::new();
            for field in self.all_fields(r) {
                if let Some(first) = seen.insert(field.id(), field.name()) {
                    return Err(LinkError::DuplicateFieldId {
                        class: class.name().to_string(),
                        id: field.id(),
                        first: first.to_string(),
                        second: field.name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn link_defaults(&self, class: &CustomType) -> Result<CustomType, LinkError> {
        let fields = class
            .fields()
            .iter()
            .map(|f| match f.default_value() {
                Some(DefaultValue::Unlinked(text)) => {
                    let context = format!("{}.{}", class.name(), f.name());
                    Ok(f.transform_default(DefaultValue::link(text, f.typ(), self, &context)?))
                }
                _ => Ok(f.clone()),
            })
            .collect::<Result<Vec<_>, LinkError>>()?;
        Ok(class.transform(class.super_type().cloned(), fields))
    }
}

/// Iterator over a class and its ancestors. Stops after visiting as many
/// classes as the schema holds, so a cyclic unlinked hierarchy terminates.
pub struct Ancestors<'s> {
    schema: &'s Schema,
    next: Option<ClassRef>,
    remaining: usize,
}

impl<'s> Iterator for Ancestors<'s> {
    type Item = (ClassRef, &'s CustomType);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let r = self.next?;
        let class = self.schema.class(r)?;
        self.remaining -= 1;
        self.next = self.schema.super_class(r);
        Some((r, class))
    }
}
