// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary writer.
//!
//! Objects are written as their present, serialized fields in ascending id
//! order. Type fingerprints precede the fields whenever the reader could
//! not otherwise tell the concrete class: at the top level, at polymorphic
//! fields, when the concrete class differs from the declared one, and always
//! when compact mode is off.

use super::cursor::WireOutput;
use super::{missing_required, CodecError, Result};
use crate::config::CodecConfig;
use crate::model::{Schema, Type, TypeTag};
use crate::object::{Object, Value};
use crate::registry::ClassRegistry;
use std::io::Write;

#[derive(Clone, Copy)]
struct Constraint<'s> {
    schema: &'s Schema,
    typ: &'s Type,
}

impl<'s> Constraint<'s> {
    fn with(self, typ: &'s Type) -> Self {
        Self {
            schema: self.schema,
            typ,
        }
    }
}

/// Declared class at an object write site.
#[derive(Clone, Copy)]
struct Site {
    type_hash: u16,
    polymorphic: bool,
}

/// Writes objects and values to a byte sink.
///
/// Fingerprints are the class's type id followed by those of its ancestors,
/// so a reader that lacks the class can fall back to the nearest one it has.
pub struct BinaryWriter<'r, W> {
    output: WireOutput<W>,
    registry: &'r ClassRegistry,
}

impl<'r, W: Write> BinaryWriter<'r, W> {
    pub fn new(output: W, registry: &'r ClassRegistry) -> Self {
        Self::with_config(output, registry, CodecConfig::default())
    }

    pub fn with_config(output: W, registry: &'r ClassRegistry, config: CodecConfig) -> Self {
        Self {
            output: WireOutput::new(output, config),
            registry,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.output.config()
    }

    pub fn get_ref(&self) -> &W {
        self.output.get_ref()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()
    }

    pub fn into_inner(self) -> W {
        self.output.into_inner()
    }

    /// Write `obj` with its type fingerprints.
    pub fn write_object(&mut self, obj: &dyn Object) -> Result<()> {
        self.output.write_tag(TypeTag::Custom)?;
        self.nested(|w| w.write_custom(obj, None))
    }

    /// Write `obj` at a site statically typed as `static_class`.
    ///
    /// In compact mode the fingerprints are omitted when `obj` is exactly of
    /// that class; the reader must then use
    /// [`read_object_of`](crate::BinaryReader::read_object_of).
    pub fn write_object_as(&mut self, obj: &dyn Object, static_class: &str) -> Result<()> {
        let entry = self
            .registry
            .get_by_name(static_class)
            .ok_or_else(|| CodecError::UnknownType(static_class.to_string()))?;
        let site = Site {
            type_hash: entry.type_hash16(),
            polymorphic: false,
        };
        self.output.write_tag(TypeTag::Custom)?;
        self.nested(|w| w.write_custom(obj, Some(site)))
    }

    /// Write a tagged value of type `typ`, declared in `schema`.
    pub fn write_value(&mut self, value: &Value, typ: &Type, schema: &Schema) -> Result<()> {
        let c = Constraint { schema, typ };
        let tag = self.check_tag(value, Some(c))?;
        self.output.write_tag(tag)?;
        self.write_payload(value, Some(c), false)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.output.enter()?;
        let result = f(self);
        self.output.leave();
        result
    }

    fn write_custom(&mut self, obj: &dyn Object, site: Option<Site>) -> Result<()> {
        let registry = self.registry;
        let entry = registry
            .get_by_name(obj.class_name())
            .ok_or_else(|| CodecError::UnknownType(obj.class_name().to_string()))?;
        if let Some(site) = site {
            if !registry.check_assignable(entry, site.type_hash) {
                return Err(CodecError::UnexpectedType {
                    expected: format!("{:#06x}", site.type_hash),
                    found: entry.class_name().to_string(),
                });
            }
        }

        let schema: &Schema = entry.schema();
        let class = entry.class();
        let missing = missing_required(schema, class, |id| obj.is_field_set(id));
        if !missing.is_empty() {
            return Err(CodecError::MissingRequiredFields {
                class: entry.class_name().to_string(),
                fields: missing,
            });
        }

        let mut fields = Vec::new();
        for (id, value) in obj.present_fields() {
            let field = schema.field_by_id(class, id).ok_or_else(|| {
                CodecError::InvalidValue(format!("{} has no field with id {:#06x}", entry.class_name(), id))
            })?;
            if field.is_serialized() && !value.is_null() {
                fields.push((field, value));
            }
        }
        fields.sort_by_key(|(field, _)| field.id());

        let with_ids = match site {
            None => true,
            Some(site) => site.polymorphic || !self.config().compact || site.type_hash != entry.type_hash16(),
        };
        if with_ids {
            let ancestry = entry.ancestry();
            self.output.write_size((ancestry.len() << 1) | 1)?;
            for id in ancestry {
                self.output.write_u16(*id)?;
            }
            self.output.write_size(fields.len())?;
        } else {
            self.output.write_size(fields.len() << 1)?;
        }

        for (field, value) in &fields {
            let c = Constraint {
                schema,
                typ: field.typ(),
            };
            self.output.write_u16(field.id())?;
            let tag = self.check_tag(value, Some(c)).map_err(|e| match e {
                CodecError::UnexpectedType { expected, found } => CodecError::UnexpectedType {
                    expected: format!("{} for field {}.{}", expected, field.owner(), field.name()),
                    found,
                },
                other => other,
            })?;
            self.output.write_tag(tag)?;
            self.write_payload(value, Some(c), field.is_polymorphic())?;
        }
        Ok(())
    }

    /// Wire tag for `value`, which must match the constraint's tag.
    fn check_tag(&self, value: &Value, c: Option<Constraint<'_>>) -> Result<TypeTag> {
        let found = value
            .tag()
            .ok_or_else(|| CodecError::InvalidValue("null cannot be written as a value".into()))?;
        match c {
            Some(c) => match c.typ.tag() {
                Some(expected) if expected != found => Err(CodecError::UnexpectedType {
                    expected: c.schema.type_name(c.typ),
                    found: value.kind_name(),
                }),
                _ => Ok(found),
            },
            None => Ok(found),
        }
    }

    fn write_payload(&mut self, value: &Value, c: Option<Constraint<'_>>, polymorphic: bool) -> Result<()> {
        // Unlinked types carry no constraint.
        let c = c.filter(|c| c.typ.is_linked());
        match value {
            Value::Null => Err(CodecError::InvalidValue("null cannot be written as a value".into())),
            Value::Bool(v) => self.output.write_bool(*v),
            Value::Int8(v) => self.output.write_i8(*v),
            Value::Int16(v) => self.output.write_i16(*v),
            Value::Int32(v) => self.output.write_i32(*v),
            Value::Int64(v) => self.output.write_i64(*v),
            Value::Float32(v) => self.output.write_f32(*v),
            Value::Float64(v) => self.output.write_f64(*v),
            Value::String(s) => self.output.write_string(s),
            Value::Enum(constant) => {
                if let Some(Constraint {
                    schema,
                    typ: Type::Enum(r),
                }) = c
                {
                    if let Some(e) = schema.enum_type(*r) {
                        if !e.contains(constant) {
                            return Err(CodecError::InvalidValue(format!(
                                "{} is not a constant of {}",
                                constant,
                                e.name()
                            )));
                        }
                    }
                }
                self.output.write_string(constant)
            }
            Value::List(items) | Value::Array(items) => {
                let element = c.and_then(|c| c.typ.element_type().map(|e| c.with(e)));
                self.nested(|w| w.write_sequence(items.iter(), element, polymorphic))
            }
            Value::Map(entries) => {
                let (key, val) = match c {
                    Some(c) => match c.typ {
                        Type::Map(k, v) => (Some(c.with(k)), Some(c.with(v))),
                        _ => (None, None),
                    },
                    None => (None, None),
                };
                self.nested(|w| {
                    w.output.write_size(entries.len())?;
                    if entries.is_empty() {
                        return Ok(());
                    }
                    w.output.write_tag(TypeTag::List)?;
                    w.write_sequence(entries.iter().map(|(k, _)| k), key, polymorphic)?;
                    w.output.write_tag(TypeTag::List)?;
                    w.write_sequence(entries.iter().map(|(_, v)| v), val, polymorphic)
                })
            }
            Value::Object(obj) => {
                let site = match c {
                    Some(Constraint {
                        schema,
                        typ: Type::Custom(r),
                    }) => schema.class(*r).map(|class| Site {
                        type_hash: class.type_id16(),
                        polymorphic,
                    }),
                    _ => None,
                };
                self.nested(|w| w.write_custom(obj.as_ref(), site))
            }
        }
    }

    /// Element count, shared element tag, payloads.
    fn write_sequence<'v, I>(&mut self, items: I, element: Option<Constraint<'_>>, polymorphic: bool) -> Result<()>
    where
        I: ExactSizeIterator<Item = &'v Value> + Clone,
    {
        let n = items.len();
        self.output.write_size(n)?;
        let Some(first) = items.clone().next() else {
            return Ok(());
        };
        let tag = match element.and_then(|c| c.typ.tag()) {
            Some(tag) => tag,
            None => first
                .tag()
                .ok_or_else(|| CodecError::InvalidValue("null collection element".into()))?,
        };
        self.output.write_tag(tag)?;
        for item in items {
            match item.tag() {
                None => return Err(CodecError::InvalidValue("null collection element".into())),
                Some(found) if found != tag => {
                    return Err(CodecError::UnexpectedType {
                        expected: tag.to_string(),
                        found: item.kind_name(),
                    })
                }
                Some(_) => self.write_payload(item, element, polymorphic)?,
            }
        }
        Ok(())
    }
}
