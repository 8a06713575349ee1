// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary reader.
//!
//! Decodes tagged values into [`Value`]s and registry-constructed objects.
//! Each object field is looked up by id in the schema of the object's
//! registry entry; the field's static type then constrains the wire tag and
//! drives decoding of lists, maps, enums and nested objects.
//!
//! Schema evolution is handled by skipping: unknown fields, non-serialized
//! fields and objects of unknown type are consumed without being
//! materialized, so the stream stays synchronized for what follows.

use super::cursor::WireInput;
use super::{missing_required, CodecError, Result};
use crate::config::{CodecConfig, PREALLOC_LIMIT, UNKNOWN_ENUM_CONSTANT};
use crate::model::{EnumRef, Field, Schema, Type, TypeTag};
use crate::object::{downcast, Object, ObjectType, Value};
use crate::registry::{ClassRegistry, ClassRegistryEntry};
use std::io::Read;

/// Static type information for the value being decoded.
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

/// The statically declared class at an object read site.
#[derive(Clone, Copy)]
struct Expected<'s> {
    type_hash: u16,
    name: &'s str,
}

/// Reads objects and values from a byte stream.
///
/// # Example
///
/// ```
/// use polybin::model::{CustomType, Field, Schema, Type};
/// use polybin::object::{DynamicObject, Object, Value};
/// use polybin::{BinaryReader, BinaryWriter, ClassRegistry};
/// use std::sync::Arc;
///
/// let mut schema = Schema::new();
/// schema.add_class(CustomType::new("demo.Point").with_field(Field::new("demo.Point", "x", Type::Int32)));
/// let schema = Arc::new(schema.link()?);
/// let mut registry = ClassRegistry::new();
/// registry.register_schema(&schema)?;
///
/// let point = DynamicObject::by_name(&schema, "demo.Point").unwrap().with("x", 3)?;
/// let mut writer = BinaryWriter::new(Vec::new(), &registry);
/// writer.write_object(&point)?;
/// let bytes = writer.into_inner();
///
/// let mut reader = BinaryReader::new(&bytes[..], &registry);
/// let decoded = reader.read_object()?.expect("known type");
/// assert_eq!(decoded.present_fields(), vec![(point.present_fields()[0].0, Value::Int32(3))]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BinaryReader<'r, R> {
    input: WireInput<R>,
    registry: &'r ClassRegistry,
}

impl<'r, R: Read> BinaryReader<'r, R> {
    pub fn new(input: R, registry: &'r ClassRegistry) -> Self {
        Self::with_config(input, registry, CodecConfig::default())
    }

    pub fn with_config(input: R, registry: &'r ClassRegistry, config: CodecConfig) -> Self {
        Self {
            input: WireInput::new(input, config),
            registry,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.input.config()
    }

    pub fn registry(&self) -> &'r ClassRegistry {
        self.registry
    }

    pub fn get_ref(&self) -> &R {
        self.input.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Read one object whose concrete type comes from its fingerprints.
    ///
    /// Returns `None` for an untyped empty object and for objects of a type
    /// the registry does not know (their bytes are skipped).
    pub fn read_object(&mut self) -> Result<Option<Box<dyn Object>>> {
        self.read_top_level(None)
    }

    /// Read one object statically typed as `class_name`. The decoded object
    /// may be a registered subclass.
    pub fn read_object_of(&mut self, class_name: &str) -> Result<Option<Box<dyn Object>>> {
        let registry = self.registry;
        let entry = registry
            .get_by_name(class_name)
            .ok_or_else(|| CodecError::UnknownType(class_name.to_string()))?;
        self.read_top_level(Some(Expected {
            type_hash: entry.type_hash16(),
            name: entry.class_name(),
        }))
    }

    /// Read one object of the generated type `T`.
    pub fn read_typed<T: ObjectType>(&mut self) -> Result<Option<T>> {
        match self.read_object_of(T::CLASS_NAME)? {
            Some(obj) => downcast::<T>(obj).map(|b| Some(*b)),
            None => Ok(None),
        }
    }

    /// Read one tagged value, letting the wire tags drive decoding.
    pub fn read_value(&mut self) -> Result<Value> {
        let tag = self.input.read_tag()?;
        self.read_payload(tag, None)
    }

    /// Consume one tagged value.
    pub fn skip_value(&mut self) -> Result<()> {
        let tag = self.input.read_tag()?;
        self.input.skip(tag)
    }

    fn read_top_level(&mut self, expected: Option<Expected<'r>>) -> Result<Option<Box<dyn Object>>> {
        let tag = self.input.read_tag()?;
        if tag != TypeTag::Custom {
            self.input.skip(tag)?;
            return Err(CodecError::unexpected_tag(TypeTag::Custom, tag, None));
        }
        self.nested(|r| r.read_custom(expected))
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.input.enter()?;
        let result = f(self);
        self.input.leave();
        result
    }

    fn read_custom(&mut self, expected: Option<Expected<'r>>) -> Result<Option<Box<dyn Object>>> {
        let (fingerprint_count, mut field_count) = self.input.read_custom_header()?;
        let fingerprints = match fingerprint_count {
            Some(count) => {
                let mut ids = Vec::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    ids.push(self.input.read_u16()?);
                }
                field_count = self.input.read_count("object fields")?;
                Some(ids)
            }
            None => None,
        };

        if fingerprints.is_none() && field_count == 0 && expected.is_none() {
            return Ok(None);
        }

        let registry = self.registry;
        let entry = match (&fingerprints, &expected) {
            (Some(ids), _) => registry.resolve_by_fingerprints(ids),
            (None, Some(exp)) => registry.get_by_type_hash(exp.type_hash),
            (None, None) => None,
        };
        let Some(entry) = entry else {
            log::debug!(
                "[BinaryReader] unknown type {:x?}, skipping {} field(s)",
                fingerprints,
                field_count
            );
            self.input.skip_fields(field_count)?;
            return Ok(None);
        };

        if let Some(exp) = expected {
            if !registry.check_assignable(entry, exp.type_hash) {
                self.input.skip_fields(field_count)?;
                return Err(CodecError::UnexpectedType {
                    expected: exp.name.to_string(),
                    found: entry.class_name().to_string(),
                });
            }
        }

        let mut obj = registry.instantiate(entry);
        let received = self.read_fields(entry, obj.as_mut(), field_count)?;

        // Defaults do not satisfy a required field; only the wire does.
        let missing = missing_required(entry.schema(), entry.class(), |id| received.contains(&id));
        if !missing.is_empty() {
            return Err(CodecError::MissingRequiredFields {
                class: entry.class_name().to_string(),
                fields: missing,
            });
        }
        Ok(Some(obj))
    }

    /// Decode `n` field pairs into `obj`. Returns the ids of the fields
    /// that were stored.
    fn read_fields(&mut self, entry: &'r ClassRegistryEntry, obj: &mut dyn Object, n: usize) -> Result<Vec<u16>> {
        let schema: &'r Schema = entry.schema();
        let class = entry.class();
        let mut received = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        for _ in 0..n {
            let id = self.input.read_u16()?;
            let tag = self.input.read_tag()?;
            let field = match schema.field_by_id(class, id) {
                Some(field) if field.is_serialized() => field,
                Some(field) => {
                    log::trace!(
                        "[BinaryReader] {}.{} is not serialized, skipping",
                        entry.class_name(),
                        field.name()
                    );
                    self.input.skip(tag)?;
                    continue;
                }
                None => {
                    log::trace!(
                        "[BinaryReader] unknown field {:#06x} in {}, skipping",
                        id,
                        entry.class_name()
                    );
                    self.input.skip(tag)?;
                    continue;
                }
            };

            let value = self.read_checked(tag, Constraint { schema, typ: field.typ() }, field)?;
            if value.is_null() {
                continue;
            }
            if obj.set_field(id, value)? {
                received.push(id);
            } else {
                log::trace!(
                    "[BinaryReader] {} does not accept field {}, dropped",
                    obj.class_name(),
                    field.name()
                );
            }
        }
        Ok(received)
    }

    /// Validate `tag` against the field type, then decode. On mismatch the
    /// payload is skipped before the error is returned.
    fn read_checked(&mut self, tag: TypeTag, c: Constraint<'r>, field: &Field) -> Result<Value> {
        match c.typ.tag() {
            Some(expected) if expected != tag => {
                self.input.skip(tag)?;
                let context = format!("{}.{}", field.owner(), field.name());
                Err(CodecError::unexpected_tag(expected, tag, Some(&context)))
            }
            Some(_) => self.read_payload(tag, Some(c)),
            None => self.read_payload(tag, None),
        }
    }

    fn read_payload(&mut self, tag: TypeTag, c: Option<Constraint<'r>>) -> Result<Value> {
        Ok(match tag {
            TypeTag::Bool => Value::Bool(self.input.read_bool()?),
            TypeTag::Int8 => Value::Int8(self.input.read_i8()?),
            TypeTag::Int16 => Value::Int16(self.input.read_i16()?),
            TypeTag::Int32 => Value::Int32(self.input.read_i32()?),
            TypeTag::Int64 => Value::Int64(self.input.read_i64()?),
            TypeTag::Float32 => Value::Float32(self.input.read_f32()?),
            TypeTag::Float64 => Value::Float64(self.input.read_f64()?),
            TypeTag::String => match c {
                Some(Constraint {
                    schema,
                    typ: Type::Enum(r),
                }) => self.read_enum(schema, *r)?,
                _ => Value::String(self.input.read_string()?),
            },
            TypeTag::List => {
                let element = c.and_then(|c| c.typ.element_type().map(|e| c.with(e)));
                let mut items = self.nested(|r| r.read_sequence(element))?;
                // Objects of unknown type are absent, not null.
                items.retain(|v| !v.is_null());
                match c.map(|c| c.typ) {
                    Some(Type::Array(_)) => Value::Array(items),
                    _ => Value::List(items),
                }
            }
            TypeTag::Map => {
                let (key, value) = match c {
                    Some(c) => match c.typ {
                        Type::Map(k, v) => (Some(c.with(k)), Some(c.with(v))),
                        _ => (None, None),
                    },
                    None => (None, None),
                };
                Value::Map(self.nested(|r| r.read_map(key, value))?)
            }
            TypeTag::Custom => {
                let expected = match c {
                    Some(Constraint {
                        schema,
                        typ: Type::Custom(r),
                    }) => schema.class(*r).map(|class| Expected {
                        type_hash: class.type_id16(),
                        name: class.name(),
                    }),
                    _ => None,
                };
                match self.nested(|r| r.read_custom(expected))? {
                    Some(obj) => Value::Object(obj),
                    None => Value::Null,
                }
            }
        })
    }

    /// Element count, element tag, payloads. Unknown objects stay `Null`.
    fn read_sequence(&mut self, element: Option<Constraint<'r>>) -> Result<Vec<Value>> {
        let n = self.input.read_count("list elements")?;
        if n == 0 {
            return Ok(Vec::new());
        }
        let tag = self.input.read_tag()?;
        if let Some(expected) = element.and_then(|c| c.typ.tag()) {
            if expected != tag {
                for _ in 0..n {
                    self.input.skip(tag)?;
                }
                return Err(CodecError::unexpected_tag(expected, tag, None));
            }
        }
        let mut items = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        for _ in 0..n {
            items.push(self.read_payload(tag, element)?);
        }
        Ok(items)
    }

    fn read_map(
        &mut self,
        key: Option<Constraint<'r>>,
        value: Option<Constraint<'r>>,
    ) -> Result<Vec<(Value, Value)>> {
        let n = self.input.read_count("map entries")?;
        if n == 0 {
            return Ok(Vec::new());
        }
        self.input.expect_sequence_tag()?;
        let keys = self.read_sequence(key)?;
        self.input.expect_sequence_tag()?;
        let values = self.read_sequence(value)?;
        if keys.len() != n || values.len() != n {
            return Err(CodecError::corrupted(format!(
                "map declares {} entries but carries {} keys and {} values",
                n,
                keys.len(),
                values.len()
            )));
        }
        Ok(keys
            .into_iter()
            .zip(values)
            .filter(|(k, v)| !k.is_null() && !v.is_null())
            .collect())
    }

    fn read_enum(&mut self, schema: &Schema, r: EnumRef) -> Result<Value> {
        let name = self.input.read_string()?;
        let Some(enum_type) = schema.enum_type(r) else {
            return Ok(Value::Null);
        };
        if enum_type.contains(&name) {
            Ok(Value::Enum(name))
        } else {
            log::debug!(
                "[BinaryReader] unknown constant {} of {}, using {}",
                name,
                enum_type.name(),
                UNKNOWN_ENUM_CONSTANT
            );
            Ok(Value::Enum(UNKNOWN_ENUM_CONSTANT.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash16;
    use crate::model::{CustomType, EnumType, FLAG_REQUIRED};
    use crate::object::DynamicObject;
    use std::sync::Arc;

    fn setup() -> (Arc<Schema>, ClassRegistry) {
        let mut s = Schema::new();
        s.add_enum(EnumType::new("t.Mood", ["HAPPY", "SAD"]));
        s.add_class(
            CustomType::new("t.Item")
                .with_field(Field::new("t.Item", "id", Type::Int32).with_id(1))
                .with_field(Field::new("t.Item", "mood", Type::named("t.Mood")).with_id(2))
                .with_field(Field::new("t.Item", "tags", Type::list(Type::String)).with_id(3)),
        );
        s.add_class(
            CustomType::new("t.Strict").with_field(Field::new("t.Strict", "key", Type::String).with_id(1).with_flag(FLAG_REQUIRED)),
        );
        let s = Arc::new(s.link().expect("link"));
        let mut r = ClassRegistry::new();
        r.register_schema(&s).expect("register");
        (s, r)
    }

    fn header(class: &str) -> Vec<u8> {
        let id = hash16(class).to_be_bytes();
        vec![TypeTag::Custom.to_u8(), 0x03, id[0], id[1]]
    }

    #[test]
    fn test_read_fields_by_fingerprint() {
        let (_, r) = setup();
        let mut bytes = header("t.Item");
        bytes.extend_from_slice(&[0x02, 0x00, 0x01, 0x03, 0x0E, 0x00, 0x02, 0x07, 0x03, b'S', b'A', b'D']);
        let obj = BinaryReader::new(&bytes[..], &r)
            .read_object()
            .expect("read")
            .expect("object");
        let obj = downcast::<DynamicObject>(obj).expect("dynamic");
        assert_eq!(obj.get("id"), Some(&Value::Int32(7)));
        assert_eq!(obj.get("mood"), Some(&Value::Enum("SAD".into())));
    }

    #[test]
    fn test_unknown_enum_constant() {
        let (_, r) = setup();
        let mut bytes = header("t.Item");
        bytes.extend_from_slice(&[0x01, 0x00, 0x02, 0x07, 0x04, b'M', b'E', b'H', b'!']);
        let obj = BinaryReader::new(&bytes[..], &r).read_object().expect("read").expect("object");
        let obj = downcast::<DynamicObject>(obj).expect("dynamic");
        assert_eq!(obj.get("mood"), Some(&Value::Enum(UNKNOWN_ENUM_CONSTANT.into())));
    }

    #[test]
    fn test_untyped_empty_object_is_none() {
        let (_, r) = setup();
        let bytes = [TypeTag::Custom.to_u8(), 0x00];
        let mut reader = BinaryReader::new(&bytes[..], &r);
        assert!(reader.read_object().expect("read").is_none());
    }

    #[test]
    fn test_empty_object_with_expected_type_checks_required() {
        let (_, r) = setup();
        let bytes = [TypeTag::Custom.to_u8(), 0x00];
        let obj = BinaryReader::new(&bytes[..], &r).read_object_of("t.Item").expect("read");
        assert_eq!(obj.map(|o| o.class_name().to_string()).as_deref(), Some("t.Item"));

        match BinaryReader::new(&bytes[..], &r).read_object_of("t.Strict") {
            Err(CodecError::MissingRequiredFields { class, fields }) => {
                assert_eq!(class, "t.Strict");
                assert_eq!(fields, ["key"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_default_does_not_satisfy_required_field() {
        let mut s = Schema::new();
        s.add_class(
            CustomType::new("t.Counted")
                .with_field(
                    Field::new("t.Counted", "n", Type::Int32)
                        .with_id(1)
                        .with_flag(FLAG_REQUIRED)
                        .with_default("5"),
                )
                .with_field(Field::new("t.Counted", "k", Type::Int32).with_id(2)),
        );
        let s = Arc::new(s.link().expect("link"));
        let mut r = ClassRegistry::new();
        r.register_schema(&s).expect("register");

        // only k = 1 on the wire
        let mut bytes = header("t.Counted");
        bytes.extend_from_slice(&[0x01, 0x00, 0x02, 0x03, 0x02]);
        match BinaryReader::new(&bytes[..], &r).read_object() {
            Err(CodecError::MissingRequiredFields { class, fields }) => {
                assert_eq!(class, "t.Counted");
                assert_eq!(fields, ["n"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        // n = 7 on the wire
        let mut bytes = header("t.Counted");
        bytes.extend_from_slice(&[0x01, 0x00, 0x01, 0x03, 0x0E]);
        let obj = BinaryReader::new(&bytes[..], &r).read_object().expect("read").expect("object");
        let obj = downcast::<DynamicObject>(obj).expect("dynamic");
        assert_eq!(obj.get("n"), Some(&Value::Int32(7)));
    }

    #[test]
    fn test_tag_mismatch_skips_payload() {
        let (_, r) = setup();
        // field 1 (int32) carries a string
        let mut bytes = header("t.Item");
        bytes.extend_from_slice(&[0x01, 0x00, 0x01, 0x07, 0x02, b'h', b'i']);
        bytes.push(TypeTag::Bool.to_u8());
        let mut reader = BinaryReader::new(&bytes[..], &r);
        match reader.read_object() {
            Err(CodecError::UnexpectedTag { expected, found, context }) => {
                assert_eq!(expected, TypeTag::Int32);
                assert_eq!(found, TypeTag::String);
                assert_eq!(context, " for field t.Item.id");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(reader.into_inner(), &[TypeTag::Bool.to_u8()][..]);
    }

    #[test]
    fn test_top_level_requires_custom_tag() {
        let (_, r) = setup();
        let bytes = [TypeTag::Int32.to_u8(), 0x02];
        let mut reader = BinaryReader::new(&bytes[..], &r);
        assert!(matches!(reader.read_object(), Err(CodecError::UnexpectedTag { .. })));
        assert!(reader.into_inner().is_empty());
    }

    #[test]
    fn test_sibling_type_rejected() {
        let (_, r) = setup();
        let mut bytes = header("t.Strict");
        bytes.extend_from_slice(&[0x01, 0x00, 0x01, 0x07, 0x01, b'k']);
        let mut reader = BinaryReader::new(&bytes[..], &r);
        assert!(matches!(
            reader.read_object_of("t.Item"),
            Err(CodecError::UnexpectedType { .. })
        ));
        assert!(reader.into_inner().is_empty());
    }

    #[test]
    fn test_read_value_without_schema() {
        let (_, r) = setup();
        let bytes = [TypeTag::List.to_u8(), 0x02, TypeTag::Int16.to_u8(), 0x00, 0x01, 0xFF, 0xFF];
        let v = BinaryReader::new(&bytes[..], &r).read_value().expect("value");
        assert_eq!(v, Value::List(vec![Value::Int16(1), Value::Int16(-1)]));
    }

    #[test]
    fn test_map_count_mismatch_is_corruption() {
        let (_, r) = setup();
        // map of 2 entries whose key sequence holds 1 element
        let bytes = [
            TypeTag::Map.to_u8(),
            0x02,
            TypeTag::List.to_u8(),
            0x01,
            TypeTag::Int8.to_u8(),
            0x01,
            TypeTag::List.to_u8(),
            0x02,
            TypeTag::Int8.to_u8(),
            0x01,
            0x02,
        ];
        let err = BinaryReader::new(&bytes[..], &r).read_value().expect_err("corrupt");
        assert!(err.is_stream_fatal());
        assert!(matches!(err, CodecError::StreamCorrupted(_)));
    }

    #[test]
    fn test_depth_limit() {
        let (_, r) = setup();
        let config = CodecConfig::default().with_max_depth(3);
        // [[[[true]]]]
        let framed = [8u8, 1, 8, 1, 8, 1, 8, 1, 0, 1];
        let err = BinaryReader::with_config(&framed[..], &r, config)
            .read_value()
            .expect_err("too deep");
        assert!(matches!(err, CodecError::DepthLimitExceeded(3)));
    }
}
