// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # polybin - schema-driven binary serialization
//!
//! A compact, self-describing binary format for object graphs declared in a
//! schema. Every value carries a one-byte type tag, every field a stable
//! 16-bit id, and every polymorphic object the fingerprints of its class
//! ancestry, so that:
//!
//! - readers skip fields and classes they do not know (forward compatibility)
//! - writers omit fields older readers never had (backward compatibility)
//! - an object of an unknown subclass decodes as its nearest known ancestor
//!
//! ## Quick Start
//!
//! ```rust
//! use polybin::model::{CustomType, Field, Schema, Type, FLAG_REQUIRED};
//! use polybin::object::{DynamicObject, Value};
//! use polybin::ClassRegistry;
//! use std::sync::Arc;
//!
//! let mut schema = Schema::new();
//! schema.add_class(
//!     CustomType::new("demo.User")
//!         .with_field(Field::new("demo.User", "name", Type::String).with_flag(FLAG_REQUIRED))
//!         .with_field(Field::new("demo.User", "age", Type::Int32)),
//! );
//! let schema = Arc::new(schema.link()?);
//! let mut registry = ClassRegistry::new();
//! registry.register_schema(&schema)?;
//!
//! let user = DynamicObject::by_name(&schema, "demo.User").unwrap().with("name", "ada")?;
//! let bytes = polybin::to_bytes(&user, &registry)?;
//! let back = polybin::from_bytes(&bytes, &registry)?.expect("registered class");
//! assert_eq!(back.as_ref(), &user as &dyn polybin::Object);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Schema`](model::Schema) | Arena of classes and enums, linked before use |
//! | [`ClassRegistry`] | Fingerprint, name and local id index of constructible classes |
//! | [`BinaryWriter`] / [`BinaryReader`] | Typed encoder and decoder |
//! | [`Inspector`] | Schema-less decoder for diagnostics |
//! | [`Object`] / [`DynamicObject`] | The object contract and its schema-backed implementation |

/// Tagged binary encoding (reader, writer, inspector).
pub mod codec;
/// Codec limits and defaults.
pub mod config;
/// 16- and 64-bit name hashes and base64 ids.
pub mod hash;
/// Schema type model and linker.
pub mod model;
/// Object contract and runtime values.
pub mod object;
/// Class registry.
pub mod registry;

pub use codec::{BinaryReader, BinaryWriter, CodecError, Inspector, Result, WireValue};
pub use config::CodecConfig;
pub use object::{DynamicObject, Object, ObjectType, Value};
pub use registry::{ClassRegistry, ClassRegistryEntry, RegistryError};

/// Encode `obj` as a top-level object with default configuration.
pub fn to_bytes(obj: &dyn Object, registry: &ClassRegistry) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(Vec::new(), registry);
    writer.write_object(obj)?;
    Ok(writer.into_inner())
}

/// Decode one top-level object from `bytes`.
pub fn from_bytes(bytes: &[u8], registry: &ClassRegistry) -> Result<Option<Box<dyn Object>>> {
    BinaryReader::new(bytes, registry).read_object()
}
