// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged binary encoding.
//!
//! # Wire format
//!
//! Every value is a one-byte [`TypeTag`](crate::model::TypeTag) followed by
//! its payload:
//!
//! | Tag | Payload |
//! |-----|---------|
//! | bool, int8 | one byte |
//! | int16 | two bytes, big-endian |
//! | int32, int64 | zig-zag LEB128 varint |
//! | float32, float64 | IEEE-754, big-endian |
//! | string | varint byte length, UTF-8 bytes |
//! | list | varint count; when non-zero, one element tag and the payloads |
//! | map | varint count; when non-zero, a tagged list of keys and a tagged list of values |
//! | custom | header varint, optional fingerprints, `(u16 field id, tagged value)` pairs |
//!
//! The object header varint `v` is `0` for an empty object, `(n << 1) | 1`
//! when `n` big-endian u16 type fingerprints (most derived first) and a field
//! count follow, and `n << 1` for `n` fields with no fingerprints.

mod cursor;
mod error;
mod inspect;
mod reader;
pub mod varint;
mod writer;

pub use cursor::{WireInput, WireOutput};
pub use error::CodecError;
pub use inspect::{Inspector, WireValue};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use crate::model::{ClassRef, Schema};

pub type Result<T> = std::result::Result<T, CodecError>;

/// Names of required fields of `class` (inherited ones included) for which
/// `is_set` is false.
pub(crate) fn missing_required(schema: &Schema, class: ClassRef, is_set: impl Fn(u16) -> bool) -> Vec<String> {
    schema
        .all_fields(class)
        .into_iter()
        .filter(|f| f.is_required() && !is_set(f.id()))
        .map(|f| f.name().to_string())
        .collect()
}
