// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire tags.
//!
//! Every value on the wire starts with a one-byte tag that determines the
//! payload layout. Lists and arrays share [`TypeTag::List`]; the static schema
//! tells them apart, the byte stream does not. Enums travel as strings.

use std::fmt;

/// One-byte type tag preceding every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// 1 byte, 0 or 1
    Bool = 0,
    /// 1 raw byte
    Int8 = 1,
    /// 2 bytes, big-endian
    Int16 = 2,
    /// zig-zag varint
    Int32 = 3,
    /// zig-zag varint
    Int64 = 4,
    /// 4 bytes IEEE-754, big-endian
    Float32 = 5,
    /// 8 bytes IEEE-754, big-endian
    Float64 = 6,
    /// varint byte length + UTF-8 (also used for enums)
    String = 7,
    /// varint count + element tag + payloads (lists and arrays)
    List = 8,
    /// varint count + key list + value list
    Map = 9,
    /// fingerprint header + (field id, tagged value) pairs
    Custom = 10,
}

impl TypeTag {
    /// Return the byte written on the wire.
    pub const fn to_u8(self) -> u8 {
        match self {
            TypeTag::Bool => 0,
            TypeTag::Int8 => 1,
            TypeTag::Int16 => 2,
            TypeTag::Int32 => 3,
            TypeTag::Int64 => 4,
            TypeTag::Float32 => 5,
            TypeTag::Float64 => 6,
            TypeTag::String => 7,
            TypeTag::List => 8,
            TypeTag::Map => 9,
            TypeTag::Custom => 10,
        }
    }

    /// Convert from a wire byte. Unknown bytes mean a corrupted stream.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TypeTag::Bool),
            1 => Some(TypeTag::Int8),
            2 => Some(TypeTag::Int16),
            3 => Some(TypeTag::Int32),
            4 => Some(TypeTag::Int64),
            5 => Some(TypeTag::Float32),
            6 => Some(TypeTag::Float64),
            7 => Some(TypeTag::String),
            8 => Some(TypeTag::List),
            9 => Some(TypeTag::Map),
            10 => Some(TypeTag::Custom),
            _ => None,
        }
    }

    /// Payload size in bytes for fixed-width tags, None for the rest.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeTag::Bool | TypeTag::Int8 => Some(1),
            TypeTag::Int16 => Some(2),
            TypeTag::Float32 => Some(4),
            TypeTag::Float64 => Some(8),
            _ => None,
        }
    }

    /// Returns true for the container tags (list, map, custom).
    pub const fn is_container(self) -> bool {
        matches!(self, TypeTag::List | TypeTag::Map | TypeTag::Custom)
    }

    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Int8 => "int8",
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Int64 => "int64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::String => "string",
            TypeTag::List => "list",
            TypeTag::Map => "map",
            TypeTag::Custom => "custom",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
