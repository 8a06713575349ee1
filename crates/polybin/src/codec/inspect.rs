// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-less decoding.
//!
//! [`Inspector`] turns any well-formed stream into a [`WireValue`] tree
//! using only the wire tags. Field ids and type fingerprints are kept as
//! raw 16-bit values.

use super::cursor::WireInput;
use super::{CodecError, Result};
use crate::config::{CodecConfig, PREALLOC_LIMIT};
use crate::hash::id_to_base64;
use crate::model::TypeTag;
use serde_json::json;
use std::fmt;
use std::io::Read;

/// A decoded value with no schema attached.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    List {
        element: Option<TypeTag>,
        items: Vec<WireValue>,
    },
    Map {
        key: Option<TypeTag>,
        value: Option<TypeTag>,
        entries: Vec<(WireValue, WireValue)>,
    },
    Object {
        type_ids: Option<Vec<u16>>,
        fields: Vec<(u16, WireValue)>,
    },
}

impl WireValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            WireValue::Bool(_) => TypeTag::Bool,
            WireValue::Int8(_) => TypeTag::Int8,
            WireValue::Int16(_) => TypeTag::Int16,
            WireValue::Int32(_) => TypeTag::Int32,
            WireValue::Int64(_) => TypeTag::Int64,
            WireValue::Float32(_) => TypeTag::Float32,
            WireValue::Float64(_) => TypeTag::Float64,
            WireValue::String(_) => TypeTag::String,
            WireValue::List { .. } => TypeTag::List,
            WireValue::Map { .. } => TypeTag::Map,
            WireValue::Object { .. } => TypeTag::Custom,
        }
    }

    /// JSON rendering. Objects become `{"type_ids": [...], "fields": {...}}`
    /// keyed by base64 field id; maps become arrays of `[key, value]` pairs.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            WireValue::Bool(v) => json!(v),
            WireValue::Int8(v) => json!(v),
            WireValue::Int16(v) => json!(v),
            WireValue::Int32(v) => json!(v),
            WireValue::Int64(v) => json!(v),
            WireValue::Float32(v) => json!(v),
            WireValue::Float64(v) => json!(v),
            WireValue::String(v) => json!(v),
            WireValue::List { items, .. } => items.iter().map(WireValue::to_json).collect(),
            WireValue::Map { entries, .. } => entries
                .iter()
                .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                .collect(),
            WireValue::Object { type_ids, fields } => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(id, v)| (id_to_base64(*id), v.to_json()))
                    .collect();
                match type_ids {
                    Some(ids) => json!({
                        "type_ids": ids.iter().map(|id| id_to_base64(*id)).collect::<Vec<_>>(),
                        "fields": fields,
                    }),
                    None => json!({ "fields": fields }),
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent + 1);
        match self {
            WireValue::Bool(v) => write!(f, "{}", v),
            WireValue::Int8(v) => write!(f, "{}i8", v),
            WireValue::Int16(v) => write!(f, "{}i16", v),
            WireValue::Int32(v) => write!(f, "{}", v),
            WireValue::Int64(v) => write!(f, "{}L", v),
            WireValue::Float32(v) => write!(f, "{}f", v),
            WireValue::Float64(v) => write!(f, "{}", v),
            WireValue::String(v) => write!(f, "{:?}", v),
            WireValue::List { items, .. } if items.is_empty() => write!(f, "[]"),
            WireValue::List { element, items } => {
                writeln!(f, "[  # {} x {}", items.len(), tag_name(*element))?;
                for item in items {
                    write!(f, "{}", pad)?;
                    item.fmt_indented(f, indent + 1)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{}]", "  ".repeat(indent))
            }
            WireValue::Map { entries, .. } if entries.is_empty() => write!(f, "{{}}"),
            WireValue::Map { key, value, entries } => {
                writeln!(f, "{{  # {} -> {}", tag_name(*key), tag_name(*value))?;
                for (k, v) in entries {
                    write!(f, "{}", pad)?;
                    k.fmt_indented(f, indent + 1)?;
                    write!(f, ": ")?;
                    v.fmt_indented(f, indent + 1)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{}}}", "  ".repeat(indent))
            }
            WireValue::Object { type_ids, fields } => {
                match type_ids {
                    Some(ids) => {
                        let ids: Vec<String> = ids.iter().map(|id| format!("{:#06x}", id)).collect();
                        write!(f, "object<{}>", ids.join(" < "))?;
                    }
                    None => write!(f, "object")?,
                }
                if fields.is_empty() {
                    return write!(f, " {{}}");
                }
                writeln!(f, " {{")?;
                for (id, v) in fields {
                    write!(f, "{}{:#06x}/{}: ", pad, id, id_to_base64(*id))?;
                    v.fmt_indented(f, indent + 1)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{}}}", "  ".repeat(indent))
            }
        }
    }
}

fn tag_name(tag: Option<TypeTag>) -> &'static str {
    tag.map_or("-", TypeTag::name)
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Iterates over the top-level values of a stream.
///
/// Iteration ends at a clean end of input, or right after the first error.
pub struct Inspector<R> {
    input: WireInput<R>,
    failed: bool,
}

impl<R: Read> Inspector<R> {
    pub fn new(input: R) -> Self {
        Self::with_config(input, CodecConfig::default())
    }

    pub fn with_config(input: R, config: CodecConfig) -> Self {
        Self {
            input: WireInput::new(input, config),
            failed: false,
        }
    }

    /// Next top-level value, or `None` at end of input.
    pub fn next_value(&mut self) -> Result<Option<WireValue>> {
        match self.input.try_read_tag()? {
            Some(tag) => read_wire(&mut self.input, tag).map(Some),
            None => Ok(None),
        }
    }

    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }
}

impl<R: Read> Iterator for Inspector<R> {
    type Item = Result<WireValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_value() {
            Ok(v) => v.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn read_wire<R: Read>(input: &mut WireInput<R>, tag: TypeTag) -> Result<WireValue> {
    Ok(match tag {
        TypeTag::Bool => WireValue::Bool(input.read_bool()?),
        TypeTag::Int8 => WireValue::Int8(input.read_i8()?),
        TypeTag::Int16 => WireValue::Int16(input.read_i16()?),
        TypeTag::Int32 => WireValue::Int32(input.read_i32()?),
        TypeTag::Int64 => WireValue::Int64(input.read_i64()?),
        TypeTag::Float32 => WireValue::Float32(input.read_f32()?),
        TypeTag::Float64 => WireValue::Float64(input.read_f64()?),
        TypeTag::String => WireValue::String(input.read_string()?),
        TypeTag::List => {
            let (element, items) = input.nested(read_list)?;
            WireValue::List { element, items }
        }
        TypeTag::Map => input.nested(read_map)?,
        TypeTag::Custom => input.nested(read_object)?,
    })
}

fn read_list<R: Read>(input: &mut WireInput<R>) -> Result<(Option<TypeTag>, Vec<WireValue>)> {
    let n = input.read_count("list elements")?;
    if n == 0 {
        return Ok((None, Vec::new()));
    }
    let tag = input.read_tag()?;
    let mut items = Vec::with_capacity(n.min(PREALLOC_LIMIT));
    for _ in 0..n {
        items.push(read_wire(input, tag)?);
    }
    Ok((Some(tag), items))
}

fn read_map<R: Read>(input: &mut WireInput<R>) -> Result<WireValue> {
    let n = input.read_count("map entries")?;
    if n == 0 {
        return Ok(WireValue::Map {
            key: None,
            value: None,
            entries: Vec::new(),
        });
    }
    input.expect_sequence_tag()?;
    let (key, keys) = read_list(input)?;
    input.expect_sequence_tag()?;
    let (value, values) = read_list(input)?;
    if keys.len() != n || values.len() != n {
        return Err(CodecError::corrupted(format!(
            "map declares {} entries but carries {} keys and {} values",
            n,
            keys.len(),
            values.len()
        )));
    }
    Ok(WireValue::Map {
        key,
        value,
        entries: keys.into_iter().zip(values).collect(),
    })
}

fn read_object<R: Read>(input: &mut WireInput<R>) -> Result<WireValue> {
    let (fingerprint_count, mut n) = input.read_custom_header()?;
    let type_ids = match fingerprint_count {
        Some(count) => {
            let mut ids = Vec::with_capacity(count.min(PREALLOC_LIMIT));
            for _ in 0..count {
                ids.push(input.read_u16()?);
            }
            n = input.read_count("object fields")?;
            Some(ids)
        }
        None => None,
    };
    let mut fields = Vec::with_capacity(n.min(PREALLOC_LIMIT));
    for _ in 0..n {
        let id = input.read_u16()?;
        let tag = input.read_tag()?;
        fields.push((id, read_wire(input, tag)?));
    }
    Ok(WireValue::Object { type_ids, fields })
}
