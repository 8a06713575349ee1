// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::model::TypeTag;
use crate::registry::RegistryError;
use std::io;
use thiserror::Error;

/// Encode/decode failure.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed framing: bad tag byte, oversized or overlong varint,
    /// map key/value count mismatch.
    #[error("stream corrupted: {0}")]
    StreamCorrupted(String),

    /// The wire tag differs from the statically expected one. The offending
    /// payload has already been skipped.
    #[error("unexpected tag {found}, expected {expected}{context}")]
    UnexpectedTag {
        expected: TypeTag,
        found: TypeTag,
        context: String,
    },

    #[error("unexpected type {found}, expected {expected}")]
    UnexpectedType { expected: String, found: String },

    #[error("unknown type {0}")]
    UnknownType(String),

    #[error("missing required field(s) in {class}: {}", .fields.join(", "))]
    MissingRequiredFields { class: String, fields: Vec<String> },

    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),

    #[error("{what} of {len} exceeds limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        len: u64,
        limit: usize,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CodecError {
    /// Whether the byte stream must be abandoned after this error.
    ///
    /// Routine conditions (missing required fields, invalid values on the
    /// write side, registry misuse) leave the stream positioned after the
    /// current object.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            CodecError::Io(_)
                | CodecError::StreamCorrupted(_)
                | CodecError::UnexpectedTag { .. }
                | CodecError::UnexpectedType { .. }
                | CodecError::DepthLimitExceeded(_)
                | CodecError::LimitExceeded { .. }
        )
    }

    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        CodecError::StreamCorrupted(reason.into())
    }

    pub(crate) fn unexpected_tag(expected: TypeTag, found: TypeTag, field: Option<&str>) -> Self {
        CodecError::UnexpectedTag {
            expected,
            found,
            context: field.map(|f| format!(" for field {}", f)).unwrap_or_default(),
        }
    }
}
