// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec limits and defaults.

/// Maximum nesting of lists, maps and objects while reading or writing.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum element count of a single list or map, and maximum field count
/// of a single object (16 Mi).
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 16 * 1024 * 1024;

/// Maximum byte length of a single string (64 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Largest size a varint length prefix may declare. Larger values read as
/// negative on 32-bit-signed decoders and mean the stream is corrupted.
pub const MAX_WIRE_SIZE: u64 = i32::MAX as u64;

/// Upper bound on capacity reserved up front from a declared length.
/// Containers grow past it as elements actually arrive.
pub const PREALLOC_LIMIT: usize = 4096;

/// Constant substituted for enum names the reader does not know.
pub const UNKNOWN_ENUM_CONSTANT: &str = "UNKNOWN";

/// Reader/writer configuration.
///
/// # Example
///
/// ```
/// use polybin::CodecConfig;
///
/// let config = CodecConfig::default().with_max_depth(16).with_compact(false);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub max_depth: usize,
    pub max_collection_len: usize,
    pub max_string_len: usize,
    /// Omit the fingerprint header when an object's concrete type equals
    /// the statically declared field type. Top-level objects and
    /// polymorphic fields always carry it.
    pub compact: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            compact: true,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_collection_len(mut self, len: usize) -> Self {
        self.max_collection_len = len;
        self
    }

    #[must_use]
    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}
