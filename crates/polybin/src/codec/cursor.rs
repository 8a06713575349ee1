// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low-level wire cursors shared by the reader, the writer and the inspector.
//!
//! [`WireInput`] owns limit enforcement (depth, collection and string sizes)
//! and the schema-less skip; [`WireOutput`] the primitive encodings.

use super::varint::{self, read_unsigned32, read_unsigned64, unzigzag32, unzigzag64};
use super::CodecError;
use crate::config::{CodecConfig, MAX_WIRE_SIZE, PREALLOC_LIMIT};
use crate::model::TypeTag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

type Result<T> = std::result::Result<T, CodecError>;

/// Generate big-endian fixed-width read methods.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $method:ident) => {
        pub fn $name(&mut self) -> Result<$type> {
            Ok(self.inner.$method::<BigEndian>()?)
        }
    };
}

/// Generate big-endian fixed-width write methods.
macro_rules! impl_write_be {
    ($name:ident, $type:ty, $method:ident) => {
        pub fn $name(&mut self, value: $type) -> Result<()> {
            Ok(self.inner.$method::<BigEndian>(value)?)
        }
    };
}

/// Byte source with limit tracking.
pub struct WireInput<R> {
    inner: R,
    config: CodecConfig,
    depth: usize,
}

impl<R: Read> WireInput<R> {
    pub fn new(inner: R, config: CodecConfig) -> Self {
        Self {
            inner,
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    impl_read_be!(read_i16, i16, read_i16);
    impl_read_be!(read_u16, u16, read_u16);
    impl_read_be!(read_f32, f32, read_f32);
    impl_read_be!(read_f64, f64, read_f64);

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(unzigzag32(read_unsigned32(&mut self.inner)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(unzigzag64(read_unsigned64(&mut self.inner)?))
    }

    pub fn read_tag(&mut self) -> Result<TypeTag> {
        let byte = self.read_u8()?;
        TypeTag::from_u8(byte).ok_or_else(|| CodecError::corrupted(format!("invalid type tag {}", byte)))
    }

    /// Next tag, or None at a clean end of stream.
    pub fn try_read_tag(&mut self) -> Result<Option<TypeTag>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        TypeTag::from_u8(byte[0])
            .map(Some)
            .ok_or_else(|| CodecError::corrupted(format!("invalid type tag {}", byte[0])))
    }

    /// Unsigned varint size, without any limit beyond the wire maximum.
    pub fn read_raw_size(&mut self) -> Result<usize> {
        let size = u64::from(read_unsigned32(&mut self.inner)?);
        if size > MAX_WIRE_SIZE {
            return Err(CodecError::corrupted(format!("negative size {}", size as u32 as i32)));
        }
        Ok(size as usize)
    }

    /// Element, entry or field count, checked against `max_collection_len`.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let n = self.read_raw_size()?;
        if n > self.config.max_collection_len {
            return Err(CodecError::LimitExceeded {
                what,
                len: n as u64,
                limit: self.config.max_collection_len,
            });
        }
        Ok(n)
    }

    fn read_string_len(&mut self) -> Result<usize> {
        let n = self.read_raw_size()?;
        if n > self.config.max_string_len {
            return Err(CodecError::LimitExceeded {
                what: "string length",
                len: n as u64,
                limit: self.config.max_string_len,
            });
        }
        Ok(n)
    }

    /// Length-prefixed UTF-8. Malformed sequences are replaced, never rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let n = self.read_string_len()?;
        let mut buf = Vec::with_capacity(n.min(PREALLOC_LIMIT * 16));
        (&mut self.inner).take(n as u64).read_to_end(&mut buf)?;
        if buf.len() != n {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(match String::from_utf8(buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Consume exactly `n` bytes.
    pub fn skip_bytes(&mut self, n: u64) -> Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        if copied != n {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(())
    }

    /// Descend one nesting level; pair with [`leave`](Self::leave).
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(CodecError::DepthLimitExceeded(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` one nesting level deeper.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter()?;
        let result = f(self);
        self.leave();
        result
    }

    /// Consume the payload of `tag` without materializing it.
    pub fn skip(&mut self, tag: TypeTag) -> Result<()> {
        if let Some(size) = tag.fixed_size() {
            return self.skip_bytes(size as u64);
        }
        match tag {
            TypeTag::Int32 => read_unsigned32(&mut self.inner).map(drop),
            TypeTag::Int64 => read_unsigned64(&mut self.inner).map(drop),
            TypeTag::String => {
                let n = self.read_string_len()?;
                self.skip_bytes(n as u64)
            }
            TypeTag::List => self.nested(Self::skip_list_body),
            TypeTag::Map => self.nested(|input| {
                if input.read_count("map entries")? > 0 {
                    input.expect_sequence_tag()?;
                    input.skip_list_body()?;
                    input.expect_sequence_tag()?;
                    input.skip_list_body()?;
                }
                Ok(())
            }),
            TypeTag::Custom => self.nested(Self::skip_custom_body),
            // fixed-size tags are handled above
            _ => Ok(()),
        }
    }

    /// Map keys and values are each framed as a tagged list.
    pub fn expect_sequence_tag(&mut self) -> Result<()> {
        match self.read_tag()? {
            TypeTag::List => Ok(()),
            other => Err(CodecError::corrupted(format!(
                "map sequence tagged {} instead of list",
                other
            ))),
        }
    }

    fn skip_list_body(&mut self) -> Result<()> {
        let n = self.read_count("list elements")?;
        if n == 0 {
            return Ok(());
        }
        let tag = self.read_tag()?;
        if let Some(size) = tag.fixed_size() {
            return self.skip_bytes(n as u64 * size as u64);
        }
        for _ in 0..n {
            self.skip(tag)?;
        }
        Ok(())
    }

    fn skip_custom_body(&mut self) -> Result<()> {
        let (type_ids, n) = self.read_custom_header()?;
        if let Some(count) = type_ids {
            self.skip_bytes(2 * count as u64)?;
            let n = self.read_count("object fields")?;
            return self.skip_fields(n);
        }
        self.skip_fields(n)
    }

    /// Decode the combined header varint of an object.
    ///
    /// Returns `(Some(fingerprint_count), 0)` when fingerprints follow (the
    /// field count comes after them), else `(None, field_count)`.
    pub fn read_custom_header(&mut self) -> Result<(Option<usize>, usize)> {
        let v = self.read_raw_size()?;
        let count = v >> 1;
        if count > self.config.max_collection_len {
            return Err(CodecError::LimitExceeded {
                what: "object header count",
                len: count as u64,
                limit: self.config.max_collection_len,
            });
        }
        if v & 1 == 1 {
            Ok((Some(count), 0))
        } else {
            Ok((None, count))
        }
    }

    pub fn skip_fields(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.read_u16()?;
            let tag = self.read_tag()?;
            self.skip(tag)?;
        }
        Ok(())
    }
}

/// Byte sink for the primitive encodings.
pub struct WireOutput<W> {
    inner: W,
    config: CodecConfig,
    depth: usize,
}

impl<W: Write> WireOutput<W> {
    pub fn new(inner: W, config: CodecConfig) -> Self {
        Self {
            inner,
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    impl_write_be!(write_i16, i16, write_i16);
    impl_write_be!(write_u16, u16, write_u16);
    impl_write_be!(write_f32, f32, write_f32);
    impl_write_be!(write_f64, f64, write_f64);

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.inner.write_u8(value)?)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        Ok(self.inner.write_i8(value)?)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_tag(&mut self, tag: TypeTag) -> Result<()> {
        self.write_u8(tag.to_u8())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        Ok(varint::write_unsigned(&mut self.inner, u64::from(varint::zigzag32(value)))?)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        Ok(varint::write_unsigned(&mut self.inner, varint::zigzag64(value))?)
    }

    /// Unsigned varint size; sizes past the wire maximum are rejected.
    pub fn write_size(&mut self, size: usize) -> Result<()> {
        if size as u64 > MAX_WIRE_SIZE {
            return Err(CodecError::LimitExceeded {
                what: "size",
                len: size as u64,
                limit: MAX_WIRE_SIZE as usize,
            });
        }
        Ok(varint::write_unsigned(&mut self.inner, size as u64)?)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_size(value.len())?;
        Ok(self.inner.write_all(value.as_bytes())?)
    }

    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(CodecError::DepthLimitExceeded(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
