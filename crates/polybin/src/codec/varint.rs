// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LEB128 varints and zig-zag mapping.
//!
//! 7 payload bits per byte, least significant group first, MSB set on every
//! byte but the last. Signed integers are zig-zag mapped first so small
//! magnitudes of either sign stay short.

use super::CodecError;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Longest encoding of a 32-bit value.
pub const MAX_VARINT32_LEN: usize = 5;
/// Longest encoding of a 64-bit value.
pub const MAX_VARINT64_LEN: usize = 10;

pub fn write_unsigned<W: Write>(w: &mut W, mut value: u64) -> io::Result<()> {
    while value >= 0x80 {
        w.write_u8((value as u8 & 0x7F) | 0x80)?;
        value >>= 7;
    }
    w.write_u8(value as u8)
}

/// Read an unsigned varint of at most `max_len` bytes.
pub fn read_unsigned<R: Read>(r: &mut R, max_len: usize) -> Result<u64, CodecError> {
    let mut value = 0u64;
    for i in 0..max_len {
        let byte = r.read_u8()?;
        let shift = 7 * i as u32;
        let bits = u64::from(byte & 0x7F);
        if shift >= 64 || (shift > 0 && bits >> (64 - shift) != 0) {
            return Err(CodecError::corrupted("varint overflows 64 bits"));
        }
        value |= bits << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(CodecError::corrupted(format!("varint longer than {} bytes", max_len)))
}

pub fn read_unsigned32<R: Read>(r: &mut R) -> Result<u32, CodecError> {
    let value = read_unsigned(r, MAX_VARINT32_LEN)?;
    u32::try_from(value).map_err(|_| CodecError::corrupted("varint overflows 32 bits"))
}

pub fn read_unsigned64<R: Read>(r: &mut R) -> Result<u64, CodecError> {
    read_unsigned(r, MAX_VARINT64_LEN)
}

pub const fn zigzag32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

pub const fn unzigzag32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

pub const fn zigzag64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub const fn unzigzag64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}
