// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name hashing for field ids and type ids.
//!
//! Every field and every custom type gets a 16-bit identity derived from its
//! name, so independently compiled producers and consumers agree on ids
//! without any central coordination:
//!
//! - [`hash16`]: CRC-16 over the UTF-8 bytes of a name. Default field id and
//!   default type id.
//! - [`hash64`]: CRC-64 (ECMA polynomial) for structural fingerprints where
//!   16 bits are too weak.
//!
//! Neither hash is cryptographic. Collisions between two names are possible;
//! the only defenses are explicit id overrides in the schema and registry
//! entries that carry several fingerprints.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

/// Reflected CRC-16 polynomial (0x8005 bit-reversed).
const CRC16_POLYNOMIAL: u16 = 0xA001;

/// ECMA-182 polynomial, applied in the reflected table form.
const CRC64_POLYNOMIAL: u64 = 0x42F0_E1EB_A9EA_3693;

const CRC16_TABLE: [u16; 256] = crc16_table();
const CRC64_TABLE: [u64; 256] = crc64_table();

const fn crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut v = i as u16;
        let mut j = 0;
        while j < 8 {
            v = if v & 1 == 1 {
                (v >> 1) ^ CRC16_POLYNOMIAL
            } else {
                v >> 1
            };
            j += 1;
        }
        table[i] = v;
        i += 1;
    }
    table
}

const fn crc64_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut v = i as u64;
        let mut j = 0;
        while j < 8 {
            v = if v & 1 == 1 {
                (v >> 1) ^ CRC64_POLYNOMIAL
            } else {
                v >> 1
            };
            j += 1;
        }
        table[i] = v;
        i += 1;
    }
    table
}

/// 16-bit fingerprint of a name (default field id / type id).
///
/// Deterministic across calls and processes.
///
/// # Example
///
/// ```
/// use polybin::hash::hash16;
///
/// assert_eq!(hash16("name"), hash16("name"));
/// assert_ne!(hash16("name"), hash16("tags"));
/// ```
#[must_use]
pub fn hash16(name: &str) -> u16 {
    hash16_bytes(name.as_bytes())
}

/// 16-bit fingerprint of raw bytes.
#[must_use]
pub fn hash16_bytes(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &b| {
        (crc >> 8) ^ CRC16_TABLE[usize::from((crc as u8) ^ b)]
    })
}

/// 64-bit fingerprint of raw bytes.
#[must_use]
pub fn hash64(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |crc, &b| {
        (crc >> 8) ^ CRC64_TABLE[usize::from((crc as u8) ^ b)]
    })
}

/// Display form of a 16-bit id: base64 of its big-endian bytes, unpadded.
#[must_use]
pub fn id_to_base64(id: u16) -> String {
    STANDARD_NO_PAD.encode(id.to_be_bytes())
}

/// Inverse of [`id_to_base64`]. Returns `None` unless the text decodes to
/// exactly two bytes.
#[must_use]
pub fn id_from_base64(text: &str) -> Option<u16> {
    let bytes = STANDARD_NO_PAD.decode(text.trim_end_matches('=')).ok()?;
    let pair: [u8; 2] = bytes.as_slice().try_into().ok()?;
    Some(u16::from_be_bytes(pair))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash16_known_vector() {
        // CRC-16/ARC check value
        assert_eq!(hash16("123456789"), 0xBB3D);
        assert_eq!(hash16(""), 0);
    }

    #[test]
    fn test_hash16_deterministic() {
        assert_eq!(hash16("foo"), hash16("foo"));
        assert_eq!(hash16("foo"), hash16_bytes(b"foo"));
        assert_ne!(hash16("foo"), hash16("bar"));
    }

    #[test]
    fn test_hash64_known_vector() {
        assert_eq!(hash64(b""), 0);
        let a = hash64(b"se.example.Point");
        assert_eq!(a, hash64(b"se.example.Point"));
        assert_ne!(a, hash64(b"se.example.Point3d"));
    }

    #[test]
    fn test_hash64_table_entry() {
        assert_eq!(CRC64_TABLE[0], 0);
        assert_eq!(CRC64_TABLE[128], CRC64_POLYNOMIAL);
    }

    #[test]
    fn test_base64_roundtrip() {
        for id in [0u16, 1, 0x00FF, 0xABCD, u16::MAX] {
            let text = id_to_base64(id);
            assert_eq!(text.len(), 3);
            assert_eq!(id_from_base64(&text), Some(id));
        }
        assert_eq!(id_to_base64(0), "AAA");
        assert_eq!(id_from_base64("AAA="), Some(0));
        assert_eq!(id_from_base64("not base64!"), None);
        assert_eq!(id_from_base64("AAAAAA"), None);
    }
}
