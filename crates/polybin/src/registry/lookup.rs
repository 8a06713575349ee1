// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Capability-tagged lookup directions.
//!
//! A lookup declares which mappings to a local id it supports. Asking for an
//! unsupported direction returns [`RegistryError::Unsupported`] instead of
//! guessing.

use super::RegistryError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 16-bit type fingerprints to local id.
    Ids16,
    /// Fully-qualified class names to local id.
    Names,
    /// Base64-rendered fingerprints to local id.
    Base64Ids,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::Ids16 => 0x01,
            Capability::Names => 0x02,
            Capability::Base64Ids => 0x04,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Ids16 => "16-bit id",
            Capability::Names => "name",
            Capability::Base64Ids => "base64 id",
        })
    }
}

/// Set of [`Capability`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x07);

    pub const fn with(self, c: Capability) -> Self {
        Self(self.0 | c.bit())
    }

    pub const fn contains(self, c: Capability) -> bool {
        self.0 & c.bit() != 0
    }

    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Mapping from external type identities to local ids.
///
/// Each candidate list is tried in order; the first hit wins and no hit is
/// `Ok(None)`.
pub trait ClassLookup {
    fn lookup_name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn local_id_from_ids16(&self, _ids: &[u16]) -> Result<Option<u32>, RegistryError> {
        Err(unsupported(self.lookup_name(), Capability::Ids16))
    }

    fn local_id_from_names(&self, _names: &[&str]) -> Result<Option<u32>, RegistryError> {
        Err(unsupported(self.lookup_name(), Capability::Names))
    }

    fn local_id_from_base64_ids(&self, _ids: &[&str]) -> Result<Option<u32>, RegistryError> {
        Err(unsupported(self.lookup_name(), Capability::Base64Ids))
    }
}

pub(crate) fn unsupported(registry: &str, capability: Capability) -> RegistryError {
    RegistryError::Unsupported {
        registry: registry.to_string(),
        capability,
    }
}

/// View of another lookup limited to a subset of its capabilities.
pub struct RestrictedLookup<'a, L: ClassLookup + ?Sized> {
    inner: &'a L,
    allowed: Capabilities,
}

impl<'a, L: ClassLookup + ?Sized> RestrictedLookup<'a, L> {
    pub fn new(inner: &'a L, allowed: Capabilities) -> Self {
        Self { inner, allowed }
    }

    fn check(&self, c: Capability) -> Result<(), RegistryError> {
        if self.capabilities().contains(c) {
            Ok(())
        } else {
            Err(unsupported(self.lookup_name(), c))
        }
    }
}

impl<L: ClassLookup + ?Sized> ClassLookup for RestrictedLookup<'_, L> {
    fn lookup_name(&self) -> &str {
        self.inner.lookup_name()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities().intersect(self.allowed)
    }

    fn local_id_from_ids16(&self, ids: &[u16]) -> Result<Option<u32>, RegistryError> {
        self.check(Capability::Ids16)?;
        self.inner.local_id_from_ids16(ids)
    }

    fn local_id_from_names(&self, names: &[&str]) -> Result<Option<u32>, RegistryError> {
        self.check(Capability::Names)?;
        self.inner.local_id_from_names(names)
    }

    fn local_id_from_base64_ids(&self, ids: &[&str]) -> Result<Option<u32>, RegistryError> {
        self.check(Capability::Base64Ids)?;
        self.inner.local_id_from_base64_ids(ids)
    }
}
