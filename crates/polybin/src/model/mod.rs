// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema type model.
//!
//! - [`TypeTag`]: one-byte wire tags
//! - [`Type`], [`CustomType`], [`EnumType`]: type variants
//! - [`Field`]: named, typed, flagged class members with stable 16-bit ids
//! - [`DefaultValue`]: JSON defaults materialized at link time
//! - [`Schema`]: the arena holding every named type, plus the linker

mod default_value;
mod error;
mod field;
mod schema;
mod tag;
mod types;

pub use default_value::{DefaultValue, TYPE_KEY};
pub use error::LinkError;
pub use field::{Field, FLAG_PARKED, FLAG_POLYMORPHIC, FLAG_REQUIRED, FLAG_STATIC, FLAG_TRANSIENT};
pub use schema::{Ancestors, NamedType, Schema};
pub use tag::TypeTag;
pub use types::{ClassRef, CustomType, EnumRef, EnumType, Type};
