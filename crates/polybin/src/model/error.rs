// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use thiserror::Error;

/// Schema linking failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("unresolved reference '{name}' in {context}")]
    UnresolvedReference { name: String, context: String },

    #[error("invalid default value for {field}: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("duplicate field id {id:#06x} in {class}: '{first}' and '{second}'")]
    DuplicateFieldId {
        class: String,
        id: u16,
        first: String,
        second: String,
    },

    #[error("type id {id:#06x} shared by {first} and {second}")]
    TypeIdCollision { id: u16, first: String, second: String },

    #[error("cyclic inheritance involving {0}")]
    CyclicInheritance(String),

    #[error("type name {0} declared more than once")]
    DuplicateName(String),

    #[error("super type of {class} is not a custom type")]
    InvalidSuperType { class: String },
}
