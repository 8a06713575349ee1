// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use polybin::model::{CustomType, EnumType, Field, Schema, Type, FLAG_POLYMORPHIC, FLAG_REQUIRED};
use polybin::{BinaryReader, ClassRegistry, CodecConfig};
use std::sync::{Arc, OnceLock};

fn registry() -> &'static ClassRegistry {
    static REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut s = Schema::new();
        s.add_enum(EnumType::new("fz.Kind", ["A", "B"]));
        s.add_class(
            CustomType::new("fz.Node")
                .with_field(Field::new("fz.Node", "id", Type::Int64).with_flag(FLAG_REQUIRED))
                .with_field(Field::new("fz.Node", "kind", Type::named("fz.Kind")))
                .with_field(Field::new("fz.Node", "children", Type::list(Type::named("fz.Node"))).with_flag(FLAG_POLYMORPHIC))
                .with_field(Field::new("fz.Node", "attrs", Type::map(Type::String, Type::Float64))),
        );
        s.add_class(
            CustomType::new("fz.Leaf")
                .extends(Type::named("fz.Node"))
                .with_field(Field::new("fz.Leaf", "payload", Type::array(Type::Int8))),
        );
        let mut registry = ClassRegistry::named("fuzz");
        if let Ok(linked) = s.link() {
            let _ = registry.register_schema(&Arc::new(linked));
        }
        registry
    })
}

fuzz_target!(|data: &[u8]| {
    let config = CodecConfig::default()
        .with_max_collection_len(1 << 16)
        .with_max_string_len(1 << 16);

    // Typed decode against a small self-referential schema
    let mut reader = BinaryReader::with_config(data, registry(), config);
    while let Ok(Some(_)) = reader.read_object() {}

    // Tag-driven decode of the same bytes
    let _ = BinaryReader::with_config(data, registry(), config).read_value();
});
