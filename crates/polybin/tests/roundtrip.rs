// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Write -> read equality for dynamic and hand-written objects, plus a golden
// byte vector for the compact object layout.

#![allow(clippy::float_cmp)]

mod common;

use common::*;
use polybin::hash::{hash16, id_to_base64};
use polybin::model::{CustomType, Field, Schema, Type};
use polybin::object::{DynamicObject, Object, Value};
use polybin::{BinaryReader, BinaryWriter, ClassRegistry, CodecConfig};
use std::sync::Arc;

fn scene(s: &Arc<Schema>) -> DynamicObject {
    let circle = shape(s, "geo.Circle", "c1")
        .with("radius", 2.5f64)
        .unwrap()
        .with("origin", Value::Object(Box::new(point(1, -2))))
        .unwrap();
    let square = shape(s, "geo.Square", "s1")
        .with("side", 4)
        .unwrap()
        .with("color", Value::Enum("BLUE".into()))
        .unwrap();
    object(s, "geo.Scene")
        .with("title", "demo")
        .unwrap()
        .with(
            "shapes",
            Value::List(vec![Value::Object(Box::new(circle.clone())), Value::Object(Box::new(square))]),
        )
        .unwrap()
        .with("main", Value::Object(Box::new(circle)))
        .unwrap()
        .with(
            "labels",
            Value::Map(vec![("a".into(), Value::Int64(1)), ("b".into(), Value::Int64(-2))]),
        )
        .unwrap()
        .with("tags", Value::Array(vec!["x".into(), "y".into()]))
        .unwrap()
}

#[test]
fn test_scene_roundtrip() {
    let s = schema_v1();
    let r = registry(&s);
    let original = scene(&s);

    let bytes = polybin::to_bytes(&original, &r).unwrap();
    let decoded = polybin::from_bytes(&bytes, &r).unwrap().unwrap();

    assert_eq!(decoded.class_name(), "geo.Scene");
    assert_eq!(decoded.as_ref(), &original as &dyn Object);

    let decoded = dynamic(decoded);
    let shapes = decoded.get("shapes").and_then(Value::as_slice).unwrap();
    assert_eq!(shapes[0].as_object().unwrap().class_name(), "geo.Circle");
    assert_eq!(shapes[1].as_object().unwrap().class_name(), "geo.Square");
}

#[test]
fn test_typed_point_roundtrip() {
    let s = schema_v1();
    let r = registry(&s);

    let mut writer = BinaryWriter::new(Vec::new(), &r);
    writer.write_object(&point(3, -4)).unwrap();
    writer.write_object(&Point { x: None, y: Some(9) }).unwrap();
    let bytes = writer.into_inner();

    let mut reader = BinaryReader::new(&bytes[..], &r);
    assert_eq!(reader.read_typed::<Point>().unwrap(), Some(point(3, -4)));
    assert_eq!(reader.read_typed::<Point>().unwrap(), Some(Point { x: None, y: Some(9) }));
    assert!(reader.into_inner().is_empty());
}

#[test]
fn test_nested_typed_object_inside_dynamic() {
    let s = schema_v1();
    let r = registry(&s);
    let original = shape(&s, "geo.Shape", "anchor")
        .with("origin", Value::Object(Box::new(point(7, 8))))
        .unwrap();

    let bytes = polybin::to_bytes(&original, &r).unwrap();
    let decoded = dynamic(polybin::from_bytes(&bytes, &r).unwrap().unwrap());
    let origin = decoded.get("origin").cloned().unwrap().into_typed::<Point>().unwrap();
    assert_eq!(origin, point(7, 8));
}

#[test]
fn test_golden_compact_record() {
    let mut schema = Schema::new();
    schema.add_class(
        CustomType::new("demo.Record")
            .with_field(Field::new("demo.Record", "id", Type::Int32).with_id(1))
            .with_field(Field::new("demo.Record", "name", Type::String).with_id(2))
            .with_field(Field::new("demo.Record", "tags", Type::list(Type::String)).with_id(3)),
    );
    let schema = Arc::new(schema.link().unwrap());
    let mut r = ClassRegistry::new();
    r.register_schema(&schema).unwrap();

    let record = DynamicObject::by_name(&schema, "demo.Record")
        .unwrap()
        .with("id", 7)
        .unwrap()
        .with("name", "abc")
        .unwrap()
        .with("tags", strings(&["x", "y"]))
        .unwrap();

    let mut writer = BinaryWriter::new(Vec::new(), &r);
    writer.write_object_as(&record, "demo.Record").unwrap();
    let bytes = writer.into_inner();
    assert_eq!(
        bytes,
        [10, 6, 0, 1, 3, 14, 0, 2, 7, 3, b'a', b'b', b'c', 0, 3, 8, 2, 7, 1, b'x', 1, b'y']
    );

    let decoded = BinaryReader::new(&bytes[..], &r)
        .read_object_of("demo.Record")
        .unwrap()
        .unwrap();
    assert_eq!(decoded.as_ref(), &record as &dyn Object);
}

#[test]
fn test_primitive_extremes() {
    let mut schema = Schema::new();
    schema.add_class(
        CustomType::new("demo.All")
            .with_field(Field::new("demo.All", "b", Type::Bool))
            .with_field(Field::new("demo.All", "i8", Type::Int8))
            .with_field(Field::new("demo.All", "i16", Type::Int16))
            .with_field(Field::new("demo.All", "i32", Type::Int32))
            .with_field(Field::new("demo.All", "i64", Type::Int64))
            .with_field(Field::new("demo.All", "f32", Type::Float32))
            .with_field(Field::new("demo.All", "f64", Type::Float64))
            .with_field(Field::new("demo.All", "s", Type::String))
            .with_field(Field::new("demo.All", "empty", Type::list(Type::Int32)))
            .with_field(Field::new("demo.All", "nothing", Type::map(Type::Int8, Type::Bool))),
    );
    let schema = Arc::new(schema.link().unwrap());
    let mut r = ClassRegistry::new();
    r.register_schema(&schema).unwrap();

    let cases = [
        (i8::MIN, i16::MIN, i32::MIN, i64::MIN, f32::MIN, f64::NEG_INFINITY),
        (i8::MAX, i16::MAX, i32::MAX, i64::MAX, f32::MAX, f64::INFINITY),
        (0, -1, -1, -1, f32::EPSILON, -0.0),
    ];
    for (a, b, c, d, e, f) in cases {
        let obj = DynamicObject::by_name(&schema, "demo.All")
            .unwrap()
            .with("b", a < 0)
            .and_then(|o| o.with("i8", a))
            .and_then(|o| o.with("i16", b))
            .and_then(|o| o.with("i32", c))
            .and_then(|o| o.with("i64", d))
            .and_then(|o| o.with("f32", e))
            .and_then(|o| o.with("f64", f))
            .and_then(|o| o.with("s", "h\u{e9}llo \u{2713}"))
            .and_then(|o| o.with("empty", Value::List(Vec::new())))
            .and_then(|o| o.with("nothing", Value::Map(Vec::new())))
            .unwrap();
        let bytes = polybin::to_bytes(&obj, &r).unwrap();
        let back = polybin::from_bytes(&bytes, &r).unwrap().unwrap();
        assert_eq!(back.as_ref(), &obj as &dyn Object);
    }
}

#[test]
fn test_non_compact_roundtrip() {
    let s = schema_v1();
    let r = registry(&s);
    let original = scene(&s);
    let config = CodecConfig::default().with_compact(false);

    let mut compact = BinaryWriter::new(Vec::new(), &r);
    compact.write_object(&original).unwrap();
    let mut verbose = BinaryWriter::with_config(Vec::new(), &r, config);
    verbose.write_object(&original).unwrap();
    let verbose = verbose.into_inner();
    assert!(verbose.len() > compact.into_inner().len());

    let decoded = BinaryReader::with_config(&verbose[..], &r, config)
        .read_object()
        .unwrap()
        .unwrap();
    assert_eq!(decoded.as_ref(), &original as &dyn Object);
}

#[test]
fn test_ids_are_stable() {
    // CRC-16 of the names; changing these breaks every stored stream.
    assert_eq!(hash16("geo.Shape"), 0x34FD);
    assert_eq!(hash16("geo.Circle"), 0xEBF9);
    assert_eq!(hash16("name"), 0x8DA1);
    assert_eq!(hash16("radius"), 0x431F);
    assert_eq!(id_to_base64(hash16("geo.Point")), "LvA");

    let s = schema_v1();
    let r = registry(&s);
    let circle = r.get_by_name("geo.Circle").unwrap();
    assert_eq!(circle.ancestry(), [0xEBF9u16, 0x34FD]);
    assert_eq!(circle.type_hash_base64(), "6/k");
}

#[test]
fn test_nested_collections_roundtrip() {
    // list[map[string, list[array[int16]]]]
    let typ = Type::list(Type::map(Type::String, Type::list(Type::array(Type::Int16))));
    let mut schema = Schema::new();
    schema.add_class(CustomType::new("demo.Grid").with_field(Field::new("demo.Grid", "cells", typ)));
    let schema = Arc::new(schema.link().unwrap());
    let mut r = ClassRegistry::new();
    r.register_schema(&schema).unwrap();

    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..20 {
        let cells = (0..rng.usize(0..4))
            .map(|_| {
                Value::Map(
                    (0..rng.usize(0..3))
                        .map(|k| {
                            let rows = (0..rng.usize(0..3))
                                .map(|_| Value::Array((0..rng.usize(0..5)).map(|_| Value::Int16(rng.i16(..))).collect()))
                                .collect();
                            (Value::String(format!("k{}", k)), Value::List(rows))
                        })
                        .collect(),
                )
            })
            .collect();
        let grid = DynamicObject::by_name(&schema, "demo.Grid")
            .unwrap()
            .with("cells", Value::List(cells))
            .unwrap();
        let bytes = polybin::to_bytes(&grid, &r).unwrap();
        let back = polybin::from_bytes(&bytes, &r).unwrap().unwrap();
        assert_eq!(back.as_ref(), &grid as &dyn Object);
    }
}
