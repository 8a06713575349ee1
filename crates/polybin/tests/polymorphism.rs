// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Fingerprint placement and assignability checks.

mod common;

use common::*;
use polybin::hash::hash16;
use polybin::object::{Object, Value};
use polybin::{BinaryReader, BinaryWriter, CodecError, Inspector, WireValue};

fn inspect(bytes: &[u8]) -> WireValue {
    Inspector::new(bytes).next_value().unwrap().unwrap()
}

fn field(value: &WireValue, id: u16) -> &WireValue {
    match value {
        WireValue::Object { fields, .. } => &fields.iter().find(|(f, _)| *f == id).unwrap().1,
        other => panic!("not an object: {}", other),
    }
}

fn type_ids(value: &WireValue) -> Option<&[u16]> {
    match value {
        WireValue::Object { type_ids, .. } => type_ids.as_deref(),
        other => panic!("not an object: {}", other),
    }
}

#[test]
fn test_fingerprints_only_where_needed() {
    let s = schema_v1();
    let r = registry(&s);
    let circle = shape(&s, "geo.Circle", "c")
        .with("origin", Value::Object(Box::new(point(0, 0))))
        .unwrap();
    let scene = object(&s, "geo.Scene")
        .with("main", Value::Object(Box::new(circle)))
        .unwrap();

    let wire = inspect(&polybin::to_bytes(&scene, &r).unwrap());
    assert_eq!(type_ids(&wire), Some(&[hash16("geo.Scene")][..]));

    // Polymorphic field: full ancestry, most derived first.
    let main = field(&wire, hash16("main"));
    assert_eq!(type_ids(main), Some(&[hash16("geo.Circle"), hash16("geo.Shape")][..]));

    // Static field holding exactly its declared class: no fingerprints.
    let origin = field(main, hash16("origin"));
    assert_eq!(type_ids(origin), None);
}

#[test]
fn test_subclass_at_static_site_keeps_fingerprints() {
    let s = schema_v1();
    let r = registry(&s);
    let circle = shape(&s, "geo.Circle", "c");

    let mut writer = BinaryWriter::new(Vec::new(), &r);
    writer.write_object_as(&circle, "geo.Shape").unwrap();
    let bytes = writer.into_inner();
    assert!(type_ids(&inspect(&bytes)).is_some());

    let decoded = BinaryReader::new(&bytes[..], &r)
        .read_object_of("geo.Shape")
        .unwrap()
        .unwrap();
    assert_eq!(decoded.class_name(), "geo.Circle");
}

#[test]
fn test_sibling_class_is_rejected_on_write_and_read() {
    let s = schema_v1();
    let r = registry(&s);
    let square = shape(&s, "geo.Square", "sq");

    let mut writer = BinaryWriter::new(Vec::new(), &r);
    assert!(matches!(
        writer.write_object_as(&square, "geo.Circle"),
        Err(CodecError::UnexpectedType { .. })
    ));

    let bytes = polybin::to_bytes(&square, &r).unwrap();
    let mut reader = BinaryReader::new(&bytes[..], &r);
    match reader.read_object_of("geo.Circle") {
        Err(CodecError::UnexpectedType { expected, found }) => {
            assert_eq!(expected, "geo.Circle");
            assert_eq!(found, "geo.Square");
        }
        other => panic!("expected type mismatch, got {:?}", other),
    }
    assert!(reader.into_inner().is_empty());
}

#[test]
fn test_wrong_class_in_typed_field_is_rejected() {
    let s = schema_v1();
    let r = registry(&s);
    // geo.Shape.origin is declared geo.Point.
    let mut bad = shape(&s, "geo.Shape", "x");
    let err = bad
        .set("origin", Value::Object(Box::new(shape(&s, "geo.Circle", "c"))))
        .unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedType { .. }));
    bad.set("origin", Value::Object(Box::new(point(1, 2)))).unwrap();
    assert!(polybin::to_bytes(&bad, &r).is_ok());
}

#[test]
fn test_unregistered_class_cannot_be_written_or_expected() {
    let s = schema_v1();
    let r = registry(&s);
    let scene = object(&s, "geo.Scene");
    let mut writer = BinaryWriter::new(Vec::new(), &r);
    assert!(matches!(
        writer.write_object_as(&scene, "geo.Hexagon"),
        Err(CodecError::UnknownType(_))
    ));
    let bytes = polybin::to_bytes(&scene, &r).unwrap();
    assert!(matches!(
        BinaryReader::new(&bytes[..], &r).read_object_of("geo.Hexagon"),
        Err(CodecError::UnknownType(_))
    ));
}
