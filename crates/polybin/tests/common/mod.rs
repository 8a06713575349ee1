// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Shared fixtures: a "geo" schema in two revisions plus a hand-written
// object type standing in for generated code.

#![allow(dead_code)]

use polybin::model::{CustomType, EnumType, Field, Schema, Type, FLAG_POLYMORPHIC, FLAG_REQUIRED, FLAG_TRANSIENT};
use polybin::object::{downcast, DynamicObject, FromValue, IntoValue, Object, ObjectType, Value};
use polybin::{ClassRegistry, CodecError};
use std::sync::Arc;

pub const POINT_X: u16 = 1;
pub const POINT_Y: u16 = 2;

/// Plain struct implementing the object contract by hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl Object for Point {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn present_fields(&self) -> Vec<(u16, Value)> {
        let mut fields = Vec::new();
        if let Some(x) = self.x {
            fields.push((POINT_X, x.into_value()));
        }
        if let Some(y) = self.y {
            fields.push((POINT_Y, y.into_value()));
        }
        fields
    }

    fn set_field(&mut self, field_id: u16, value: Value) -> Result<bool, CodecError> {
        match field_id {
            POINT_X => self.x = Option::from_value(value)?,
            POINT_Y => self.y = Option::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ObjectType for Point {
    const CLASS_NAME: &'static str = "geo.Point";
}

/// Revision 1 of the geo schema.
///
/// ```text
/// enum  geo.Color  { RED, GREEN, BLUE }
/// class geo.Point  { x: int32 #1, y: int32 #2 }
/// class geo.Shape  { name: string (required), color: geo.Color = "RED", origin: geo.Point }
/// class geo.Circle : geo.Shape { radius: float64 }
/// class geo.Square : geo.Shape { side: int32 }
/// class geo.Scene  { title, shapes: list[geo.Shape] (polymorphic), main: geo.Shape (polymorphic),
///                    labels: map[string, int64], tags: array[string], scratch: int32 (transient) }
/// ```
pub fn schema_v1() -> Arc<Schema> {
    build(false)
}

/// Revision 2 adds `geo.Shape.area`, the `PURPLE` color, `geo.Triangle`
/// and `geo.Scene.version`.
pub fn schema_v2() -> Arc<Schema> {
    build(true)
}

fn build(v2: bool) -> Arc<Schema> {
    let mut s = Schema::new();
    let mut colors = vec!["RED", "GREEN", "BLUE"];
    if v2 {
        colors.push("PURPLE");
    }
    s.add_enum(EnumType::new("geo.Color", colors));

    s.add_class(
        CustomType::new("geo.Point")
            .with_field(Field::new("geo.Point", "x", Type::Int32).with_id(POINT_X))
            .with_field(Field::new("geo.Point", "y", Type::Int32).with_id(POINT_Y)),
    );

    let mut shape = CustomType::new("geo.Shape")
        .with_field(Field::new("geo.Shape", "name", Type::String).with_flag(FLAG_REQUIRED))
        .with_field(Field::new("geo.Shape", "color", Type::named("geo.Color")).with_default("\"RED\""))
        .with_field(Field::new("geo.Shape", "origin", Type::named("geo.Point")));
    if v2 {
        shape = shape.with_field(Field::new("geo.Shape", "area", Type::Float32));
    }
    s.add_class(shape);

    s.add_class(
        CustomType::new("geo.Circle")
            .extends(Type::named("geo.Shape"))
            .with_field(Field::new("geo.Circle", "radius", Type::Float64)),
    );
    s.add_class(
        CustomType::new("geo.Square")
            .extends(Type::named("geo.Shape"))
            .with_field(Field::new("geo.Square", "side", Type::Int32)),
    );
    if v2 {
        s.add_class(
            CustomType::new("geo.Triangle")
                .extends(Type::named("geo.Shape"))
                .with_field(Field::new("geo.Triangle", "base", Type::Float64)),
        );
    }

    let mut scene = CustomType::new("geo.Scene")
        .with_field(Field::new("geo.Scene", "title", Type::String))
        .with_field(
            Field::new("geo.Scene", "shapes", Type::list(Type::named("geo.Shape"))).with_flag(FLAG_POLYMORPHIC),
        )
        .with_field(Field::new("geo.Scene", "main", Type::named("geo.Shape")).with_flag(FLAG_POLYMORPHIC))
        .with_field(Field::new("geo.Scene", "labels", Type::map(Type::String, Type::Int64)))
        .with_field(Field::new("geo.Scene", "tags", Type::array(Type::String)))
        .with_field(Field::new("geo.Scene", "scratch", Type::Int32).with_flag(FLAG_TRANSIENT));
    if v2 {
        scene = scene.with_field(Field::new("geo.Scene", "version", Type::Int64));
    }
    s.add_class(scene);

    Arc::new(s.link().expect("geo schema links"))
}

/// Every class as a [`DynamicObject`], except `geo.Point` which uses
/// [`Point`].
pub fn registry(schema: &Arc<Schema>) -> ClassRegistry {
    let mut registry = ClassRegistry::named("geo").with_schema(Arc::clone(schema));
    registry.register_schema(schema).expect("register schema");
    registry.register_type::<Point>(100).expect("register point");
    registry
}

pub fn object(schema: &Arc<Schema>, class: &str) -> DynamicObject {
    DynamicObject::by_name(schema, class).expect("class in schema")
}

pub fn shape(schema: &Arc<Schema>, class: &str, name: &str) -> DynamicObject {
    object(schema, class).with("name", name).expect("name")
}

pub fn point(x: i32, y: i32) -> Point {
    Point { x: Some(x), y: Some(y) }
}

pub fn dynamic(obj: Box<dyn Object>) -> DynamicObject {
    *downcast::<DynamicObject>(obj).expect("dynamic object")
}

pub fn strings(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::from(*s)).collect())
}
