// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory → drawable mapping.

use crate::models::{Coordinate, Territory};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

/// Polygon styling. Only the focused territory is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonStyle {
    Focused,
    Normal,
}

impl PolygonStyle {
    pub fn fill_color(self) -> &'static str {
        match self {
            PolygonStyle::Focused => "#f97316",
            PolygonStyle::Normal => "#3b82f6",
        }
    }

    pub fn border_color(self) -> &'static str {
        match self {
            PolygonStyle::Focused => "#c2410c",
            PolygonStyle::Normal => "#1d4ed8",
        }
    }

    pub fn fill_opacity(self) -> f64 {
        match self {
            PolygonStyle::Focused => 0.5,
            PolygonStyle::Normal => 0.25,
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            PolygonStyle::Focused => 3,
            PolygonStyle::Normal => 2,
        }
    }
}

/// One filled polygon plus its label marker.
#[derive(Debug, Clone, Serialize)]
pub struct Drawable {
    pub territory_id: String,
    pub source_activity_id: i64,
    pub name: String,
    pub activity_type: String,
    pub polygon: Vec<Coordinate>,
    pub label: Coordinate,
    pub style: PolygonStyle,
}

/// Map every territory to a drawable, highlighting `focus_id`.
pub fn draw(territories: &[Territory], focus_id: Option<i64>) -> Vec<Drawable> {
    territories
        .iter()
        .map(|t| Drawable {
            territory_id: t.id().to_string(),
            source_activity_id: t.source_activity_id(),
            name: t.name().to_string(),
            activity_type: t.activity_type().to_string(),
            polygon: t.polygon().to_vec(),
            label: t.bounds().center(),
            style: if Some(t.source_activity_id()) == focus_id {
                PolygonStyle::Focused
            } else {
                PolygonStyle::Normal
            },
        })
        .collect()
}

/// GeoJSON (`[lng, lat]`) for a set of drawables: one Polygon and one
/// label Point feature per territory.
pub fn to_feature_collection(drawables: &[Drawable]) -> FeatureCollection {
    let features = drawables
        .iter()
        .flat_map(|d| [polygon_feature(d), label_feature(d)])
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn position(c: &Coordinate) -> Vec<f64> {
    vec![c.lng, c.lat]
}

fn polygon_feature(d: &Drawable) -> Feature {
    let mut ring: Vec<Vec<f64>> = d.polygon.iter().map(position).collect();
    // GeoJSON rings must be closed.
    if d.polygon.first() != d.polygon.last() {
        if let Some(first) = d.polygon.first() {
            ring.push(position(first));
        }
    }

    let mut properties = base_properties(d, "territory");
    properties.insert("fill".to_string(), d.style.fill_color().into());
    properties.insert("stroke".to_string(), d.style.border_color().into());
    properties.insert("fill-opacity".to_string(), d.style.fill_opacity().into());
    properties.insert("stroke-width".to_string(), d.style.weight().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: Some(Id::String(d.territory_id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn label_feature(d: &Drawable) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(position(&d.label)))),
        id: Some(Id::String(format!("{}-label", d.territory_id))),
        properties: Some(base_properties(d, "label")),
        foreign_members: None,
    }
}

fn base_properties(d: &Drawable, kind: &str) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), kind.into());
    properties.insert("name".to_string(), d.name.clone().into());
    properties.insert("activity_type".to_string(), d.activity_type.clone().into());
    properties.insert(
        "source_activity_id".to_string(),
        d.source_activity_id.into(),
    );
    properties.insert(
        "focused".to_string(),
        (d.style == PolygonStyle::Focused).into(),
    );
    properties
}
