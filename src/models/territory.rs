// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory value object: a map polygon derived from one activity.

use crate::models::{Bounds, Coordinate};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Minimum number of points for a renderable polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Minimum number of points for a route that can be animated.
pub const MIN_ROUTE_POINTS: usize = 2;

/// A claimed area on the map. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Territory {
    id: String,
    name: String,
    activity_type: String,
    source_activity_id: i64,
    polygon: Vec<Coordinate>,
    route_coordinates: Option<Vec<Coordinate>>,
    created_at: DateTime<Utc>,
    bounds: Bounds,
}

impl Territory {
    /// Construct a territory, or `None` if the polygon has fewer than three
    /// points or contains a non-finite coordinate.
    pub fn new(
        id: String,
        name: String,
        activity_type: String,
        source_activity_id: i64,
        polygon: Vec<Coordinate>,
        route_coordinates: Option<Vec<Coordinate>>,
        created_at: DateTime<Utc>,
    ) -> Option<Self> {
        if polygon.len() < MIN_POLYGON_POINTS || !polygon.iter().all(Coordinate::is_finite) {
            return None;
        }
        let bounds = Bounds::from_coordinates(&polygon)?;
        Some(Self {
            id,
            name,
            activity_type,
            source_activity_id,
            polygon,
            route_coordinates,
            created_at,
            bounds,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn source_activity_id(&self) -> i64 {
        self.source_activity_id
    }

    pub fn polygon(&self) -> &[Coordinate] {
        &self.polygon
    }

    pub fn route_coordinates(&self) -> Option<&[Coordinate]> {
        self.route_coordinates.as_deref()
    }

    /// Route to animate, if it has enough points to draw a line.
    pub fn animatable_route(&self) -> Option<&[Coordinate]> {
        self.route_coordinates()
            .filter(|route| route.len() >= MIN_ROUTE_POINTS)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Bounding box of the polygon.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
