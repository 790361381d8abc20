// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route decoding and polygon helpers.

use crate::models::Coordinate;
use geo::{Coord, Distance, Haversine, Point};

/// Precision of Strava/Google encoded polylines.
pub const POLYLINE_PRECISION: u32 = 5;

/// Extra decimal digits requested from the polyline decoder. The decoder
/// rejects values outside WGS84 ranges; decoding at a finer precision and
/// scaling back lets out-of-range coordinates through unmodified, up to
/// 100x the usual ranges.
const RANGE_HEADROOM_DIGITS: u32 = 2;

/// Minimum number of decoded points for a usable route.
const MIN_ROUTE_POINTS: usize = 2;

/// Endpoints closer than this are treated as the same point when snapping.
const SNAP_EPSILON_METERS: f64 = 0.1;

/// Why a route could not be decoded. Logged, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Empty route")]
    Empty,

    #[error("Failed to decode polyline: {0}")]
    Malformed(String),

    #[error("Route has {0} points, need at least 2")]
    TooShort(usize),

    #[error("Route contains non-finite coordinates")]
    NonFinite,
}

/// Decode an encoded route into coordinates.
///
/// Returns `None` for empty, malformed or single-point input. Partial
/// results are never returned.
pub fn decode_route(encoded: &str) -> Option<Vec<Coordinate>> {
    match try_decode_route(encoded) {
        Ok(coords) => Some(coords),
        Err(e) => {
            tracing::debug!(error = %e, len = encoded.len(), "Route decode rejected");
            None
        }
    }
}

/// Decode an encoded route, reporting why it was rejected.
pub fn try_decode_route(encoded: &str) -> Result<Vec<Coordinate>, GeometryError> {
    if encoded.is_empty() {
        return Err(GeometryError::Empty);
    }

    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION + RANGE_HEADROOM_DIGITS)
        .map_err(|e| GeometryError::Malformed(e.to_string()))?;

    let scale = 10_f64.powi(RANGE_HEADROOM_DIGITS as i32);
    let coords: Vec<Coordinate> = line
        .0
        .into_iter()
        .map(|c| Coordinate::new(c.y * scale, c.x * scale))
        .collect();

    if coords.len() < MIN_ROUTE_POINTS {
        return Err(GeometryError::TooShort(coords.len()));
    }
    if !coords.iter().all(Coordinate::is_finite) {
        return Err(GeometryError::NonFinite);
    }

    Ok(coords)
}

/// Great-circle distance in meters.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(Point::from(Coord::from(a)), Point::from(Coord::from(b)))
}

/// Close a route into a polygon boundary.
///
/// If the last point is farther than `threshold_meters` from the first, the
/// first point is appended. If it is closer but not identical, the last
/// point is replaced by the first. Routes under three points are returned
/// unchanged.
pub fn close_route(route: &[Coordinate], threshold_meters: f64) -> Vec<Coordinate> {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return route.to_vec();
    };
    if route.len() < 3 {
        return route.to_vec();
    }

    let gap = haversine_meters(first, last);
    let mut polygon = route.to_vec();
    if gap > threshold_meters {
        polygon.push(first);
    } else if gap > SNAP_EPSILON_METERS {
        if let Some(end) = polygon.last_mut() {
            *end = first;
        }
    }
    polygon
}
