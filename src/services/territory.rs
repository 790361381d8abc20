// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Builds territories from activity records.

use crate::models::territory::MIN_POLYGON_POINTS;
use crate::models::{ActivityRecord, Coordinate, Territory};
use crate::services::geometry;

/// Label used when an activity has no name.
pub const UNNAMED_ACTIVITY: &str = "Unnamed Activity";

/// Activity type used when the backend has none.
const UNKNOWN_ACTIVITY_TYPE: &str = "Unknown";

/// Converts activity records into territories.
#[derive(Debug, Clone, Default)]
pub struct TerritoryBuilder {
    /// When set, decoded routes are closed into polygons using this
    /// start/end distance threshold (meters).
    close_threshold_meters: Option<f64>,
}

impl TerritoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close decoded routes into polygon boundaries.
    pub fn with_close_threshold(mut self, meters: f64) -> Self {
        self.close_threshold_meters = Some(meters);
        self
    }

    /// Build a territory, or `None` if the activity has no usable geometry.
    pub fn build(&self, activity: &ActivityRecord) -> Option<Territory> {
        let (polygon, route) = match Self::stored_polygon(activity) {
            // The route is still useful for animation, but optional here.
            Some(polygon) => (
                polygon,
                activity.polyline.as_deref().and_then(geometry::decode_route),
            ),
            None => {
                let Some(encoded) = activity.polyline.as_deref() else {
                    tracing::warn!(
                        activity_id = %activity.id,
                        source_activity_id = activity.strava_activity_id,
                        "Activity has no route or polygon"
                    );
                    return None;
                };
                let route = match geometry::try_decode_route(encoded) {
                    Ok(route) => route,
                    Err(e) => {
                        tracing::warn!(
                            activity_id = %activity.id,
                            source_activity_id = activity.strava_activity_id,
                            error = %e,
                            "Skipping activity with undecodable route"
                        );
                        return None;
                    }
                };
                let polygon = match self.close_threshold_meters {
                    Some(threshold) => geometry::close_route(&route, threshold),
                    None => route.clone(),
                };
                (polygon, Some(route))
            }
        };

        let point_count = polygon.len();
        let territory = Territory::new(
            activity.id.clone(),
            display_name(activity.name.as_deref()),
            activity
                .activity_type
                .clone()
                .unwrap_or_else(|| UNKNOWN_ACTIVITY_TYPE.to_string()),
            activity.strava_activity_id,
            polygon,
            route,
            activity.created_at,
        );

        if territory.is_none() {
            tracing::warn!(
                activity_id = %activity.id,
                source_activity_id = activity.strava_activity_id,
                points = point_count,
                "Route too short for a territory"
            );
        }
        territory
    }

    /// Build territories for a batch. Activities that fail are skipped.
    pub fn build_all(&self, activities: &[ActivityRecord]) -> Vec<Territory> {
        let territories: Vec<Territory> = activities.iter().filter_map(|a| self.build(a)).collect();

        let skipped = activities.len() - territories.len();
        if skipped > 0 {
            tracing::info!(
                built = territories.len(),
                skipped,
                "Built territories with skipped activities"
            );
        } else {
            tracing::debug!(built = territories.len(), "Built territories");
        }
        territories
    }

    /// A stored polygon, if present and valid.
    fn stored_polygon(activity: &ActivityRecord) -> Option<Vec<Coordinate>> {
        let raw = activity.polygon.as_ref()?;
        let polygon: Vec<Coordinate> = raw
            .iter()
            .map(|[lat, lng]| Coordinate::new(*lat, *lng))
            .collect();

        if polygon.len() >= MIN_POLYGON_POINTS && polygon.iter().all(Coordinate::is_finite) {
            Some(polygon)
        } else {
            None
        }
    }
}

fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNNAMED_ACTIVITY.to_string(),
    }
}
