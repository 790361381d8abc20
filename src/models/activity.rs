// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity record as returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One imported GPS activity (row of `user_activities`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Backend row ID (becomes the territory ID)
    pub id: String,
    /// Activity title; may be missing or blank
    #[serde(default)]
    pub name: Option<String>,
    /// Activity type (Run, Walk, Ride, etc.)
    #[serde(default)]
    pub activity_type: Option<String>,
    /// External (Strava) activity ID used to correlate focus requests
    pub strava_activity_id: i64,
    /// Encoded route (Google polyline, precision 5)
    #[serde(default)]
    pub polyline: Option<String>,
    /// Pre-computed boundary as `[lat, lng]` pairs, when the backend has one
    #[serde(default)]
    pub polygon: Option<Vec<[f64; 2]>>,
    /// Start date/time of the activity
    pub created_at: DateTime<Utc>,
}
