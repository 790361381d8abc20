// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use territory_map::config::Config;
use territory_map::error::AppError;
use territory_map::models::{ActivityRecord, Coordinate, Territory};
use territory_map::routes::create_router;
use territory_map::services::{
    ActivitySource, BackendSource, FitScheduler, FocusController, FocusSettings,
    RouteRevealAnimator, SessionRegistry,
};
use territory_map::surface::{HeadlessMap, SharedSurface};
use territory_map::AppState;
use tokio::time::Instant;

/// Strava activity ID used by the Copenhagen fixtures.
#[allow(dead_code)]
pub const COPENHAGEN_ACTIVITY_ID: i64 = 42;

/// Five-point boundary around central Copenhagen.
#[allow(dead_code)]
pub fn copenhagen_polygon() -> Vec<Coordinate> {
    vec![
        Coordinate::new(55.6700, 12.5600),
        Coordinate::new(55.6700, 12.5900),
        Coordinate::new(55.6850, 12.5900),
        Coordinate::new(55.6850, 12.5600),
        Coordinate::new(55.6705, 12.5601),
    ]
}

/// A route of `n` points heading north-east from the city hall square.
#[allow(dead_code)]
pub fn copenhagen_route(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| Coordinate::new(55.6761 + i as f64 * 0.0002, 12.5683 + i as f64 * 0.0001))
        .collect()
}

/// Encode coordinates as a precision-5 polyline.
#[allow(dead_code)]
pub fn encode(coords: &[Coordinate]) -> String {
    polyline::encode_coordinates(
        coords.iter().map(|c| geo::Coord { x: c.lng, y: c.lat }),
        5,
    )
    .expect("Failed to encode polyline")
}

#[allow(dead_code)]
pub fn activity(strava_activity_id: i64, polyline: Option<String>) -> ActivityRecord {
    ActivityRecord {
        id: format!("act-{}", strava_activity_id),
        name: Some(format!("Run {}", strava_activity_id)),
        activity_type: Some("Run".to_string()),
        strava_activity_id,
        polyline,
        polygon: None,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap(),
    }
}

/// Activity whose route is a `points`-long Copenhagen path.
#[allow(dead_code)]
pub fn route_activity(strava_activity_id: i64, points: usize) -> ActivityRecord {
    activity(
        strava_activity_id,
        Some(encode(&copenhagen_route(points))),
    )
}

/// Territory 42: Copenhagen polygon with a 60-point route.
#[allow(dead_code)]
pub fn copenhagen_territory() -> Territory {
    Territory::new(
        "territory-42".to_string(),
        "Harbour Loop".to_string(),
        "Run".to_string(),
        COPENHAGEN_ACTIVITY_ID,
        copenhagen_polygon(),
        Some(copenhagen_route(60)),
        Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap(),
    )
    .expect("Copenhagen territory should be valid")
}

/// Territory with a polygon but no usable route.
#[allow(dead_code)]
pub fn territory_without_route(source_activity_id: i64) -> Territory {
    Territory::new(
        format!("territory-{}", source_activity_id),
        "Short".to_string(),
        "Walk".to_string(),
        source_activity_id,
        copenhagen_polygon(),
        Some(vec![Coordinate::new(55.67, 12.56)]),
        Utc::now(),
    )
    .expect("Territory should be valid")
}

/// Focus controller over `map` with default settings.
#[allow(dead_code)]
pub fn controller(map: &Arc<HeadlessMap>) -> FocusController {
    let surface: SharedSurface = map.clone();
    FocusController::new(
        FitScheduler::new(surface.clone()),
        RouteRevealAnimator::new(surface),
        FocusSettings::default(),
    )
}

/// Activity source that replays scripted batches and records fetch times.
///
/// Each fetch returns the next queued batch; once the queue is empty the
/// last batch is repeated.
#[allow(dead_code)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Vec<ActivityRecord>>>,
    last: Mutex<Vec<ActivityRecord>>,
    fail: AtomicBool,
    fetches: Mutex<Vec<Instant>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(initial: Vec<ActivityRecord>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([initial])),
            last: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Queue a batch for the next fetch.
    pub fn then(self, batch: Vec<ActivityRecord>) -> Self {
        self.script.lock().unwrap().push_back(batch);
        self
    }

    /// A source whose every fetch fails.
    pub fn failing() -> Self {
        let source = Self::new(Vec::new());
        source.set_failing(true);
        source
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn fetch_times(&self) -> Vec<Instant> {
        self.fetches.lock().unwrap().clone()
    }
}

impl ActivitySource for ScriptedSource {
    async fn fetch_activities(&self, _user_id: &str) -> Result<Vec<ActivityRecord>, AppError> {
        self.fetches.lock().unwrap().push(Instant::now());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::DataSource("connection refused".to_string()));
        }

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(batch) = next {
            *last = batch;
        }
        Ok(last.clone())
    }
}

/// `ActivitySource` for a shared scripted source, so tests keep a handle.
#[allow(dead_code)]
pub struct SharedSource(pub Arc<ScriptedSource>);

impl ActivitySource for SharedSource {
    async fn fetch_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, AppError> {
        self.0.fetch_activities(user_id).await
    }
}

/// Create a test app with an offline backend.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let sessions = SessionRegistry::new(BackendSource::new_mock(), config.map);

    let state = Arc::new(AppState { config, sessions });

    (create_router(state.clone()), state)
}
