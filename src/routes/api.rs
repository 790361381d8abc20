// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map session API.
//!
//! Each route operates on the map view mounted for one user. A view must be
//! mounted (`POST /api/maps/{user_id}`) before it can be rendered.

use crate::error::{AppError, Result};
use crate::models::FocusSignal;
use crate::services::focus::FocusState;
use crate::services::render;
use crate::services::session::RefreshSummary;
use crate::surface::SurfaceSnapshot;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_USER_ID_LEN: usize = 100;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/maps/{user_id}", post(mount_map).delete(unmount_map))
        .route("/api/maps/{user_id}/refresh", post(refresh_map))
        .route("/api/maps/{user_id}/render", get(render_map))
        .route("/api/maps/{user_id}/ready", post(mark_ready))
        .route("/api/maps/{user_id}/viewport", get(get_viewport))
}

/// Reject user IDs that could not come from the backend.
fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "User ID must be 1-{} characters",
            MAX_USER_ID_LEN
        )));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(
            "User ID may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

// ─── Mount / Unmount ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MountResponse {
    pub user_id: String,
    pub territory_count: usize,
}

/// Mount a map view, replacing any previous one for this user.
async fn mount_map(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<MountResponse>> {
    validate_user_id(&user_id)?;

    let session = state.sessions.mount(&user_id).await?;
    let territory_count = session.territories().await.len();

    Ok(Json(MountResponse {
        user_id,
        territory_count,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnmountResponse {
    pub success: bool,
}

/// Unmount a map view, cancelling pending fits, reveals and seeks.
async fn unmount_map(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UnmountResponse>> {
    validate_user_id(&user_id)?;
    state.sessions.unmount(&user_id).await?;
    Ok(Json(UnmountResponse { success: true }))
}

// ─── Data ────────────────────────────────────────────────────

/// Refetch activities and replace the territory collection.
async fn refresh_map(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<RefreshSummary>> {
    validate_user_id(&user_id)?;
    let session = state.sessions.get(&user_id)?;
    Ok(Json(session.refresh().await?))
}

// ─── Render ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RenderResponse {
    pub focus: FocusState,
    pub territories: geojson::FeatureCollection,
}

/// Render the map with the focus signal from the query string.
async fn render_map(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(signal): Query<FocusSignal>,
) -> Result<Json<RenderResponse>> {
    validate_user_id(&user_id)?;
    tracing::debug!(
        user_id = %user_id,
        source_activity_id = ?signal.source_activity_id,
        animate = signal.animate,
        "Render"
    );

    let session = state.sessions.get(&user_id)?;
    let frame = session.render(signal).await;

    Ok(Json(RenderResponse {
        focus: frame.focus,
        territories: render::to_feature_collection(&frame.drawables),
    }))
}

// ─── Surface ─────────────────────────────────────────────────

/// Mark the map surface attached; fits waiting on it run now.
async fn mark_ready(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SurfaceSnapshot>> {
    validate_user_id(&user_id)?;
    let session = state.sessions.get(&user_id)?;
    session.mark_ready();
    Ok(Json(session.snapshot()))
}

/// Current viewport and transient layers.
async fn get_viewport(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SurfaceSnapshot>> {
    validate_user_id(&user_id)?;
    let session = state.sessions.get(&user_id)?;
    Ok(Json(session.snapshot()))
}
