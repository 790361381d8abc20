// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map sessions: one mounted map view per user.
//!
//! A session owns the map surface, the territory collection and the focus
//! controller for as long as the view is mounted. Unmounting cancels every
//! pending fit, reveal and seek.

use crate::config::MapSettings;
use crate::error::{AppError, Result};
use crate::models::{FocusKey, FocusSignal, Territory};
use crate::services::fit::FitScheduler;
use crate::services::focus::{seek_with_retry, FocusController, FocusState, FocusStep};
use crate::services::render::{self, Drawable};
use crate::services::reveal::RouteRevealAnimator;
use crate::services::source::ActivitySource;
use crate::services::territory::TerritoryBuilder;
use crate::surface::{HeadlessMap, SharedSurface, SurfaceSnapshot};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Result of replacing the territory collection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RefreshSummary {
    pub activities: usize,
    pub territories: usize,
    pub skipped: usize,
}

/// Output of one render pass.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub drawables: Vec<Drawable>,
    pub focus: FocusState,
}

struct SessionInner {
    territories: Vec<Territory>,
    signal: FocusSignal,
    controller: FocusController,
    seek: Option<(i64, JoinHandle<()>)>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// A mounted map view.
pub struct MapSession<S: ActivitySource> {
    user_id: String,
    source: Arc<S>,
    builder: TerritoryBuilder,
    surface: Arc<HeadlessMap>,
    inner: Mutex<SessionInner>,
}

impl<S: ActivitySource> MapSession<S> {
    /// Mount a view: create its surface and load the initial collection.
    ///
    /// Fails if the initial fetch fails, so an unreachable backend is never
    /// mistaken for a user without activities.
    pub async fn mount(user_id: &str, source: Arc<S>, settings: &MapSettings) -> Result<Arc<Self>> {
        let surface = Arc::new(HeadlessMap::new());
        let shared: SharedSurface = surface.clone();

        let controller = FocusController::new(
            FitScheduler::new(shared.clone()),
            RouteRevealAnimator::new(shared)
                .with_steps(settings.reveal_steps)
                .with_grace(settings.reveal_grace),
            settings.focus_settings(),
        );

        let mut builder = TerritoryBuilder::new();
        if let Some(threshold) = settings.close_threshold_meters {
            builder = builder.with_close_threshold(threshold);
        }

        let session = Arc::new(Self {
            user_id: user_id.to_string(),
            source,
            builder,
            surface,
            inner: Mutex::new(SessionInner {
                territories: Vec::new(),
                signal: FocusSignal::none(),
                controller,
                seek: None,
                refreshed_at: None,
            }),
        });

        session.refresh().await?;
        tracing::info!(user_id, "Map session mounted");
        Ok(session)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn surface(&self) -> &Arc<HeadlessMap> {
        &self.surface
    }

    /// Attach the surface; pending fits run now.
    pub fn mark_ready(&self) {
        self.surface.mark_ready();
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.surface.snapshot()
    }

    pub async fn focus_state(&self) -> FocusState {
        self.inner.lock().await.controller.state()
    }

    pub async fn territories(&self) -> Vec<Territory> {
        self.inner.lock().await.territories.clone()
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.refreshed_at
    }

    /// Refetch activities and replace the collection in one step, then
    /// re-render with the last focus signal.
    pub async fn refresh(self: &Arc<Self>) -> Result<RefreshSummary> {
        let activities = self.source.fetch_activities(&self.user_id).await?;
        let territories = self.builder.build_all(&activities);
        let summary = RefreshSummary {
            activities: activities.len(),
            territories: territories.len(),
            skipped: activities.len() - territories.len(),
        };

        let mut inner = self.inner.lock().await;
        inner.territories = territories;
        inner.refreshed_at = Some(Utc::now());
        self.render_locked(&mut inner);

        tracing::info!(
            user_id = %self.user_id,
            territories = summary.territories,
            skipped = summary.skipped,
            "Territories refreshed"
        );
        Ok(summary)
    }

    /// One render pass with the current focus signal.
    pub async fn render(self: &Arc<Self>, signal: FocusSignal) -> RenderFrame {
        let mut inner = self.inner.lock().await;
        inner.signal = signal;
        self.render_locked(&mut inner);

        RenderFrame {
            drawables: render::draw(&inner.territories, signal.source_activity_id),
            focus: inner.controller.state(),
        }
    }

    /// Cancel everything in flight and forget the focus guard.
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        inner.controller.reset();
        if let Some((_, task)) = inner.seek.take() {
            task.abort();
        }
        tracing::info!(user_id = %self.user_id, "Map session unmounted");
    }

    fn render_locked(self: &Arc<Self>, inner: &mut SessionInner) {
        let step = inner.controller.on_render(&inner.signal, &inner.territories);
        match step {
            FocusStep::Seek(key) => self.start_seek(inner, key),
            _ => {
                let sought = match inner.controller.state() {
                    FocusState::Seeking { target, .. } => Some(target.source_activity_id),
                    _ => None,
                };
                if inner.seek.as_ref().is_some_and(|(id, _)| Some(*id) != sought) {
                    if let Some((id, task)) = inner.seek.take() {
                        tracing::debug!(source_activity_id = id, "Dropping stale seek");
                        task.abort();
                    }
                }
            }
        }
    }

    fn start_seek(self: &Arc<Self>, inner: &mut SessionInner, key: FocusKey) {
        if let Some((_, task)) = inner.seek.take() {
            task.abort();
        }

        let session = Arc::clone(self);
        let target = key.source_activity_id;
        let policy = inner.controller.settings().retry;
        let task = tokio::spawn(async move {
            let outcome = seek_with_retry(
                session.source.as_ref(),
                &session.user_id,
                &session.builder,
                target,
                policy,
            )
            .await;

            let mut guard = session.inner.lock().await;
            let inner = &mut *guard;
            if matches!(inner.seek, Some((id, _)) if id == target) {
                inner.seek = None;
            }

            match outcome {
                Ok(outcome) => {
                    if let Some(territories) = outcome.territories {
                        inner.territories = territories;
                        inner.refreshed_at = Some(Utc::now());
                    }
                    if !outcome.found {
                        inner.controller.mark_exhausted(target);
                    }
                    let step = inner.controller.on_render(&inner.signal, &inner.territories);
                    tracing::debug!(step = ?step, source_activity_id = target, "Seek finished");
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %session.user_id,
                        source_activity_id = target,
                        error = %e,
                        "Seek aborted by backend error"
                    );
                    inner.controller.mark_exhausted(target);
                }
            }
        });
        inner.seek = Some((target, task));
    }
}

/// All mounted sessions, keyed by user ID.
pub struct SessionRegistry<S: ActivitySource> {
    source: Arc<S>,
    settings: MapSettings,
    sessions: DashMap<String, Arc<MapSession<S>>>,
}

impl<S: ActivitySource> SessionRegistry<S> {
    pub fn new(source: S, settings: MapSettings) -> Self {
        Self {
            source: Arc::new(source),
            settings,
            sessions: DashMap::new(),
        }
    }

    /// Mount a fresh session for `user_id`, replacing any existing one.
    pub async fn mount(&self, user_id: &str) -> Result<Arc<MapSession<S>>> {
        let session = MapSession::mount(user_id, self.source.clone(), &self.settings).await?;
        let previous = self.sessions.insert(user_id.to_string(), session.clone());
        if let Some(previous) = previous {
            previous.unmount().await;
        }
        Ok(session)
    }

    pub fn get(&self, user_id: &str) -> Result<Arc<MapSession<S>>> {
        self.sessions
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("No map mounted for user {}", user_id)))
    }

    pub async fn unmount(&self, user_id: &str) -> Result<()> {
        let (_, session) = self
            .sessions
            .remove(user_id)
            .ok_or_else(|| AppError::NotFound(format!("No map mounted for user {}", user_id)))?;
        session.unmount().await;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
