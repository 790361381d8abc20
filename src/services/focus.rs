// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory focus state machine.
//!
//! Reacts to the focus signal on every render and decides whether to fit
//! the viewport, start a route reveal, or go looking for a territory that
//! has not shown up in the collection yet.
//!
//! ```text
//!            target missing               found (retry or refresh)
//!   Idle ─────────────────────▶ Seeking ───────────────────────────┐
//!    │                                                             ▼
//!    │  target present, animate + route          reveal ends
//!    ├───────────────────────────────────▶ Found ─────────────▶ Settled
//!    │  target present, otherwise                                  ▲
//!    └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A source activity that was already focused during this mount is never
//! focused again until the target ID changes, so unrelated re-renders do
//! not restart the fit/reveal cycle. Switching to a target that has to be
//! sought counts as a change; switching away from a sought target drops
//! the seek.

use crate::error::Result;
use crate::models::{FocusKey, FocusSignal, Territory};
use crate::services::fit::FitScheduler;
use crate::services::reveal::{RevealHandle, RevealOutcome, RouteRevealAnimator};
use crate::services::source::ActivitySource;
use crate::services::territory::TerritoryBuilder;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_FIT_PADDING_PX: f64 = 40.0;
pub const DEFAULT_SEEK_ATTEMPTS: u32 = 3;
pub const DEFAULT_SEEK_DELAY: Duration = Duration::from_secs(2);

/// Bounded retry for targets that have not materialized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay before each attempt
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_SEEK_ATTEMPTS,
            delay: DEFAULT_SEEK_DELAY,
        }
    }
}

/// Tuning for the focus controller.
#[derive(Debug, Clone, Copy)]
pub struct FocusSettings {
    pub padding: f64,
    pub reveal_duration: Duration,
    pub retry: RetryPolicy,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            padding: DEFAULT_FIT_PADDING_PX,
            reveal_duration: crate::services::reveal::DEFAULT_REVEAL_DURATION,
            retry: RetryPolicy::default(),
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FocusState {
    /// No focus target
    Idle,
    /// Target not in the collection; `exhausted` once retries ran out
    Seeking { target: FocusKey, exhausted: bool },
    /// Viewport fitted, reveal in progress
    Found { target: FocusKey, generation: u64 },
    /// Done with this target
    Settled { target: FocusKey },
}

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusStep {
    /// No target in the signal
    Idle,
    /// Nothing new to do
    Unchanged,
    /// Target missing; the caller should start a seek
    Seek(FocusKey),
    /// Viewport fit scheduled, no animation
    Fitted { generation: u64 },
    /// Viewport fit scheduled and a reveal started
    Revealing { generation: u64 },
}

/// Owns the fit scheduler and animator of one map view and decides when to
/// use them.
pub struct FocusController {
    fit: FitScheduler,
    animator: RouteRevealAnimator,
    settings: FocusSettings,
    state: FocusState,
    last_focused: Option<i64>,
    reveal: Option<RevealHandle>,
}

impl FocusController {
    pub fn new(fit: FitScheduler, animator: RouteRevealAnimator, settings: FocusSettings) -> Self {
        Self {
            fit,
            animator,
            settings,
            state: FocusState::Idle,
            last_focused: None,
            reveal: None,
        }
    }

    pub fn settings(&self) -> &FocusSettings {
        &self.settings
    }

    pub fn fit_scheduler(&self) -> &FitScheduler {
        &self.fit
    }

    /// Current state. A reveal that has ended reads as `Settled`.
    pub fn state(&self) -> FocusState {
        match self.state {
            FocusState::Found { target, .. } if !self.reveal_running() => {
                FocusState::Settled { target }
            }
            state => state,
        }
    }

    /// Source activity focused most recently in this mount.
    pub fn last_focused(&self) -> Option<i64> {
        self.last_focused
    }

    /// Run one render pass against the current signal and collection.
    pub fn on_render(&mut self, signal: &FocusSignal, territories: &[Territory]) -> FocusStep {
        self.state = self.state();

        let Some(key) = signal.key() else {
            if !matches!(self.state, FocusState::Found { .. }) {
                self.state = FocusState::Idle;
            }
            return FocusStep::Idle;
        };

        // The signal moved away from the target being sought.
        if let FocusState::Seeking { target, .. } = self.state {
            if target.source_activity_id != key.source_activity_id {
                self.state = FocusState::Idle;
            }
        }

        if self.last_focused == Some(key.source_activity_id) {
            return FocusStep::Unchanged;
        }

        if let FocusState::Seeking { target, exhausted } = self.state {
            if target.source_activity_id == key.source_activity_id {
                return match find(territories, key.source_activity_id) {
                    Some(territory) => self.focus(key, territory),
                    None => {
                        self.state = FocusState::Seeking {
                            target: key,
                            exhausted,
                        };
                        FocusStep::Unchanged
                    }
                };
            }
        }

        self.cancel_reveal();
        match find(territories, key.source_activity_id) {
            Some(territory) => self.focus(key, territory),
            None => {
                tracing::info!(
                    source_activity_id = key.source_activity_id,
                    "Focus target not loaded yet, seeking"
                );
                // Returning to the previous target later counts as a change.
                self.last_focused = None;
                self.state = FocusState::Seeking {
                    target: key,
                    exhausted: false,
                };
                FocusStep::Seek(key)
            }
        }
    }

    /// Record that the seek for `source_activity_id` ran out of attempts.
    pub fn mark_exhausted(&mut self, source_activity_id: i64) {
        if let FocusState::Seeking { target, .. } = self.state {
            if target.source_activity_id == source_activity_id {
                self.state = FocusState::Seeking {
                    target,
                    exhausted: true,
                };
            }
        }
    }

    /// Wait for the running reveal, if any, and settle.
    pub async fn finish_reveal(&mut self) -> Option<RevealOutcome> {
        let handle = self.reveal.take()?;
        let outcome = handle.join().await;
        self.state = self.state();
        Some(outcome)
    }

    /// Drop all per-mount state: pending fit, running reveal, guard.
    pub fn reset(&mut self) {
        self.cancel_reveal();
        self.fit.cancel_pending();
        self.state = FocusState::Idle;
        self.last_focused = None;
    }

    fn focus(&mut self, key: FocusKey, territory: &Territory) -> FocusStep {
        let ticket = self
            .fit
            .schedule_fit(territory.bounds(), self.settings.padding);
        let generation = ticket.generation();
        self.last_focused = Some(key.source_activity_id);

        if key.animate {
            if let Some(route) = territory.animatable_route() {
                self.reveal = Some(self.animator.reveal_route(
                    route.to_vec(),
                    self.settings.reveal_duration,
                    Some(ticket),
                ));
                self.state = FocusState::Found {
                    target: key,
                    generation,
                };
                tracing::info!(
                    source_activity_id = key.source_activity_id,
                    generation,
                    points = route.len(),
                    "Focused territory, revealing route"
                );
                return FocusStep::Revealing { generation };
            }
            tracing::debug!(
                source_activity_id = key.source_activity_id,
                "Route too short to animate, fitting only"
            );
        }

        self.state = FocusState::Settled { target: key };
        tracing::info!(
            source_activity_id = key.source_activity_id,
            generation,
            "Focused territory"
        );
        FocusStep::Fitted { generation }
    }

    fn reveal_running(&self) -> bool {
        self.reveal.as_ref().is_some_and(|r| !r.is_finished())
    }

    fn cancel_reveal(&mut self) {
        if let Some(handle) = self.reveal.take() {
            handle.cancel();
        }
    }
}

fn find(territories: &[Territory], source_activity_id: i64) -> Option<&Territory> {
    territories
        .iter()
        .find(|t| t.source_activity_id() == source_activity_id)
}

/// Result of a seek.
#[derive(Debug)]
pub struct SeekOutcome {
    /// Collection from the last fetch, if any fetch ran
    pub territories: Option<Vec<Territory>>,
    pub found: bool,
    pub attempts: u32,
}

/// Refetch until `target` shows up or the retry budget runs out.
///
/// Waits `policy.delay` before each fetch. Fetch errors end the seek and
/// are returned unchanged.
pub async fn seek_with_retry<S: ActivitySource>(
    source: &S,
    user_id: &str,
    builder: &TerritoryBuilder,
    target: i64,
    policy: RetryPolicy,
) -> Result<SeekOutcome> {
    let mut territories = None;

    for attempt in 1..=policy.attempts {
        tokio::time::sleep(policy.delay).await;

        let activities = source.fetch_activities(user_id).await?;
        let built = builder.build_all(&activities);
        let found = find(&built, target).is_some();
        tracing::debug!(
            user_id,
            source_activity_id = target,
            attempt,
            found,
            "Seek attempt"
        );
        territories = Some(built);

        if found {
            return Ok(SeekOutcome {
                territories,
                found: true,
                attempts: attempt,
            });
        }
    }

    tracing::warn!(
        user_id,
        source_activity_id = target,
        attempts = policy.attempts,
        "Focus target still missing after retries"
    );
    Ok(SeekOutcome {
        territories,
        found: false,
        attempts: policy.attempts,
    })
}
