// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progressive route reveal animation.
//!
//! Draws a route as a transient line that grows over a fixed number of
//! steps, waits a short grace period, and removes the line. The viewport is
//! never touched here; callers fit once before starting.

use crate::models::territory::MIN_ROUTE_POINTS;
use crate::models::Coordinate;
use crate::services::fit::FitTicket;
use crate::surface::{LayerId, SharedSurface};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_REVEAL_STEPS: u32 = 50;
pub const DEFAULT_REVEAL_DURATION: Duration = Duration::from_millis(3000);
pub const DEFAULT_REVEAL_GRACE: Duration = Duration::from_millis(500);

/// How a reveal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    /// All steps drawn and the line removed after the grace period
    Completed,
    /// Fewer than two points; nothing was drawn
    Skipped,
    /// Cancelled through its handle
    Cancelled,
    /// A newer fit was scheduled while the reveal was running
    Superseded,
}

/// Handle to a running reveal.
///
/// Dropping the handle detaches the animation; it keeps running.
pub struct RevealHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<RevealOutcome>,
}

impl RevealHandle {
    /// Stop the animation and remove its line right away.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the animation to end.
    pub async fn join(self) -> RevealOutcome {
        self.task.await.unwrap_or(RevealOutcome::Cancelled)
    }
}

/// Animates routes on a map surface.
#[derive(Clone)]
pub struct RouteRevealAnimator {
    surface: SharedSurface,
    steps: u32,
    grace: Duration,
}

impl RouteRevealAnimator {
    pub fn new(surface: SharedSurface) -> Self {
        Self {
            surface,
            steps: DEFAULT_REVEAL_STEPS,
            grace: DEFAULT_REVEAL_GRACE,
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps.max(1);
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Start revealing `coords` over `total_duration`.
    ///
    /// When `ticket` is given, the animation stops and cleans up as soon as
    /// a newer fit supersedes it.
    pub fn reveal_route(
        &self,
        coords: Vec<Coordinate>,
        total_duration: Duration,
        ticket: Option<FitTicket>,
    ) -> RevealHandle {
        let (cancel, cancel_rx) = watch::channel(false);
        let run = RevealRun {
            surface: self.surface.clone(),
            coords,
            steps: self.steps.max(1) as usize,
            step_delay: total_duration / self.steps.max(1),
            grace: self.grace,
            ticket,
            cancel: cancel_rx,
            layer: None,
        };
        RevealHandle {
            cancel,
            task: tokio::spawn(run.run()),
        }
    }
}

struct RevealRun {
    surface: SharedSurface,
    coords: Vec<Coordinate>,
    steps: usize,
    step_delay: Duration,
    grace: Duration,
    ticket: Option<FitTicket>,
    cancel: watch::Receiver<bool>,
    layer: Option<LayerId>,
}

impl RevealRun {
    async fn run(mut self) -> RevealOutcome {
        let total = self.coords.len();
        if total < MIN_ROUTE_POINTS {
            return RevealOutcome::Skipped;
        }

        let per_step = (total / self.steps).max(1);
        tracing::debug!(points = total, steps = self.steps, per_step, "Route reveal started");

        for step in 1..=self.steps {
            if let Some(outcome) = self.interrupted() {
                return self.finish(outcome);
            }

            let end = if step == self.steps {
                total
            } else {
                (step * per_step).min(total)
            }
            .max(MIN_ROUTE_POINTS);
            self.draw(end);
            tracing::trace!(step, end, "Route reveal step");

            if !self.pause(self.step_delay).await {
                return self.finish(RevealOutcome::Cancelled);
            }
        }

        if let Some(outcome) = self.interrupted() {
            return self.finish(outcome);
        }
        if !self.pause(self.grace).await {
            return self.finish(RevealOutcome::Cancelled);
        }
        self.finish(RevealOutcome::Completed)
    }

    fn draw(&mut self, end: usize) {
        let visible = &self.coords[..end];
        match self.layer {
            Some(id) => self.surface.update_route_layer(id, visible),
            None => self.layer = Some(self.surface.add_route_layer(visible)),
        }
    }

    fn interrupted(&self) -> Option<RevealOutcome> {
        if *self.cancel.borrow() {
            return Some(RevealOutcome::Cancelled);
        }
        match &self.ticket {
            Some(ticket) if !ticket.is_current() => Some(RevealOutcome::Superseded),
            _ => None,
        }
    }

    /// Sleep, returning `false` if cancelled first.
    async fn pause(&mut self, duration: Duration) -> bool {
        let cancel = &mut self.cancel;
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = wait_cancelled(cancel) => false,
        }
    }

    fn finish(self, outcome: RevealOutcome) -> RevealOutcome {
        if let Some(id) = self.layer {
            self.surface.remove_layer(id);
        }
        tracing::debug!(outcome = ?outcome, "Route reveal finished");
        outcome
    }
}

/// Resolves once cancellation is requested. Never resolves if the handle
/// was dropped.
async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
