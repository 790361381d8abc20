// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewport fit scheduling.
//!
//! `FitScheduler` is the only thing allowed to set the visible bounds of a
//! map view. Requests can arrive faster than the map applies them (a list of
//! territories loading incrementally, rapid re-renders), so each request is
//! tagged with a generation number and only the newest one may touch the
//! viewport:
//!
//! 1. Bump the generation counter and capture it as the request's tag
//! 2. Cancel the previously scheduled fit, if it has not run yet
//! 3. Yield to the next scheduling opportunity
//! 4. Drop the request if its tag is no longer current
//! 5. Wait for the surface to become ready, then check the tag again
//! 6. Apply the bounds without animation
//!
//! Fits are always immediate jumps; the reveal animator owns visible motion.

use crate::models::Bounds;
use crate::surface::{FitOptions, SharedSurface};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Generation tag of one fit request.
///
/// Also used to tie other work (like a route reveal) to the fit that
/// preceded it: once a newer fit is scheduled the ticket goes stale.
#[derive(Debug, Clone)]
pub struct FitTicket {
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl FitTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer fit has been scheduled since this one.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// Single authority for viewport bounds of one map view.
///
/// Construct one per map-view lifetime. Dropping it cancels any pending fit.
pub struct FitScheduler {
    surface: SharedSurface,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FitScheduler {
    pub fn new(surface: SharedSurface) -> Self {
        Self {
            surface,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Schedule a fit of the viewport to `bounds`.
    ///
    /// Never fails: a superseded request or a surface that never becomes
    /// ready simply results in no viewport change. Must be called from
    /// within a tokio runtime.
    pub fn schedule_fit(&self, bounds: Bounds, padding: f64) -> FitTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = FitTicket {
            generation,
            counter: Arc::clone(&self.generation),
        };

        let task = tokio::spawn(run_fit(
            Arc::clone(&self.surface),
            ticket.clone(),
            bounds,
            padding,
        ));

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::trace!(generation, "Fit scheduled");
        ticket
    }

    /// Cancel the pending fit, if any.
    pub fn cancel_pending(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = pending {
            task.abort();
        }
    }
}

impl Drop for FitScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn run_fit(surface: SharedSurface, ticket: FitTicket, bounds: Bounds, padding: f64) {
    tokio::task::yield_now().await;

    if !ticket.is_current() {
        tracing::debug!(generation = ticket.generation, "Fit superseded");
        return;
    }

    if !surface.is_ready() {
        tracing::debug!(generation = ticket.generation, "Fit waiting for map surface");
        let mut ready = surface.readiness();
        if ready.wait_for(|ready| *ready).await.is_err() {
            tracing::debug!(generation = ticket.generation, "Map surface went away");
            return;
        }
        if !ticket.is_current() {
            tracing::debug!(
                generation = ticket.generation,
                "Fit superseded while waiting for map surface"
            );
            return;
        }
    }

    surface.fit_bounds(
        bounds,
        FitOptions {
            padding,
            animate: false,
        },
    );
    tracing::debug!(generation = ticket.generation, "Fit applied");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessMap;

    fn bounds(n: f64) -> Bounds {
        Bounds {
            south: n,
            west: n,
            north: n + 1.0,
            east: n + 1.0,
        }
    }

    #[tokio::test]
    async fn test_generation_increments_per_request() {
        let map = Arc::new(HeadlessMap::ready());
        let scheduler = FitScheduler::new(map);
        let a = scheduler.schedule_fit(bounds(1.0), 10.0);
        let b = scheduler.schedule_fit(bounds(2.0), 10.0);
        assert_eq!(a.generation(), 1);
        assert_eq!(b.generation(), 2);
        assert!(!a.is_current());
        assert!(b.is_current());
        assert_eq!(scheduler.generation(), 2);
    }

    #[tokio::test]
    async fn test_cancel_pending_prevents_fit() {
        let map = Arc::new(HeadlessMap::ready());
        let scheduler = FitScheduler::new(map.clone());
        scheduler.schedule_fit(bounds(1.0), 10.0);
        scheduler.cancel_pending();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(map.fit_count(), 0);
    }
}
