// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory map surface.
//!
//! Records viewport changes and transient layers instead of drawing them.
//! Used for server-side map sessions and in tests.

use super::{FitOptions, LayerId, MapSurface};
use crate::models::{Bounds, Coordinate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A fit that reached the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedFit {
    pub bounds: Bounds,
    pub options: FitOptions,
}

#[derive(Default)]
struct HeadlessState {
    fits: Vec<AppliedFit>,
    layers: BTreeMap<LayerId, Vec<Coordinate>>,
    next_layer: u64,
    layer_updates: u64,
    layers_removed: u64,
}

/// Map surface without a display.
pub struct HeadlessMap {
    ready: watch::Sender<bool>,
    state: Mutex<HeadlessState>,
}

impl HeadlessMap {
    /// Create a surface that is not attached yet.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            ready,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    /// Create a surface that is already attached.
    pub fn ready() -> Self {
        let map = Self::new();
        map.mark_ready();
        map
    }

    /// Attach the surface, releasing any fits waiting on readiness.
    pub fn mark_ready(&self) {
        if !self.ready.send_replace(true) {
            tracing::debug!("Map surface ready");
        }
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recently applied fit.
    pub fn viewport(&self) -> Option<AppliedFit> {
        self.state().fits.last().copied()
    }

    /// Every fit applied so far, oldest first.
    pub fn fit_history(&self) -> Vec<AppliedFit> {
        self.state().fits.clone()
    }

    pub fn fit_count(&self) -> usize {
        self.state().fits.len()
    }

    /// Points of a layer, if it is still on the map.
    pub fn layer(&self, id: LayerId) -> Option<Vec<Coordinate>> {
        self.state().layers.get(&id).cloned()
    }

    pub fn layer_count(&self) -> usize {
        self.state().layers.len()
    }

    /// Number of layer add/update calls (draw steps).
    pub fn layer_updates(&self) -> u64 {
        self.state().layer_updates
    }

    pub fn layers_removed(&self) -> u64 {
        self.state().layers_removed
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        let ready = *self.ready.borrow();
        let state = self.state();
        SurfaceSnapshot {
            ready,
            viewport: state.fits.last().map(|f| f.bounds),
            padding: state.fits.last().map(|f| f.options.padding),
            fit_count: state.fits.len(),
            transient_layers: state
                .layers
                .iter()
                .map(|(id, coords)| LayerSnapshot {
                    id: id.0,
                    points: coords.len(),
                })
                .collect(),
        }
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for HeadlessMap {
    fn readiness(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    fn fit_bounds(&self, bounds: Bounds, options: FitOptions) {
        self.state().fits.push(AppliedFit { bounds, options });
    }

    fn add_route_layer(&self, coords: &[Coordinate]) -> LayerId {
        let mut state = self.state();
        state.next_layer += 1;
        let id = LayerId(state.next_layer);
        state.layers.insert(id, coords.to_vec());
        state.layer_updates += 1;
        id
    }

    fn update_route_layer(&self, layer: LayerId, coords: &[Coordinate]) {
        let mut state = self.state();
        if let Some(points) = state.layers.get_mut(&layer) {
            *points = coords.to_vec();
            state.layer_updates += 1;
        }
    }

    fn remove_layer(&self, layer: LayerId) {
        let mut state = self.state();
        if state.layers.remove(&layer).is_some() {
            state.layers_removed += 1;
        }
    }
}

/// Serializable view of the surface for the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SurfaceSnapshot {
    pub ready: bool,
    pub viewport: Option<Bounds>,
    pub padding: Option<f64>,
    pub fit_count: usize,
    pub transient_layers: Vec<LayerSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LayerSnapshot {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub points: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_flips() {
        let map = HeadlessMap::new();
        assert!(!map.is_ready());
        map.mark_ready();
        assert!(map.is_ready());
        assert!(HeadlessMap::ready().is_ready());
    }

    #[test]
    fn test_layer_lifecycle() {
        let map = HeadlessMap::ready();
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 1.0);

        let id = map.add_route_layer(&[a, b]);
        map.update_route_layer(id, &[a, b, a]);
        assert_eq!(map.layer(id).unwrap().len(), 3);
        assert_eq!(map.layer_updates(), 2);

        map.remove_layer(id);
        map.remove_layer(id);
        assert!(map.layer(id).is_none());
        assert_eq!(map.layers_removed(), 1);
    }

    #[test]
    fn test_snapshot_reports_last_fit() {
        let map = HeadlessMap::ready();
        let bounds = Bounds {
            south: 1.0,
            west: 2.0,
            north: 3.0,
            east: 4.0,
        };
        map.fit_bounds(
            bounds,
            FitOptions {
                padding: 40.0,
                animate: false,
            },
        );
        let snap = map.snapshot();
        assert!(snap.ready);
        assert_eq!(snap.viewport, Some(bounds));
        assert_eq!(snap.padding, Some(40.0));
        assert_eq!(snap.fit_count, 1);
    }
}
