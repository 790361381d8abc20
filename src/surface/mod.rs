// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map surface abstraction.
//!
//! The surface is the single shared mutable resource of a map view: the
//! fit scheduler writes its bounds, the reveal animator owns the transient
//! route layer, and the render driver paints the stable layers.

pub mod headless;

pub use headless::{HeadlessMap, SurfaceSnapshot};

use crate::models::{Bounds, Coordinate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Options for applying bounds to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    /// Padding around the bounds, in pixels
    pub padding: f64,
    /// Smooth pan/zoom instead of an immediate jump
    pub animate: bool,
}

/// Identifier of a drawn layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub u64);

/// Operations the core needs from a live map.
pub trait MapSurface: Send + Sync + 'static {
    /// Readiness flag. Flips to `true` once the surface is attached.
    fn readiness(&self) -> watch::Receiver<bool>;

    fn is_ready(&self) -> bool {
        let ready = self.readiness();
        let value = *ready.borrow();
        value
    }

    /// Set the visible bounds.
    fn fit_bounds(&self, bounds: Bounds, options: FitOptions);

    /// Add a transient line layer.
    fn add_route_layer(&self, coords: &[Coordinate]) -> LayerId;

    /// Replace the points of a transient line layer.
    fn update_route_layer(&self, layer: LayerId, coords: &[Coordinate]);

    /// Remove a layer. Unknown IDs are ignored.
    fn remove_layer(&self, layer: LayerId);
}

/// Surface handle shared between the scheduler, animator and session.
pub type SharedSurface = Arc<dyn MapSurface>;
