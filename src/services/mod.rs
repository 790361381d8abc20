// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - map engine and backend access.

pub mod fit;
pub mod focus;
pub mod geometry;
pub mod render;
pub mod reveal;
pub mod session;
pub mod source;
pub mod territory;

pub use fit::{FitScheduler, FitTicket};
pub use focus::{FocusController, FocusSettings, FocusState, FocusStep, RetryPolicy};
pub use render::{Drawable, PolygonStyle};
pub use reveal::{RevealHandle, RevealOutcome, RouteRevealAnimator};
pub use session::{MapSession, SessionRegistry};
pub use source::{ActivitySource, BackendSource};
pub use territory::TerritoryBuilder;
