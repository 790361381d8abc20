// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod coordinate;
pub mod focus;
pub mod territory;

pub use activity::ActivityRecord;
pub use coordinate::{Bounds, Coordinate};
pub use focus::{FocusKey, FocusSignal};
pub use territory::Territory;
