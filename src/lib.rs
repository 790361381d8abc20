// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory-Map: map viewport coordination for running territories
//!
//! This crate turns imported GPS activities into map territories, decides
//! which territory the map focuses on, and animates route reveals without
//! letting overlapping focus requests fight over the viewport.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod surface;

use config::Config;
use services::{BackendSource, SessionRegistry};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionRegistry<BackendSource>,
}
