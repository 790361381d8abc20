// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Focus signal: which territory the user wants to look at.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Externally owned navigation state, read on every render.
///
/// Deserializes from query parameters like `?activity=42&animate=true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FocusSignal {
    #[serde(default, rename = "activity")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub source_activity_id: Option<i64>,
    #[serde(default)]
    pub animate: bool,
}

impl FocusSignal {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn target(source_activity_id: i64, animate: bool) -> Self {
        Self {
            source_activity_id: Some(source_activity_id),
            animate,
        }
    }

    pub fn key(&self) -> Option<FocusKey> {
        self.source_activity_id.map(|id| FocusKey {
            source_activity_id: id,
            animate: self.animate,
        })
    }
}

/// A concrete focus target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FocusKey {
    pub source_activity_id: i64,
    pub animate: bool,
}
