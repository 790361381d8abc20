// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Focus controller tests.
//!
//! These tests verify that:
//! 1. Focusing a territory fits once and reveals its route
//! 2. Re-renders with the same target do nothing
//! 3. Missing targets are sought with bounded retries

use std::sync::Arc;
use std::time::Duration;
use territory_map::error::AppError;
use territory_map::models::{FocusSignal, Territory};
use territory_map::services::focus::seek_with_retry;
use territory_map::services::{
    FocusState, FocusStep, RetryPolicy, RevealOutcome, TerritoryBuilder,
};
use territory_map::surface::HeadlessMap;
use tokio::time::Instant;

mod common;
use common::{ScriptedSource, COPENHAGEN_ACTIVITY_ID};

fn target(id: i64, animate: bool) -> FocusSignal {
    FocusSignal::target(id, animate)
}

#[tokio::test(start_paused = true)]
async fn test_focus_fits_and_reveals_copenhagen_route() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territory = common::copenhagen_territory();
    let signal = target(COPENHAGEN_ACTIVITY_ID, true);

    let step = controller.on_render(&signal, std::slice::from_ref(&territory));
    assert_eq!(step, FocusStep::Revealing { generation: 1 });
    assert!(matches!(controller.state(), FocusState::Found { .. }));

    assert_eq!(controller.finish_reveal().await, Some(RevealOutcome::Completed));

    let fit = map.viewport().expect("Viewport should be fitted");
    assert_eq!(map.fit_count(), 1);
    assert_eq!(fit.bounds, territory.bounds());
    assert_eq!(fit.options.padding, 40.0);
    assert!(!fit.options.animate);

    assert_eq!(map.layer_updates(), 50);
    assert_eq!(map.layer_count(), 0);
    assert_eq!(
        controller.state(),
        FocusState::Settled {
            target: signal.key().unwrap()
        }
    );
    assert_eq!(controller.last_focused(), Some(COPENHAGEN_ACTIVITY_ID));
}

#[tokio::test(start_paused = true)]
async fn test_rerender_same_target_is_noop() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territories = vec![common::copenhagen_territory()];
    let signal = target(COPENHAGEN_ACTIVITY_ID, false);

    assert_eq!(
        controller.on_render(&signal, &territories),
        FocusStep::Fitted { generation: 1 }
    );
    for _ in 0..5 {
        assert_eq!(controller.on_render(&signal, &territories), FocusStep::Unchanged);
    }
    // Toggling animation alone does not refocus.
    assert_eq!(
        controller.on_render(&target(COPENHAGEN_ACTIVITY_ID, true), &territories),
        FocusStep::Unchanged
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.fit_count(), 1);
    assert_eq!(controller.fit_scheduler().generation(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_short_route_falls_back_to_fit_only() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territories = vec![common::territory_without_route(7)];

    let step = controller.on_render(&target(7, true), &territories);
    assert_eq!(step, FocusStep::Fitted { generation: 1 });
    assert!(matches!(controller.state(), FocusState::Settled { .. }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.fit_count(), 1);
    assert_eq!(map.layer_updates(), 0);
    assert_eq!(controller.finish_reveal().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_new_target_cancels_running_reveal() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territories: Vec<Territory> = vec![
        common::copenhagen_territory(),
        common::territory_without_route(7),
    ];

    controller.on_render(&target(COPENHAGEN_ACTIVITY_ID, true), &territories);
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(map.layer_count(), 1);

    let step = controller.on_render(&target(7, false), &territories);
    assert_eq!(step, FocusStep::Fitted { generation: 2 });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.layer_count(), 0);
    assert_eq!(map.fit_count(), 2);
    assert_eq!(controller.last_focused(), Some(7));
}

#[tokio::test(start_paused = true)]
async fn test_missing_target_requests_seek() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let signal = target(99, false);
    let key = signal.key().unwrap();

    assert_eq!(controller.on_render(&signal, &[]), FocusStep::Seek(key));
    assert_eq!(
        controller.state(),
        FocusState::Seeking {
            target: key,
            exhausted: false
        }
    );

    // While seeking, re-renders without the target do not start another seek.
    assert_eq!(controller.on_render(&signal, &[]), FocusStep::Unchanged);

    controller.mark_exhausted(99);
    assert_eq!(
        controller.state(),
        FocusState::Seeking {
            target: key,
            exhausted: true
        }
    );

    let late = TerritoryBuilder::new()
        .build(&common::route_activity(99, 10))
        .unwrap();
    assert_eq!(
        controller.on_render(&signal, &[late]),
        FocusStep::Fitted { generation: 1 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_target_is_idle() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);

    assert_eq!(
        controller.on_render(&FocusSignal::none(), &[common::copenhagen_territory()]),
        FocusStep::Idle
    );
    assert_eq!(controller.state(), FocusState::Idle);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.fit_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_forgets_focus_guard() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territories = vec![common::copenhagen_territory()];
    let signal = target(COPENHAGEN_ACTIVITY_ID, false);

    controller.on_render(&signal, &territories);
    controller.reset();
    assert_eq!(controller.state(), FocusState::Idle);
    assert_eq!(controller.last_focused(), None);

    assert_eq!(
        controller.on_render(&signal, &territories),
        FocusStep::Fitted { generation: 2 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_seek_exhausts_after_three_attempts() {
    let source = ScriptedSource::new(Vec::new());
    let start = Instant::now();

    let outcome = seek_with_retry(
        &source,
        "user-1",
        &TerritoryBuilder::new(),
        99,
        RetryPolicy::default(),
    )
    .await
    .expect("Seek should not fail");

    assert!(!outcome.found);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.territories.map(|t| t.len()), Some(0));
    assert_eq!(source.fetch_count(), 3);

    let offsets: Vec<Duration> = source
        .fetch_times()
        .iter()
        .map(|t| t.duration_since(start))
        .collect();
    assert_eq!(
        offsets,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(6)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_seek_stops_when_target_appears() {
    let source = ScriptedSource::new(Vec::new())
        .then(vec![common::route_activity(99, 10), common::route_activity(1, 10)]);

    let outcome = seek_with_retry(
        &source,
        "user-1",
        &TerritoryBuilder::new(),
        99,
        RetryPolicy::default(),
    )
    .await
    .unwrap();

    assert!(outcome.found);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.territories.map(|t| t.len()), Some(2));
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_seek_propagates_fetch_errors() {
    let source = ScriptedSource::failing();

    let result = seek_with_retry(
        &source,
        "user-1",
        &TerritoryBuilder::new(),
        99,
        RetryPolicy::default(),
    )
    .await;

    assert!(matches!(result, Err(AppError::DataSource(_))));
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_return_to_previous_target_after_missing_one() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let territories = vec![common::copenhagen_territory()];
    let home = target(COPENHAGEN_ACTIVITY_ID, false);

    assert_eq!(
        controller.on_render(&home, &territories),
        FocusStep::Fitted { generation: 1 }
    );
    let missing = target(99, false);
    assert_eq!(
        controller.on_render(&missing, &territories),
        FocusStep::Seek(missing.key().unwrap())
    );

    assert_eq!(
        controller.on_render(&home, &territories),
        FocusStep::Fitted { generation: 2 }
    );
    assert_eq!(
        controller.state(),
        FocusState::Settled {
            target: home.key().unwrap()
        }
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.fit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_switching_sought_target_replaces_seek() {
    let map = Arc::new(HeadlessMap::ready());
    let mut controller = common::controller(&map);
    let first = target(98, false);
    let second = target(99, true);

    assert_eq!(
        controller.on_render(&first, &[]),
        FocusStep::Seek(first.key().unwrap())
    );
    controller.mark_exhausted(98);

    assert_eq!(
        controller.on_render(&second, &[]),
        FocusStep::Seek(second.key().unwrap())
    );
    assert_eq!(
        controller.state(),
        FocusState::Seeking {
            target: second.key().unwrap(),
            exhausted: false
        }
    );

    // A stale exhaustion report for the old target changes nothing.
    controller.mark_exhausted(98);
    assert!(matches!(
        controller.state(),
        FocusState::Seeking {
            exhausted: false,
            ..
        }
    ));
}
