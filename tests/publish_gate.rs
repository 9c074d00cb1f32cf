use rigwatch::gate::{
    should_publish, Decision, PublishReason, SkipReason, HEARTBEAT_INTERVAL_MS,
    MIN_PUBLISH_INTERVAL_MS,
};
use rigwatch::status::Status;

fn status(mode: &str, frequency: i64, transmitting: bool, updated_at: i64) -> Status {
    Status {
        mode: mode.to_string(),
        frequency,
        transmitting,
        updated_at,
        last_transmit_at: 0,
    }
}

fn idle(updated_at: i64) -> Status {
    status("USB", 14_200_000, false, updated_at)
}

/// Variants of `idle` with exactly one field changed.
fn changed_variants(updated_at: i64) -> Vec<Status> {
    vec![
        status("LSB", 14_200_000, false, updated_at),
        status("USB", 14_200_100, false, updated_at),
        status("USB", 14_200_000, true, updated_at),
    ]
}

#[test]
fn no_previous_always_publishes() {
    for candidate in [idle(0), idle(1), status("CW", 7_030_000, true, 123_456)] {
        assert_eq!(
            should_publish(None, &candidate),
            Decision::Publish(PublishReason::First)
        );
    }
}

#[test]
fn too_soon_wins_over_changes() {
    let prev = idle(100_000);
    for delta in [0, 1, 2_000, MIN_PUBLISH_INTERVAL_MS - 1] {
        assert_eq!(
            should_publish(Some(&prev), &idle(100_000 + delta)),
            Decision::Skip(SkipReason::TooSoon)
        );
        for candidate in changed_variants(100_000 + delta) {
            assert_eq!(
                should_publish(Some(&prev), &candidate),
                Decision::Skip(SkipReason::TooSoon),
                "delta {} candidate {:?}",
                delta,
                candidate
            );
        }
    }
}

#[test]
fn unchanged_inside_heartbeat_window_is_skipped() {
    let prev = idle(0);
    for delta in [MIN_PUBLISH_INTERVAL_MS, 10_000, 30_000, HEARTBEAT_INTERVAL_MS - 1] {
        assert_eq!(
            should_publish(Some(&prev), &idle(delta)),
            Decision::Skip(SkipReason::Unchanged)
        );
    }
}

#[test]
fn unchanged_after_heartbeat_window_publishes() {
    let prev = idle(0);
    for delta in [HEARTBEAT_INTERVAL_MS, 61_000, 3_600_000] {
        assert_eq!(
            should_publish(Some(&prev), &idle(delta)),
            Decision::Publish(PublishReason::Heartbeat)
        );
    }
}

#[test]
fn any_change_after_min_interval_publishes() {
    let prev = idle(0);
    for delta in [MIN_PUBLISH_INTERVAL_MS, 5_000, 59_999, 120_000] {
        for candidate in changed_variants(delta) {
            assert_eq!(
                should_publish(Some(&prev), &candidate),
                Decision::Publish(PublishReason::Changed)
            );
        }
    }
}

#[test]
fn repeated_idle_polls_publish_once_per_heartbeat_window() {
    // One poll per second for ten minutes with nothing changing.
    let mut previous = idle(0);
    let mut publishes = Vec::new();
    for t in (1_000..=600_000).step_by(1_000) {
        let candidate = idle(t);
        if should_publish(Some(&previous), &candidate).is_publish() {
            publishes.push(t);
            previous = candidate;
        }
    }
    assert_eq!(publishes.len(), 10);
    for pair in publishes.windows(2) {
        assert!(pair[1] - pair[0] >= HEARTBEAT_INTERVAL_MS);
    }
}

#[test]
fn scenario_too_soon() {
    let prev = idle(0);
    assert_eq!(
        should_publish(Some(&prev), &idle(3_000)),
        Decision::Skip(SkipReason::TooSoon)
    );
}

#[test]
fn scenario_no_change_within_window() {
    let prev = idle(0);
    assert_eq!(
        should_publish(Some(&prev), &idle(50_000)),
        Decision::Skip(SkipReason::Unchanged)
    );
}

#[test]
fn scenario_heartbeat() {
    let prev = idle(0);
    assert!(should_publish(Some(&prev), &idle(61_000)).is_publish());
}

#[test]
fn scenario_ptt_keyed() {
    let prev = idle(0);
    let keyed = status("USB", 14_200_000, true, 5_000);
    assert_eq!(
        should_publish(Some(&prev), &keyed),
        Decision::Publish(PublishReason::Changed)
    );
}
