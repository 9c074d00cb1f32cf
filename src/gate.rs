//! Publish gate: decides whether a freshly polled status goes to the datastore.
//!
//! Two thresholds keep the dashboard current without flooding it:
//!
//! * [`MIN_PUBLISH_INTERVAL_MS`]: nothing is published within 4.5 s of the previous
//!   publish, even if the state changed. This check runs first.
//! * [`HEARTBEAT_INTERVAL_MS`]: an unchanged state is republished once 60 s have passed,
//!   so consumers can tell an idle station from a dead process.

use crate::status::Status;

/// Minimum time between two publishes ("too soon").
pub const MIN_PUBLISH_INTERVAL_MS: i64 = 4_500;
/// Republish interval for an unchanged state ("still alive").
pub const HEARTBEAT_INTERVAL_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishReason {
    /// No previous snapshot exists.
    First,
    /// Mode, frequency or PTT differs from the previous snapshot.
    Changed,
    /// State is unchanged but the heartbeat interval has elapsed.
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooSoon,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Publish(PublishReason),
    Skip(SkipReason),
}

impl Decision {
    pub fn is_publish(&self) -> bool {
        matches!(self, Decision::Publish(_))
    }
}

pub fn should_publish(previous: Option<&Status>, candidate: &Status) -> Decision {
    let Some(previous) = previous else {
        return Decision::Publish(PublishReason::First);
    };
    let elapsed = candidate.updated_at.saturating_sub(previous.updated_at);
    if elapsed < MIN_PUBLISH_INTERVAL_MS {
        return Decision::Skip(SkipReason::TooSoon);
    }
    if previous.same_state(candidate) {
        if elapsed < HEARTBEAT_INTERVAL_MS {
            return Decision::Skip(SkipReason::Unchanged);
        }
        return Decision::Publish(PublishReason::Heartbeat);
    }
    Decision::Publish(PublishReason::Changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(updated_at: i64) -> Status {
        Status {
            mode: "USB".to_string(),
            frequency: 14_200_000,
            transmitting: false,
            updated_at,
            last_transmit_at: 0,
        }
    }

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        let prev = at(10_000);
        let mut changed = at(10_000 + MIN_PUBLISH_INTERVAL_MS - 1);
        changed.frequency += 500;
        assert_eq!(
            should_publish(Some(&prev), &changed),
            Decision::Skip(SkipReason::TooSoon)
        );

        changed.updated_at = 10_000 + MIN_PUBLISH_INTERVAL_MS;
        assert_eq!(
            should_publish(Some(&prev), &changed),
            Decision::Publish(PublishReason::Changed)
        );

        assert_eq!(
            should_publish(Some(&prev), &at(10_000 + HEARTBEAT_INTERVAL_MS - 1)),
            Decision::Skip(SkipReason::Unchanged)
        );
        assert_eq!(
            should_publish(Some(&prev), &at(10_000 + HEARTBEAT_INTERVAL_MS)),
            Decision::Publish(PublishReason::Heartbeat)
        );
    }

    #[test]
    fn timestamp_behind_previous_is_too_soon() {
        let prev = at(50_000);
        assert_eq!(
            should_publish(Some(&prev), &at(20_000)),
            Decision::Skip(SkipReason::TooSoon)
        );
    }

    #[test]
    fn last_transmit_at_alone_is_not_a_change() {
        let prev = at(0);
        let mut candidate = at(10_000);
        candidate.last_transmit_at = 9_000;
        assert_eq!(
            should_publish(Some(&prev), &candidate),
            Decision::Skip(SkipReason::Unchanged)
        );
    }
}
