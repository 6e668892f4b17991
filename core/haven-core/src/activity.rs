//! User-activity tracking and idle deadlines.
//!
//! The host forwards qualifying input events (pointer, key, scroll, touch)
//! from a single window-level subscription. Each logical idle timer is one
//! cancellable deadline, recreated at full duration on every qualifying
//! event; expiry is observed by calling [`ActivityMonitor::fired`] during
//! the controller tick. No elapsed-time busy-polling.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use crate::types::InputKind;

/// Timer label for the idle-decoy countdown.
pub const IDLE_DECOY_TIMER: &str = "idle-decoy";

/// Timer label for the inactivity session-expiry countdown.
pub const SESSION_EXPIRY_TIMER: &str = "session-expiry";

struct Deadline {
    duration: Duration,
    fires_at: DateTime<Utc>,
}

/// Tracks last input and a set of named one-shot idle deadlines.
pub struct ActivityMonitor {
    deadlines: HashMap<&'static str, Deadline>,
    last_input_at: DateTime<Utc>,
}

impl ActivityMonitor {
    pub fn new(now: DateTime<Utc>) -> Self {
        ActivityMonitor {
            deadlines: HashMap::new(),
            last_input_at: now,
        }
    }

    /// Records a qualifying input event, recreating every armed deadline at
    /// its full duration.
    pub fn record_input(&mut self, kind: InputKind, now: DateTime<Utc>) {
        trace!(?kind, "Qualifying input");
        self.last_input_at = now;
        for deadline in self.deadlines.values_mut() {
            deadline.fires_at = now + deadline.duration;
        }
    }

    /// (Re)starts the named countdown at full duration. Arming an armed
    /// timer replaces its deadline.
    pub fn arm(&mut self, label: &'static str, duration: Duration, now: DateTime<Utc>) {
        self.deadlines.insert(
            label,
            Deadline {
                duration,
                fires_at: now + duration,
            },
        );
    }

    /// Cancels the named countdown. Unknown labels are ignored.
    pub fn disarm(&mut self, label: &str) {
        self.deadlines.remove(label);
    }

    pub fn is_armed(&self, label: &str) -> bool {
        self.deadlines.contains_key(label)
    }

    /// Returns the labels of deadlines that have elapsed, removing them.
    /// Timers are one-shot; re-arm to restart.
    pub fn fired(&mut self, now: DateTime<Utc>) -> Vec<&'static str> {
        let mut due: Vec<&'static str> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| deadline.fires_at <= now)
            .map(|(label, _)| *label)
            .collect();
        due.sort_unstable();
        for label in &due {
            self.deadlines.remove(label);
        }
        due
    }

    pub fn last_input_at(&self) -> DateTime<Utc> {
        self.last_input_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_armed_timer_fires_after_duration() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        monitor.arm(IDLE_DECOY_TIMER, Duration::minutes(3), t0);

        assert!(monitor.fired(t0 + Duration::minutes(2)).is_empty());
        assert_eq!(
            monitor.fired(t0 + Duration::minutes(3)),
            vec![IDLE_DECOY_TIMER]
        );
    }

    #[test]
    fn test_fired_timer_does_not_fire_again() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        monitor.arm(IDLE_DECOY_TIMER, Duration::minutes(3), t0);

        assert_eq!(monitor.fired(t0 + Duration::minutes(4)).len(), 1);
        assert!(monitor.fired(t0 + Duration::minutes(10)).is_empty());
        assert!(!monitor.is_armed(IDLE_DECOY_TIMER));
    }

    #[test]
    fn test_input_recreates_deadline_at_full_duration() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        monitor.arm(IDLE_DECOY_TIMER, Duration::minutes(3), t0);

        monitor.record_input(InputKind::PointerMove, t0 + Duration::minutes(2));
        // Old deadline would have fired at t0+3; the reset pushes it out.
        assert!(monitor.fired(t0 + Duration::minutes(4)).is_empty());
        assert_eq!(
            monitor.fired(t0 + Duration::minutes(5)),
            vec![IDLE_DECOY_TIMER]
        );
    }

    #[test]
    fn test_timers_are_independent() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        monitor.arm(IDLE_DECOY_TIMER, Duration::minutes(3), t0);
        monitor.arm(SESSION_EXPIRY_TIMER, Duration::minutes(30), t0);

        assert_eq!(
            monitor.fired(t0 + Duration::minutes(3)),
            vec![IDLE_DECOY_TIMER]
        );
        assert!(monitor.is_armed(SESSION_EXPIRY_TIMER));
        assert_eq!(
            monitor.fired(t0 + Duration::minutes(30)),
            vec![SESSION_EXPIRY_TIMER]
        );
    }

    #[test]
    fn test_disarm_cancels_countdown() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        monitor.arm(IDLE_DECOY_TIMER, Duration::minutes(3), t0);
        monitor.disarm(IDLE_DECOY_TIMER);

        assert!(monitor.fired(t0 + Duration::minutes(10)).is_empty());
    }

    #[test]
    fn test_input_updates_last_input_at() {
        let t0 = start();
        let mut monitor = ActivityMonitor::new(t0);
        let t1 = t0 + Duration::seconds(42);
        monitor.record_input(InputKind::Scroll, t1);
        assert_eq!(monitor.last_input_at(), t1);
    }
}
