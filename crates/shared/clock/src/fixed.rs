use chrono::Duration;
use conviction_core::Timestamp;
use conviction_ports::Clock;
use std::sync::Mutex;

/// Fixed clock: time only moves when explicitly advanced.
///
/// Round expiry and signal TTL checks are all relative to the injected
/// clock, so tests drive the lifecycle across day/round boundaries by
/// calling [`FixedClock::advance`].
pub struct FixedClock {
    current: Mutex<Timestamp>,
}

impl FixedClock {
    /// Create a clock frozen at the given time
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump forward by the given duration
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Set an absolute time
    pub fn set(&self, to: Timestamp) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn name(&self) -> &str {
        "FixedClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_fixed_clock_only_moves_on_advance() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let clock = FixedClock::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(45));
        assert_eq!(clock.now(), start + Duration::days(45));
    }

    #[test]
    fn test_fixed_clock_set() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
