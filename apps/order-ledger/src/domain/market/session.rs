//! Trading Session Calendar
//!
//! Time-of-day windows during which the venue trades. Windows are
//! inclusive at both ends and may wrap past midnight.

use chrono::{NaiveTime, TimeDelta};

use crate::domain::shared::Timestamp;

/// One open/close pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    open: NaiveTime,
    close: NaiveTime,
}

impl SessionWindow {
    /// Create a window. `close` earlier than `open` means the window wraps
    /// midnight.
    #[must_use]
    pub const fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Opening time.
    #[must_use]
    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    /// Closing time.
    #[must_use]
    pub const fn close(&self) -> NaiveTime {
        self.close
    }

    fn wraps(&self) -> bool {
        self.close < self.open
    }

    /// Returns true if `t` lies in the window, ends included.
    #[must_use]
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.wraps() {
            t >= self.open || t <= self.close
        } else {
            self.open <= t && t <= self.close
        }
    }

    /// Time left until close if `t` is strictly inside the window.
    #[must_use]
    pub fn time_to_close(&self, t: NaiveTime) -> Option<TimeDelta> {
        if self.wraps() {
            if t > self.open {
                Some(TimeDelta::days(1) - (t - self.close))
            } else if t < self.close {
                Some(self.close - t)
            } else {
                None
            }
        } else if self.open < t && t < self.close {
            Some(self.close - t)
        } else {
            None
        }
    }
}

/// Ordered set of trading windows evaluated in venue local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCalendar {
    windows: Vec<SessionWindow>,
    utc_offset_minutes: i32,
    close_guard: TimeDelta,
}

impl SessionCalendar {
    /// Create a calendar.
    ///
    /// `utc_offset_minutes` shifts feed timestamps into venue local time.
    /// `close_guard_secs` is how long before a close new orders stop; zero
    /// disables the guard.
    #[must_use]
    pub fn new(windows: Vec<SessionWindow>, utc_offset_minutes: i32, close_guard_secs: u32) -> Self {
        Self {
            windows,
            utc_offset_minutes,
            close_guard: TimeDelta::seconds(i64::from(close_guard_secs)),
        }
    }

    /// Configured windows.
    #[must_use]
    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }

    /// Returns true if `at` falls inside any window.
    #[must_use]
    pub fn is_trading_time(&self, at: Timestamp) -> bool {
        let t = at.local_time(self.utc_offset_minutes);
        self.windows.iter().any(|w| w.contains(t))
    }

    /// Returns true if `at` is strictly inside a window and closer to its
    /// close than the guard.
    #[must_use]
    pub fn is_about_to_close(&self, at: Timestamp) -> bool {
        if self.close_guard <= TimeDelta::zero() {
            return false;
        }
        let t = at.local_time(self.utc_offset_minutes);
        self.windows
            .iter()
            .filter_map(|w| w.time_to_close(t))
            .any(|left| left < self.close_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn calendar(guard: u32) -> SessionCalendar {
        SessionCalendar::new(
            vec![
                SessionWindow::new(hm(21, 0), hm(23, 0)),
                SessionWindow::new(hm(9, 0), hm(11, 30)),
                SessionWindow::new(hm(13, 30), hm(15, 0)),
            ],
            0,
            guard,
        )
    }

    #[test]
    fn boundaries_are_inclusive() {
        let cal = calendar(120);
        assert!(cal.is_trading_time(at("2020-11-02T09:00:00Z")));
        assert!(cal.is_trading_time(at("2020-11-02T11:30:00Z")));
        assert!(!cal.is_trading_time(at("2020-11-02T11:30:01Z")));
        assert!(!cal.is_trading_time(at("2020-11-02T12:00:00Z")));
    }

    #[test]
    fn offset_shifts_into_local_time() {
        let cal = SessionCalendar::new(vec![SessionWindow::new(hm(9, 0), hm(11, 30))], 480, 0);
        assert!(cal.is_trading_time(at("2020-11-02T01:15:00Z")));
        assert!(!cal.is_trading_time(at("2020-11-02T09:15:00Z")));
    }

    #[test]
    fn wrapping_window_spans_midnight() {
        let window = SessionWindow::new(hm(21, 0), hm(2, 30));
        assert!(window.contains(hm(23, 59)));
        assert!(window.contains(hm(0, 30)));
        assert!(!window.contains(hm(3, 0)));
        assert_eq!(window.time_to_close(hm(23, 0)), Some(TimeDelta::minutes(210)));
        assert_eq!(window.time_to_close(hm(2, 0)), Some(TimeDelta::minutes(30)));
    }

    #[test]
    fn about_to_close_inside_guard() {
        let cal = calendar(120);
        assert!(cal.is_about_to_close(at("2020-11-02T14:58:30Z")));
        assert!(!cal.is_about_to_close(at("2020-11-02T14:57:00Z")));
    }

    #[test]
    fn about_to_close_excludes_the_close_instant() {
        let cal = calendar(120);
        assert!(!cal.is_about_to_close(at("2020-11-02T15:00:00Z")));
    }

    #[test]
    fn zero_guard_disables_check() {
        let cal = calendar(0);
        assert!(!cal.is_about_to_close(at("2020-11-02T14:59:59Z")));
    }
}
