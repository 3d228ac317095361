//! Formatted clock strings, replaced only when their text changes.

use chrono::NaiveDateTime;

const CLOCK_FORMAT: &str = "%I:%M %p";
const DATE_FORMAT: &str = "%A, %d";
const SECONDS_FORMAT: &str = "%S";

/// Which parts of the clock changed on the last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockChange {
    /// Hour/minute or day/date text changed
    pub clock: bool,
    pub seconds: bool,
}

impl ClockChange {
    pub fn any(&self) -> bool {
        self.clock || self.seconds
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    clock: String,
    date: String,
    seconds: String,
}

impl ClockFace {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            clock: now.format(CLOCK_FORMAT).to_string(),
            date: now.format(DATE_FORMAT).to_string(),
            seconds: now.format(SECONDS_FORMAT).to_string(),
        }
    }

    /// Re-format for `now` and keep whichever strings differ.
    pub fn update(&mut self, now: NaiveDateTime) -> ClockChange {
        let next = Self::new(now);
        let mut change = ClockChange::default();

        if next.clock != self.clock || next.date != self.date {
            self.clock = next.clock;
            self.date = next.date;
            change.clock = true;
        }
        if next.seconds != self.seconds {
            self.seconds = next.seconds;
            change.seconds = true;
        }

        change
    }

    /// e.g. `03:07 PM`
    pub fn clock(&self) -> &str {
        &self.clock
    }

    /// e.g. `Wednesday, 05`
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn seconds(&self) -> &str {
        &self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_formats() {
        let face = ClockFace::new(at(15, 7, 9));
        assert_eq!(face.clock(), "03:07 PM");
        assert_eq!(face.date(), "Wednesday, 05");
        assert_eq!(face.seconds(), "09");
    }

    #[test]
    fn test_same_instant_reports_no_change() {
        let mut face = ClockFace::new(at(9, 0, 0));
        let change = face.update(at(9, 0, 0));
        assert!(!change.any());
    }

    #[test]
    fn test_seconds_tick_only() {
        let mut face = ClockFace::new(at(9, 0, 0));
        let change = face.update(at(9, 0, 1));

        assert_eq!(
            change,
            ClockChange {
                clock: false,
                seconds: true
            }
        );
        assert_eq!(face.seconds(), "01");
        assert_eq!(face.clock(), "09:00 AM");
    }

    #[test]
    fn test_minute_rollover_changes_clock() {
        let mut face = ClockFace::new(at(9, 0, 59));
        let change = face.update(at(9, 1, 0));

        assert!(change.clock);
        assert!(change.seconds);
        assert_eq!(face.clock(), "09:01 AM");
    }

    #[test]
    fn test_midnight_changes_date() {
        let mut face = ClockFace::new(at(23, 59, 59));
        let next_day = NaiveDate::from_ymd_opt(2024, 6, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        face.update(next_day);

        assert_eq!(face.date(), "Thursday, 06");
        assert_eq!(face.clock(), "12:00 AM");
    }
}
