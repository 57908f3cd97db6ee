//! Minute-of-day arithmetic and clock formatting.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

/// Number of minute buckets in a 24-hour cycle.
pub const MINUTES_PER_DAY: usize = 1440;

/// A point in the 24-hour cycle, `0..=1439`, with the date discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);
    pub const LAST: MinuteOfDay = MinuteOfDay(MINUTES_PER_DAY as u16 - 1);

    /// Returns `None` when `value` is outside `0..=1439`.
    pub fn new(value: u16) -> Option<Self> {
        ((value as usize) < MINUTES_PER_DAY).then_some(Self(value))
    }

    /// `hours * 60 + minutes`, wrapped into the day.
    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        let total = (hours as usize * 60 + minutes as usize) % MINUTES_PER_DAY;
        Self(total as u16)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time(*self))
    }
}

/// Minute of day for any timestamp carrying a wall-clock time.
pub fn minute_of_day<T: Timelike>(timestamp: &T) -> MinuteOfDay {
    MinuteOfDay::from_hm(timestamp.hour(), timestamp.minute())
}

/// Short 12-hour clock label such as `12:05 AM` or `1:30 PM`.
pub fn format_time(minute: MinuteOfDay) -> String {
    let value = minute.value() as u32;
    match NaiveTime::from_hms_opt(value / 60, value % 60, 0) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(MinuteOfDay::new(0), Some(MinuteOfDay::MIDNIGHT));
        assert_eq!(MinuteOfDay::new(1439), Some(MinuteOfDay::LAST));
        assert_eq!(MinuteOfDay::new(1440), None);
    }

    #[test]
    fn test_from_hm_wraps() {
        assert_eq!(MinuteOfDay::from_hm(0, 5).value(), 5);
        assert_eq!(MinuteOfDay::from_hm(23, 59).value(), 1439);
        assert_eq!(MinuteOfDay::from_hm(24, 1).value(), 1);
    }

    #[test]
    fn test_minute_of_day_discards_date_and_seconds() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_milli_opt(17, 42, 59, 999)
            .unwrap();
        assert_eq!(minute_of_day(&ts).value(), 17 * 60 + 42);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(MinuteOfDay::MIDNIGHT), "12:00 AM");
        assert_eq!(format_time(MinuteOfDay::from_hm(0, 5)), "12:05 AM");
        assert_eq!(format_time(MinuteOfDay::from_hm(12, 0)), "12:00 PM");
        assert_eq!(format_time(MinuteOfDay::from_hm(13, 30)), "1:30 PM");
        assert_eq!(format_time(MinuteOfDay::LAST), "11:59 PM");
    }
}
