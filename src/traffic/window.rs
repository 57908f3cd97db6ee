//! Circular time-of-day window selection over minute buckets.

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::ops::Range;
use std::str::FromStr;

use crate::traffic::minute::{MINUTES_PER_DAY, MinuteOfDay, format_time};

/// Minutes on either side of the selected time.
pub const DEFAULT_HALF_WIDTH: u16 = 60;

/// Slider value meaning "no time filter".
pub const ALL_SENTINEL: i32 = -1;

/// Which trips are visible to aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum Query {
    All,
    Minute(MinuteOfDay),
}

impl Query {
    /// Maps a raw slider position (`-1` or `0..=1439`) onto a query.
    pub fn from_slider(value: i32) -> Result<Self> {
        if value == ALL_SENTINEL {
            return Ok(Query::All);
        }
        u16::try_from(value)
            .ok()
            .and_then(MinuteOfDay::new)
            .map(Query::Minute)
            .ok_or_else(|| anyhow!("slider value {value} is outside -1..=1439"))
    }

    pub fn is_filtered(self) -> bool {
        matches!(self, Query::Minute(_))
    }

    /// Label shown next to the time control.
    pub fn label(self) -> String {
        match self {
            Query::All => "(any time)".to_string(),
            Query::Minute(minute) => format_time(minute),
        }
    }
}

impl From<Query> for i32 {
    fn from(query: Query) -> Self {
        match query {
            Query::All => ALL_SENTINEL,
            Query::Minute(minute) => minute.value() as i32,
        }
    }
}

impl From<MinuteOfDay> for Query {
    fn from(minute: MinuteOfDay) -> Self {
        Query::Minute(minute)
    }
}

impl FromStr for Query {
    type Err = anyhow::Error;

    /// Accepts `all`, a slider value (`-1..=1439`) or a 24-hour `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("any") {
            return Ok(Query::All);
        }
        if let Some((hours, minutes)) = s.split_once(':') {
            let hours: u32 = hours
                .parse()
                .map_err(|_| anyhow!("invalid hour in time '{s}'"))?;
            let minutes: u32 = minutes
                .parse()
                .map_err(|_| anyhow!("invalid minute in time '{s}'"))?;
            if hours > 23 || minutes > 59 {
                return Err(anyhow!("time '{s}' is not a valid 24-hour clock time"));
            }
            return Ok(Query::Minute(MinuteOfDay::from_hm(hours, minutes)));
        }
        let value: i32 = s
            .parse()
            .map_err(|_| anyhow!("expected 'all', a minute -1..=1439 or HH:MM, got '{s}'"))?;
        Query::from_slider(value)
    }
}

/// Bucket ranges covered by the window around `query`.
///
/// The window is `[query - half_width, query + half_width)` modulo the day,
/// so the upper edge is exclusive and a half-width of 60 selects exactly
/// 120 buckets. A window crossing midnight is split into `[min, 1440)`
/// followed by `[0, max)`.
pub fn window_ranges(query: Query, half_width: u16) -> Vec<Range<usize>> {
    let minute = match query {
        Query::All => return vec![0..MINUTES_PER_DAY],
        Query::Minute(minute) => minute.value() as i64,
    };
    let day = MINUTES_PER_DAY as i64;
    let half_width = half_width as i64;
    let min_minute = (minute - half_width).rem_euclid(day) as usize;
    let max_minute = (minute + half_width).rem_euclid(day) as usize;

    if min_minute <= max_minute {
        vec![min_minute..max_minute]
    } else {
        vec![min_minute..MINUTES_PER_DAY, 0..max_minute]
    }
}

/// Concatenates the buckets inside the window around `query`.
///
/// `buckets` holds one entry per minute of the day. Order of the result
/// follows bucket order, starting at the window's lower edge.
pub fn select<T>(buckets: &[Vec<T>], query: Query, half_width: u16) -> Vec<&T> {
    debug_assert_eq!(buckets.len(), MINUTES_PER_DAY);
    window_ranges(query, half_width)
        .into_iter()
        .flat_map(move |range| buckets[range].iter().flatten())
        .collect()
}
