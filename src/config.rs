//! Environment-driven settings.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file by the binary). CLI flags take precedence over these.

use anyhow::{Context, Result, anyhow};

use crate::traffic::DEFAULT_HALF_WIDTH;

pub const DEFAULT_STATIONS_SOURCE: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
pub const DEFAULT_TRIPS_SOURCE: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/bikeshare_traffic.log";

/// Largest half-width that still describes a window shorter than a day.
pub const MAX_HALF_WIDTH: u16 = 720;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub stations_source: String,
    pub trips_source: String,
    pub half_width: u16,
    pub log_file_path: String,
}

impl Settings {
    /// Reads `BIKESHARE_STATIONS_SOURCE`, `BIKESHARE_TRIPS_SOURCE`,
    /// `BIKESHARE_HALF_WIDTH` and `LOG_FILE_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let half_width = match lookup("BIKESHARE_HALF_WIDTH") {
            Some(raw) => parse_half_width(&raw).context("BIKESHARE_HALF_WIDTH is invalid")?,
            None => DEFAULT_HALF_WIDTH,
        };

        Ok(Self {
            stations_source: lookup("BIKESHARE_STATIONS_SOURCE")
                .unwrap_or_else(|| DEFAULT_STATIONS_SOURCE.to_string()),
            trips_source: lookup("BIKESHARE_TRIPS_SOURCE")
                .unwrap_or_else(|| DEFAULT_TRIPS_SOURCE.to_string()),
            half_width,
            log_file_path: lookup("LOG_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
        })
    }
}

/// Parses a window half-width in minutes, `0..=720`.
pub fn parse_half_width(raw: &str) -> Result<u16> {
    let value: u16 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{raw}' is not a whole number of minutes"))?;
    if value > MAX_HALF_WIDTH {
        return Err(anyhow!("half-width {value} exceeds {MAX_HALF_WIDTH} minutes"));
    }
    Ok(value)
}
