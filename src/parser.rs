//! Decoders for the station catalog (JSON) and trip log (CSV).

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime};
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Read;
use tracing::{debug, warn};

use crate::traffic::{Station, Trip};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Returns the payload unchanged unless it starts with the gzip magic bytes.
pub fn decompress_if_gzip(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }
    let mut decoded = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .context("Failed to decompress gzip payload")?;
    debug!(
        compressed = bytes.len(),
        decoded = decoded.len(),
        "Gzip payload decompressed"
    );
    Ok(Cow::Owned(decoded))
}

/// Decodes a station catalog of the form `{"data": {"stations": [...]}}`.
///
/// A bare top-level array of stations is accepted too. Entries without a
/// `short_name` or usable coordinates are skipped.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let bytes = decompress_if_gzip(bytes)?;
    let json: Value =
        serde_json::from_slice(&bytes).context("Station catalog is not valid JSON")?;

    let entries = match &json {
        Value::Array(items) => items,
        _ => json["data"]["stations"]
            .as_array()
            .ok_or_else(|| anyhow!("Station catalog has no data.stations array"))?,
    };

    let mut stations = Vec::with_capacity(entries.len());
    for item in entries {
        match station_from_json(item) {
            Some(station) => stations.push(station),
            None => warn!(entry = %item, "Skipping station without short_name or coordinates"),
        }
    }

    debug!(
        count = stations.len(),
        skipped = entries.len() - stations.len(),
        "Stations parsed"
    );
    Ok(stations)
}

fn station_from_json(item: &Value) -> Option<Station> {
    let short_name = match &item["short_name"] {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(Station {
        short_name,
        name: item["name"].as_str().map(|s| s.to_string()),
        lat: coordinate(&item["lat"])?,
        lon: coordinate(&item["lon"])?,
    })
}

/// Coordinates show up both as JSON numbers and as numeric strings.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One row of the trip CSV; any other columns are ignored.
#[derive(Debug, Deserialize)]
struct TripRow {
    started_at: String,
    ended_at: String,
    start_station_id: String,
    end_station_id: String,
}

/// Decodes a trip CSV with `started_at`, `ended_at`, `start_station_id`
/// and `end_station_id` columns.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let bytes = decompress_if_gzip(bytes)?;
    let mut rdr = csv::Reader::from_reader(&bytes[..]);
    let mut trips = Vec::new();

    for (line, result) in rdr.deserialize::<TripRow>().enumerate() {
        let row = result.with_context(|| format!("Invalid trip row {}", line + 1))?;
        trips.push(Trip {
            started_at: parse_timestamp(&row.started_at)
                .with_context(|| format!("Invalid started_at in trip row {}", line + 1))?,
            ended_at: parse_timestamp(&row.ended_at)
                .with_context(|| format!("Invalid ended_at in trip row {}", line + 1))?,
            start_station_id: row.start_station_id.trim().to_string(),
            end_station_id: row.end_station_id.trim().to_string(),
        });
    }

    debug!(count = trips.len(), "Trips parsed");
    Ok(trips)
}

/// Parses a trip timestamp, keeping the wall-clock time as recorded.
///
/// RFC 3339 values keep their local time; the offset is dropped.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.naive_local())
        .map_err(|_| anyhow!("Unrecognized timestamp '{s}'"))
}
