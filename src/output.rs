//! Output formatting and persistence for traffic views.
//!
//! Supports pretty-printing, JSON serialization, and CSV write/append.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::traffic::TrafficView;

/// One station mark flattened for CSV, tagged with the query it belongs to.
#[derive(Debug, Serialize)]
pub struct RecordRow<'a> {
    pub minute: i32,
    pub time: String,
    pub short_name: &'a str,
    pub name: Option<&'a str>,
    pub lat: f64,
    pub lon: f64,
    pub departures: u32,
    pub arrivals: u32,
    pub total_traffic: u32,
    pub flow_ratio: f64,
    pub flow_level: f64,
    pub radius: f64,
    pub title: String,
}

/// Flattens every record of `view` into CSV rows.
pub fn rows(view: &TrafficView) -> Vec<RecordRow<'_>> {
    let minute = i32::from(view.query);
    let time = view.query.label();
    view.records
        .iter()
        .map(|record| RecordRow {
            minute,
            time: time.clone(),
            short_name: &record.short_name,
            name: record.name.as_deref(),
            lat: record.lat,
            lon: record.lon,
            departures: record.departures,
            arrivals: record.arrivals,
            total_traffic: record.total_traffic,
            flow_ratio: record.flow_ratio,
            flow_level: record.flow_level.value(),
            radius: view.radius(record.total_traffic),
            title: record.title(),
        })
        .collect()
}

/// Logs a view using Rust's debug pretty-print format.
pub fn print_pretty(view: &TrafficView) {
    debug!("{:#?}", view);
}

/// Logs a view as pretty-printed JSON.
pub fn print_json(view: &TrafficView) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Writes a view as JSON to `path`, replacing any existing file.
pub fn write_json(path: &str, view: &TrafficView) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    serde_json::to_writer_pretty(file, view)?;
    info!(path = %path, records = view.records.len(), "JSON view written");
    Ok(())
}

/// Appends all rows of `view` to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_view(path: &str, view: &TrafficView) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV rows");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open {path}"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in rows(view) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::{
        FlowLevel, MinuteOfDay, Query, RadiusRange, StationFlowRecord, TrafficView,
    };
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_view() -> TrafficView {
        let query = Query::Minute(MinuteOfDay::from_hm(8, 0));
        TrafficView {
            query,
            records: vec![
                StationFlowRecord {
                    short_name: "A32000".to_string(),
                    name: Some("Kendall T".to_string()),
                    lat: 42.3625,
                    lon: -71.0843,
                    departures: 3,
                    arrivals: 1,
                    total_traffic: 4,
                    flow_ratio: 0.75,
                    flow_level: FlowLevel::High,
                },
                StationFlowRecord {
                    short_name: "M32006".to_string(),
                    name: None,
                    lat: 42.3601,
                    lon: -71.0942,
                    departures: 0,
                    arrivals: 0,
                    total_traffic: 0,
                    flow_ratio: 0.0,
                    flow_level: FlowLevel::Low,
                },
            ],
            radius_domain_max: 4,
            radius_range: RadiusRange::for_query(query),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_view());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_view()).unwrap();
    }

    #[test]
    fn test_rows() {
        let view = sample_view();
        let rows = rows(&view);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].minute, 480);
        assert_eq!(rows[0].time, "8:00 AM");
        assert_eq!(rows[0].radius, 50.0);
        assert_eq!(rows[0].title, "4 trips (3 departures, 1 arrivals)");
        assert_eq!(rows[1].radius, 3.0);
        assert_eq!(rows[1].flow_level, 0.0);
    }

    #[test]
    fn test_append_view_writes_header_once() {
        let path = temp_path("bikeshare_traffic_test_header.csv");
        let _ = fs::remove_file(&path);

        let view = sample_view();
        append_view(&path, &view).unwrap();
        append_view(&path, &view).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 rows per append
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.starts_with("minute,")).count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("bikeshare_traffic_test_view.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &sample_view()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["query"], 480);
        assert_eq!(json["radius_domain_max"], 4);
        assert_eq!(json["records"][0]["flow_level"], "high");

        fs::remove_file(&path).unwrap();
    }
}
