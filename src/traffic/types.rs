//! Data types shared by the aggregation pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::traffic::window::Query;

/// A single bike trip. Only the wall-clock part of the timestamps is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

/// A dock station from the catalog. `short_name` is the key trips refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub short_name: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// Per-station departure and arrival counts for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTraffic {
    pub short_name: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub departures: u32,
    pub arrivals: u32,
    pub total_traffic: u32,
}

impl StationTraffic {
    pub fn new(station: &Station, departures: u32, arrivals: u32) -> Self {
        Self {
            short_name: station.short_name.clone(),
            name: station.name.clone(),
            lat: station.lat,
            lon: station.lon,
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }
}

/// Discrete departure-share level used for color encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowLevel {
    /// Mostly arrivals (or no traffic at all).
    Low,
    Mid,
    /// Mostly departures.
    High,
}

impl FlowLevel {
    /// Output value of the level on the `[0, 1]` color domain.
    pub fn value(self) -> f64 {
        match self {
            FlowLevel::Low => 0.0,
            FlowLevel::Mid => 0.5,
            FlowLevel::High => 1.0,
        }
    }
}

/// One renderable station mark, keyed by `short_name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFlowRecord {
    pub short_name: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub departures: u32,
    pub arrivals: u32,
    pub total_traffic: u32,
    pub flow_ratio: f64,
    pub flow_level: FlowLevel,
}

impl StationFlowRecord {
    /// Tooltip text for the station mark.
    pub fn title(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.total_traffic, self.departures, self.arrivals
        )
    }
}

/// Output range of the radius scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl RadiusRange {
    pub const UNFILTERED: RadiusRange = RadiusRange { min: 0.0, max: 25.0 };
    pub const FILTERED: RadiusRange = RadiusRange { min: 3.0, max: 50.0 };

    /// Windowed counts are much smaller than whole-day counts, so a filtered
    /// query gets a taller range with a non-zero floor.
    pub fn for_query(query: Query) -> Self {
        match query {
            Query::All => Self::UNFILTERED,
            Query::Minute(_) => Self::FILTERED,
        }
    }
}

/// Everything the overlay renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficView {
    pub query: Query,
    pub records: Vec<StationFlowRecord>,
    pub radius_domain_max: u32,
    pub radius_range: RadiusRange,
}

impl TrafficView {
    /// Square-root scale from `[0, radius_domain_max]` onto `radius_range`.
    pub fn radius(&self, total_traffic: u32) -> f64 {
        let RadiusRange { min, max } = self.radius_range;
        if self.radius_domain_max == 0 {
            return min;
        }
        let t = (total_traffic as f64 / self.radius_domain_max as f64).sqrt();
        min + (max - min) * t
    }

    /// Record for `short_name`, if the station is in the catalog.
    pub fn record(&self, short_name: &str) -> Option<&StationFlowRecord> {
        self.records.iter().find(|r| r.short_name == short_name)
    }
}
