use tracing::debug;

use crate::traffic::aggregate::aggregate;
use crate::traffic::flow::classify_record;
use crate::traffic::index::TimeBucketIndex;
use crate::traffic::types::{RadiusRange, Station, TrafficView, Trip};
use crate::traffic::window::{DEFAULT_HALF_WIDTH, Query};

/// Station catalog plus bucketed trips, queried once per slider position.
///
/// Queries never mutate the catalog or the index; each call builds a fresh
/// record set.
#[derive(Debug, Clone)]
pub struct TrafficViewModel {
    stations: Vec<Station>,
    index: TimeBucketIndex,
    half_width: u16,
}

impl TrafficViewModel {
    pub fn new(stations: Vec<Station>, index: TimeBucketIndex) -> Self {
        Self {
            stations,
            index,
            half_width: DEFAULT_HALF_WIDTH,
        }
    }

    /// Buckets `trips` and wraps them together with the catalog.
    pub fn from_trips<I>(stations: Vec<Station>, trips: I) -> Self
    where
        I: IntoIterator<Item = Trip>,
    {
        Self::new(stations, TimeBucketIndex::build(trips))
    }

    pub fn with_half_width(mut self, half_width: u16) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn index(&self) -> &TimeBucketIndex {
        &self.index
    }

    pub fn half_width(&self) -> u16 {
        self.half_width
    }

    /// Per-station records for `query`, plus the radius scale inputs.
    #[tracing::instrument(skip_all, fields(query = i32::from(query)))]
    pub fn query(&self, query: Query) -> TrafficView {
        let departures = self.index.departures(query, self.half_width);
        let arrivals = self.index.arrivals(query, self.half_width);

        let records: Vec<_> = aggregate(
            &self.stations,
            departures.iter().copied(),
            arrivals.iter().copied(),
        )
        .into_iter()
        .map(classify_record)
        .collect();

        let radius_domain_max = records.iter().map(|r| r.total_traffic).max().unwrap_or(0);

        debug!(
            departures = departures.len(),
            arrivals = arrivals.len(),
            stations = records.len(),
            radius_domain_max,
            "Traffic view computed"
        );

        TrafficView {
            query,
            records,
            radius_domain_max,
            radius_range: RadiusRange::for_query(query),
        }
    }
}
