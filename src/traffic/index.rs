use std::sync::Arc;
use tracing::debug;

use crate::traffic::minute::{MINUTES_PER_DAY, minute_of_day};
use crate::traffic::types::Trip;
use crate::traffic::window::{Query, select};

/// Trips bucketed by minute of day, once by start time and once by end time.
///
/// Built once per loaded dataset and read-only afterwards. Both bucket
/// arrays share the same `Arc<Trip>` allocations.
#[derive(Debug, Clone)]
pub struct TimeBucketIndex {
    departure_buckets: Vec<Vec<Arc<Trip>>>,
    arrival_buckets: Vec<Vec<Arc<Trip>>>,
    trip_count: usize,
}

impl TimeBucketIndex {
    #[tracing::instrument(skip_all)]
    pub fn build<I>(trips: I) -> Self
    where
        I: IntoIterator<Item = Trip>,
    {
        let mut departure_buckets: Vec<Vec<Arc<Trip>>> = vec![Vec::new(); MINUTES_PER_DAY];
        let mut arrival_buckets: Vec<Vec<Arc<Trip>>> = vec![Vec::new(); MINUTES_PER_DAY];
        let mut trip_count = 0;

        for trip in trips {
            let trip = Arc::new(trip);
            departure_buckets[minute_of_day(&trip.started_at).index()].push(Arc::clone(&trip));
            arrival_buckets[minute_of_day(&trip.ended_at).index()].push(trip);
            trip_count += 1;
        }

        debug!(trip_count, "Time bucket index built");

        Self {
            departure_buckets,
            arrival_buckets,
            trip_count,
        }
    }

    pub fn trip_count(&self) -> usize {
        self.trip_count
    }

    pub fn departure_buckets(&self) -> &[Vec<Arc<Trip>>] {
        &self.departure_buckets
    }

    pub fn arrival_buckets(&self) -> &[Vec<Arc<Trip>>] {
        &self.arrival_buckets
    }

    /// Trips that started inside the window around `query`.
    pub fn departures(&self, query: Query, half_width: u16) -> Vec<&Trip> {
        select(&self.departure_buckets, query, half_width)
            .into_iter()
            .map(|trip| &**trip)
            .collect()
    }

    /// Trips that ended inside the window around `query`.
    pub fn arrivals(&self, query: Query, half_width: u16) -> Vec<&Trip> {
        select(&self.arrival_buckets, query, half_width)
            .into_iter()
            .map(|trip| &**trip)
            .collect()
    }
}
