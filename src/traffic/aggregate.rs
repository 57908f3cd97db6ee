use std::collections::HashMap;

use crate::traffic::types::{Station, StationTraffic, Trip};

/// Trip counts keyed by station id.
pub type StationCounts<'a> = HashMap<&'a str, u32>;

/// Counts trips per station, using `key` to pick the station id.
pub fn count_by<'a, I, F>(trips: I, key: F) -> StationCounts<'a>
where
    I: IntoIterator<Item = &'a Trip>,
    F: Fn(&'a Trip) -> &'a str,
{
    let mut counts: StationCounts<'a> = HashMap::new();
    for trip in trips {
        *counts.entry(key(trip)).or_insert(0) += 1;
    }
    counts
}

/// Count for `station_id`; a station with no trips in the selection has
/// a count of zero rather than no entry.
pub fn count_or_zero(counts: &StationCounts<'_>, station_id: &str) -> u32 {
    counts.get(station_id).copied().unwrap_or(0)
}

/// Builds one [`StationTraffic`] per catalog station, in catalog order.
///
/// Departures are grouped by `start_station_id` and arrivals by
/// `end_station_id`. Trips naming a station missing from the catalog are
/// never looked up and so drop out of every total.
pub fn aggregate<'a, D, A>(stations: &[Station], departures: D, arrivals: A) -> Vec<StationTraffic>
where
    D: IntoIterator<Item = &'a Trip>,
    A: IntoIterator<Item = &'a Trip>,
{
    let departure_counts = count_by(departures, |t| t.start_station_id.as_str());
    let arrival_counts = count_by(arrivals, |t| t.end_station_id.as_str());

    stations
        .iter()
        .map(|station| {
            StationTraffic::new(
                station,
                count_or_zero(&departure_counts, &station.short_name),
                count_or_zero(&arrival_counts, &station.short_name),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn trip(start: &str, end: &str) -> Trip {
        Trip {
            start_station_id: start.to_string(),
            end_station_id: end.to_string(),
            started_at: noon(),
            ended_at: noon(),
        }
    }

    fn station(short_name: &str) -> Station {
        Station {
            short_name: short_name.to_string(),
            name: None,
            lat: 42.36,
            lon: -71.09,
        }
    }

    #[test]
    fn test_counts_per_station() {
        let stations = vec![station("A"), station("B"), station("C")];
        let trips = vec![trip("A", "B"), trip("A", "C"), trip("B", "A")];

        let traffic = aggregate(&stations, &trips, &trips);

        assert_eq!(traffic.len(), 3);
        assert_eq!((traffic[0].departures, traffic[0].arrivals), (2, 1));
        assert_eq!((traffic[1].departures, traffic[1].arrivals), (1, 1));
        assert_eq!((traffic[2].departures, traffic[2].arrivals), (0, 1));
        for t in &traffic {
            assert_eq!(t.total_traffic, t.departures + t.arrivals);
        }
    }

    #[test]
    fn test_preserves_catalog_order_and_idle_stations() {
        let stations = vec![station("Z"), station("idle"), station("A")];
        let trips = vec![trip("A", "Z")];

        let traffic = aggregate(&stations, &trips, &trips);
        let names: Vec<_> = traffic.iter().map(|t| t.short_name.as_str()).collect();

        assert_eq!(names, vec!["Z", "idle", "A"]);
        assert_eq!(traffic[1].total_traffic, 0);
    }

    #[test]
    fn test_unknown_station_ids_are_dropped() {
        let stations = vec![station("A"), station("B")];
        let trips = vec![trip("A", "ghost"), trip("ghost", "B")];

        let traffic = aggregate(&stations, &trips, &trips);

        let departures: u32 = traffic.iter().map(|t| t.departures).sum();
        let arrivals: u32 = traffic.iter().map(|t| t.arrivals).sum();
        assert_eq!(departures, 1);
        assert_eq!(arrivals, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let trips: Vec<Trip> = Vec::new();
        assert!(aggregate(&[], &trips, &trips).is_empty());

        let stations = vec![station("A")];
        let traffic = aggregate(&stations, &trips, &trips);
        assert_eq!(traffic[0].total_traffic, 0);
    }

    #[test]
    fn test_count_or_zero() {
        let trips = vec![trip("A", "B")];
        let counts = count_by(&trips, |t| t.start_station_id.as_str());
        assert_eq!(count_or_zero(&counts, "A"), 1);
        assert_eq!(count_or_zero(&counts, "B"), 0);
    }
}
