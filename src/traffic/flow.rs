use crate::traffic::types::{FlowLevel, StationFlowRecord, StationTraffic};

/// Share of a station's traffic that is departures, in `[0, 1]`.
///
/// A station with no traffic has a ratio of 0.
pub fn flow_ratio(departures: u32, total_traffic: u32) -> f64 {
    if total_traffic == 0 {
        0.0
    } else {
        departures as f64 / total_traffic as f64
    }
}

/// Quantizes a ratio into three equal-width levels over `[0, 1]`.
///
/// | Ratio         | Level |
/// |---------------|-------|
/// | < 1/3         | Low   |
/// | 1/3 .. < 2/3  | Mid   |
/// | >= 2/3        | High  |
pub fn quantize(ratio: f64) -> FlowLevel {
    let ratio = ratio.clamp(0.0, 1.0);
    match (ratio * 3.0).floor() as u8 {
        0 => FlowLevel::Low,
        1 => FlowLevel::Mid,
        _ => FlowLevel::High,
    }
}

pub fn classify(traffic: &StationTraffic) -> FlowLevel {
    quantize(flow_ratio(traffic.departures, traffic.total_traffic))
}

/// Attaches the flow ratio and level to a station's counts.
pub fn classify_record(traffic: StationTraffic) -> StationFlowRecord {
    let flow_level = classify(&traffic);
    StationFlowRecord {
        flow_ratio: flow_ratio(traffic.departures, traffic.total_traffic),
        flow_level,
        short_name: traffic.short_name,
        name: traffic.name,
        lat: traffic.lat,
        lon: traffic.lon,
        departures: traffic.departures,
        arrivals: traffic.arrivals,
        total_traffic: traffic.total_traffic,
    }
}
