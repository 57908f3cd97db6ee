//! Time-windowed station traffic aggregation.
//!
//! Trips are bucketed once by minute of day ([`index`]), a circular window
//! around the selected minute picks the visible buckets ([`window`]), trips
//! are counted per station ([`aggregate`]) and each station gets a
//! departure-share level ([`flow`]). [`view`] ties these together into one
//! record set per query.

pub mod aggregate;
pub mod flow;
pub mod index;
pub mod minute;
pub mod types;
pub mod view;
pub mod window;

pub use index::TimeBucketIndex;
pub use minute::{MinuteOfDay, format_time, minute_of_day};
pub use types::{
    FlowLevel, RadiusRange, Station, StationFlowRecord, StationTraffic, TrafficView, Trip,
};
pub use view::TrafficViewModel;
pub use window::{DEFAULT_HALF_WIDTH, Query};
