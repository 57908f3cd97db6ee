//! CLI entry point for the bikeshare traffic tool.
//!
//! Loads a station catalog and a trip log once, then evaluates traffic for
//! one time-of-day query, a sweep over the whole day, or a busiest-station
//! ranking. `stations` lists the parsed catalog without loading trips.

use anyhow::{Context, Result, anyhow};
use bikeshare_traffic::{
    config::{Settings, parse_half_width},
    fetch::{BasicClient, load_source},
    output::{append_view, print_json, print_pretty, write_json},
    parser::{parse_stations, parse_trips},
    traffic::{MinuteOfDay, Query, Station, TrafficViewModel, minute::MINUTES_PER_DAY},
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_traffic")]
#[command(about = "Aggregate bikeshare trips into per-station traffic by time of day", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Station catalog JSON, file path or URL (overrides BIKESHARE_STATIONS_SOURCE)
    #[arg(long)]
    stations: Option<String>,

    /// Trip CSV, optionally gzipped, file path or URL (overrides BIKESHARE_TRIPS_SOURCE)
    #[arg(long)]
    trips: Option<String>,

    /// Minutes on either side of the selected time (overrides BIKESHARE_HALF_WIDTH)
    #[arg(long, value_parser = parse_half_width)]
    half_width: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute station traffic for one time of day
    Query {
        /// `all`, a slider value -1..=1439, or HH:MM
        #[arg(short, long, default_value = "all", allow_hyphen_values = true)]
        at: Query,

        /// CSV file to append records to
        #[arg(short, long)]
        output: Option<String>,

        /// JSON file to write the full view to
        #[arg(long)]
        json: Option<String>,

        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Evaluate every slider position at a fixed step and write all records
    Sweep {
        /// Minutes between slider positions
        #[arg(short, long, default_value_t = 15)]
        step: u16,

        /// CSV file to write
        #[arg(short, long, default_value = "sweep.csv")]
        output: String,

        /// Also include the unfiltered view (minute -1)
        #[arg(long, default_value_t = false)]
        include_all: bool,

        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Log the busiest stations for a time of day
    Top {
        /// `all`, a slider value -1..=1439, or HH:MM
        #[arg(short, long, default_value = "all", allow_hyphen_values = true)]
        at: Query,

        /// Number of stations to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Log every station in the parsed catalog
    Stations {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            at,
            output,
            json,
            sources,
        } => {
            let model = load_model(&settings, &sources).await?;
            let view = model.query(at);

            info!(
                query = %at.label(),
                stations = view.records.len(),
                radius_domain_max = view.radius_domain_max,
                "Query evaluated"
            );
            print_pretty(&view);

            if let Some(path) = output {
                append_view(&path, &view)?;
                info!(path = %path, "CSV records appended");
            }
            match json {
                Some(path) => write_json(&path, &view)?,
                None => print_json(&view)?,
            }
        }
        Commands::Sweep {
            step,
            output,
            include_all,
            sources,
        } => {
            if step == 0 {
                return Err(anyhow!("--step must be at least 1 minute"));
            }
            let model = load_model(&settings, &sources).await?;
            sweep(&model, step, &output, include_all)?;
        }
        Commands::Top { at, limit, sources } => {
            let model = load_model(&settings, &sources).await?;
            let view = model.query(at);

            let mut ranked: Vec<_> = view.records.iter().collect();
            ranked.sort_by(|a, b| b.total_traffic.cmp(&a.total_traffic));

            for (rank, record) in ranked.into_iter().take(limit).enumerate() {
                info!(
                    rank = rank + 1,
                    short_name = %record.short_name,
                    name = record.name.as_deref().unwrap_or(""),
                    total = record.total_traffic,
                    departures = record.departures,
                    arrivals = record.arrivals,
                    flow = ?record.flow_level,
                    "Station"
                );
            }
        }
        Commands::Stations { sources } => {
            let stations = load_stations(&settings, &sources).await?;
            for station in &stations {
                info!(
                    short_name = %station.short_name,
                    name = station.name.as_deref().unwrap_or(""),
                    lat = station.lat,
                    lon = station.lon,
                    "Station"
                );
            }
            info!(count = stations.len(), "Station catalog loaded");
        }
    }

    Ok(())
}

/// Loads both sources and buckets the trips.
#[tracing::instrument(skip_all)]
async fn load_model(settings: &Settings, sources: &SourceArgs) -> Result<TrafficViewModel> {
    let stations_source = sources
        .stations
        .as_deref()
        .unwrap_or(&settings.stations_source);
    let trips_source = sources.trips.as_deref().unwrap_or(&settings.trips_source);
    let half_width = sources.half_width.unwrap_or(settings.half_width);

    let client = BasicClient::with_timeout(Duration::from_secs(120))?;
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(&client, stations_source),
        load_source(&client, trips_source),
    )?;

    let stations = parse_stations(&station_bytes)
        .with_context(|| format!("Failed to parse stations from {stations_source}"))?;
    let trips = parse_trips(&trip_bytes)
        .with_context(|| format!("Failed to parse trips from {trips_source}"))?;

    if stations.is_empty() {
        warn!("Station catalog is empty; every view will be empty");
    }

    let start = Instant::now();
    let trip_count = trips.len();
    let model = TrafficViewModel::from_trips(stations, trips).with_half_width(half_width);
    info!(
        stations = model.stations().len(),
        trips = trip_count,
        half_width,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Trip index ready"
    );

    Ok(model)
}

/// Loads and parses the station catalog only.
#[tracing::instrument(skip_all)]
async fn load_stations(settings: &Settings, sources: &SourceArgs) -> Result<Vec<Station>> {
    let source = sources
        .stations
        .as_deref()
        .unwrap_or(&settings.stations_source);
    let client = BasicClient::with_timeout(Duration::from_secs(120))?;
    let bytes = load_source(&client, source).await?;
    parse_stations(&bytes).with_context(|| format!("Failed to parse stations from {source}"))
}

/// Writes one view per slider position, `step` minutes apart, to `output`.
#[tracing::instrument(skip(model))]
fn sweep(model: &TrafficViewModel, step: u16, output: &str, include_all: bool) -> Result<()> {
    if Path::new(output).exists() {
        std::fs::remove_file(output).with_context(|| format!("Failed to replace {output}"))?;
    }

    let minutes = (0..MINUTES_PER_DAY as u16)
        .step_by(step as usize)
        .filter_map(MinuteOfDay::new)
        .map(Query::Minute);
    let queries: Vec<Query> = include_all
        .then_some(Query::All)
        .into_iter()
        .chain(minutes)
        .collect();

    let start = Instant::now();
    for query in &queries {
        append_view(output, &model.query(*query))?;
    }

    info!(
        views = queries.len(),
        output = %output,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Sweep complete"
    );
    Ok(())
}
