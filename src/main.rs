//! walk-planner CLI
//!
//! Loads a locations file, partitions it into walking loops and prints the
//! result as JSON.
//!
//! Usage:
//!     walk-planner --locations data/locations.json --max-distance 4.8
//!     walk-planner --offline --pretty

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use walk_planner::cache::{DEFAULT_CACHE_CAPACITY, RouteCache, RouteLookup};
use walk_planner::error::Result;
use walk_planner::osrm::{OsrmClient, OsrmConfig};
use walk_planner::resolver::WalkingRouteResolver;
use walk_planner::solver::{DEFAULT_MAX_DISTANCE_KM, OptimizationResult, SolveOptions, optimize};
use walk_planner::store::{Location, LocationStore};
use walk_planner::traits::{OfflineProvider, WalkingRouteProvider};

/// Partition points of interest into walking loops
#[derive(Parser, Debug)]
#[command(name = "walk-planner")]
#[command(version)]
struct Cli {
    /// JSON array of locations with `lat` and `lng`
    #[arg(long, default_value = "data/locations.json")]
    locations: PathBuf,

    /// Walking budget per loop in kilometers
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM, value_parser = parse_budget)]
    max_distance: f64,

    /// Maximum number of cached walking legs
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// Do not contact the directions service; estimate every leg
    #[arg(long)]
    offline: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

/// Budget must be a finite, non-negative number of kilometers.
fn parse_budget(raw: &str) -> std::result::Result<f64, String> {
    let km: f64 = raw.parse().map_err(|err| format!("`{raw}` is not a number: {err}"))?;
    if !km.is_finite() || km < 0.0 {
        return Err(format!("`{raw}` must be a finite distance of zero or more kilometers"));
    }
    Ok(km)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "walk-planner failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let store = LocationStore::from_path(&cli.locations)?;
    let options = SolveOptions::with_max_distance(cli.max_distance);
    let cache = Arc::new(RouteCache::new(cli.cache_capacity));
    tracing::info!(max_distance_km = cli.max_distance, "optimizing routes");

    let result = if cli.offline {
        plan(store.locations(), OfflineProvider, cache, &options)
    } else {
        let client = OsrmClient::new(OsrmConfig::from_env())?;
        plan(store.locations(), client, cache, &options)
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

fn plan<P>(
    locations: &[Location],
    provider: P,
    cache: Arc<RouteCache>,
    options: &SolveOptions,
) -> OptimizationResult<Location>
where
    P: WalkingRouteProvider + Sync,
{
    let lookup = RouteLookup::new(WalkingRouteResolver::new(provider), cache);
    let result = optimize(locations, &lookup, options);
    let stats = lookup.cache().stats();
    tracing::debug!(hits = stats.hits, misses = stats.misses, entries = stats.entries, "route cache");
    result
}
