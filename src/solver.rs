//! Multi-loop partitioner.
//!
//! Splits a set of points into closed walking loops. Each round anchors on
//! the centroid of the points still unassigned, builds one loop over the
//! nearest few of them and removes the loop's stops from the pool.

use std::collections::HashSet;

use serde::Serialize;

use crate::cache::RouteLookup;
use crate::haversine::haversine_km;
use crate::loop_builder::{DEFAULT_CANDIDATE_WIDTH, LoopBudget, build_loop};
use crate::polyline::Polyline;
use crate::traits::{Located, WalkingRouteProvider};

/// Default per-loop budget, roughly three miles.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 4.8;

/// Points considered per loop.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Walking budget per loop in kilometers. The closing leg may exceed it.
    pub max_distance_km: f64,
    /// How many centroid-nearest points each loop may draw from.
    pub window_size: usize,
    /// How many straight-line nearest candidates are resolved per step.
    pub candidate_width: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            window_size: DEFAULT_WINDOW_SIZE,
            candidate_width: DEFAULT_CANDIDATE_WIDTH,
        }
    }
}

impl SolveOptions {
    pub fn with_max_distance(max_distance_km: f64) -> Self {
        Self {
            max_distance_km,
            ..Self::default()
        }
    }
}

/// One loop of the result, without its legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult<P> {
    pub locations: Vec<P>,
    pub distance: f64,
}

/// A walked leg, tagged with the loop it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment<P> {
    pub start: P,
    pub end: P,
    /// Kilometers.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    /// Encoded path geometry, absent for straight-line estimates.
    pub polyline: Option<String>,
    pub estimated: bool,
    pub route_index: usize,
}

impl<P: Located> Segment<P> {
    /// Decoded path of the leg, or the straight line between its ends.
    pub fn path(&self) -> Polyline {
        self.polyline
            .as_deref()
            .and_then(|encoded| Polyline::decode(encoded).ok())
            .filter(|polyline| !polyline.points().is_empty())
            .unwrap_or_else(|| Polyline::straight(self.start.location(), self.end.location()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult<P> {
    pub routes: Vec<RouteResult<P>>,
    /// All legs of all loops in order, grouped by `route_index`.
    pub route_segments: Vec<Segment<P>>,
    pub total_distance: f64,
    /// Points no loop could take before partitioning stopped.
    pub unassigned: Vec<P>,
}

impl<P> Default for OptimizationResult<P> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            route_segments: Vec::new(),
            total_distance: 0.0,
            unassigned: Vec::new(),
        }
    }
}

impl<P> OptimizationResult<P> {
    /// Legs of the loop at `route_index`.
    pub fn segments_for(&self, route_index: usize) -> impl Iterator<Item = &Segment<P>> {
        self.route_segments
            .iter()
            .filter(move |segment| segment.route_index == route_index)
    }
}

/// Partition `points` into walking loops.
///
/// Points are identified by their position in `points`; duplicates are
/// distinct. Partitioning stops when every point is placed, or when a loop
/// cannot get past its seed although its window held other points; in that
/// case the seed loop is kept and the rest is reported as `unassigned`.
pub fn optimize<T, P>(points: &[T], lookup: &RouteLookup<P>, options: &SolveOptions) -> OptimizationResult<T>
where
    T: Located + Clone + Sync,
    P: WalkingRouteProvider + Sync,
{
    let budget = LoopBudget {
        max_distance_km: options.max_distance_km,
        candidate_width: options.candidate_width,
    };
    let window_size = options.window_size.max(1);

    let mut result = OptimizationResult::default();
    let mut remaining: Vec<usize> = (0..points.len()).collect();

    while !remaining.is_empty() {
        let center = centroid(points, &remaining);
        remaining.sort_by(|&a, &b| {
            haversine_km(points[a].location(), center).total_cmp(&haversine_km(points[b].location(), center))
        });

        let window = &remaining[..remaining.len().min(window_size)];
        let Some(walk) = build_loop(points, window, &budget, lookup) else {
            break;
        };
        let stalled = walk.is_single_stop() && window.len() > 1;

        let route_index = result.routes.len();
        tracing::info!(
            route = route_index + 1,
            stops = walk.stops.len(),
            km = %format!("{:.2}", walk.distance_km),
            "built walking loop"
        );

        result.route_segments.extend(walk.legs.iter().map(|leg| Segment {
            start: points[leg.from].clone(),
            end: points[leg.to].clone(),
            distance: leg.route.distance_km(),
            duration: leg.route.duration_secs(),
            polyline: leg.route.geometry().map(str::to_string),
            estimated: leg.route.is_estimated(),
            route_index,
        }));
        result.routes.push(RouteResult {
            locations: walk.stops.iter().map(|&index| points[index].clone()).collect(),
            distance: walk.distance_km,
        });
        result.total_distance += walk.distance_km;

        let placed: HashSet<usize> = walk.stops.iter().copied().collect();
        remaining.retain(|index| !placed.contains(index));

        if stalled {
            tracing::debug!(seed = walk.seed(), "no point fits the budget from this seed, stopping");
            break;
        }
    }

    if !remaining.is_empty() {
        tracing::warn!(
            unassigned = remaining.len(),
            max_distance_km = options.max_distance_km,
            "some points could not be placed in any loop"
        );
        remaining.sort_unstable();
        result.unassigned = remaining.iter().map(|&index| points[index].clone()).collect();
    }

    tracing::info!(
        routes = result.routes.len(),
        total_km = %format!("{:.2}", result.total_distance),
        "partitioning finished"
    );
    result
}

/// Mean latitude and mean longitude of the given points.
fn centroid<T: Located>(points: &[T], indices: &[usize]) -> (f64, f64) {
    let (lat_sum, lng_sum) = indices.iter().fold((0.0, 0.0), |(lat, lng), &index| {
        let (p_lat, p_lng) = points[index].location();
        (lat + p_lat, lng + p_lng)
    });
    let n = indices.len() as f64;
    (lat_sum / n, lng_sum / n)
}
