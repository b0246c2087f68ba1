//! Nearest-neighbor loop construction.
//!
//! A loop grows from its seed by repeatedly walking to the closest reachable
//! point that still fits the distance budget, then returns to the seed.
//! Points are addressed by their index in the caller's slice.

use rayon::prelude::*;

use crate::cache::RouteLookup;
use crate::haversine::haversine_km;
use crate::resolver::RouteEstimate;
use crate::traits::{Located, WalkingRouteProvider};

/// Candidates kept after straight-line pruning at each step.
pub const DEFAULT_CANDIDATE_WIDTH: usize = 5;

/// A walked leg between two points of the input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub from: usize,
    pub to: usize,
    pub route: RouteEstimate,
}

/// A closed loop over points of the input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkLoop {
    /// Visiting order, seed first.
    pub stops: Vec<usize>,
    /// Open path legs followed by the closing leg (if more than one stop).
    pub legs: Vec<Leg>,
    pub distance_km: f64,
}

impl WalkLoop {
    pub fn seed(&self) -> usize {
        self.stops[0]
    }

    pub fn is_single_stop(&self) -> bool {
        self.stops.len() == 1
    }
}

/// Next stop chosen by [`select_next`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Position of the chosen point within the `unvisited` slice.
    pub position: usize,
    pub route: RouteEstimate,
}

/// Budget for growing a single loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopBudget {
    pub max_distance_km: f64,
    pub candidate_width: usize,
}

struct Evaluated {
    position: usize,
    route: RouteEstimate,
    tentative_km: f64,
}

/// Pick the next point to walk to from `current`.
///
/// The `candidate_width` straight-line nearest points of `unvisited` are
/// resolved (in parallel) and the one with the shortest direct walk wins,
/// provided the running total stays within `max_distance_km`. When only one
/// point is left, the walk from it back to `seed` is counted too.
/// Ties keep the earlier candidate in straight-line order.
pub fn select_next<T, P>(
    points: &[T],
    current: usize,
    seed: usize,
    unvisited: &[usize],
    accumulated_km: f64,
    budget: &LoopBudget,
    lookup: &RouteLookup<P>,
) -> Option<Selection>
where
    T: Located + Sync,
    P: WalkingRouteProvider + Sync,
{
    if unvisited.is_empty() {
        return None;
    }

    let here = points[current].location();
    let home = points[seed].location();
    let closing = unvisited.len() == 1;

    let mut ranked: Vec<(usize, f64)> = unvisited
        .iter()
        .enumerate()
        .map(|(position, &index)| (position, haversine_km(here, points[index].location())))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(budget.candidate_width.max(1));

    let evaluated: Vec<Evaluated> = ranked
        .par_iter()
        .map(|&(position, _)| {
            let there = points[unvisited[position]].location();
            let route = lookup.route(here, there);
            let mut tentative_km = accumulated_km + route.distance_km();
            if closing {
                tentative_km += lookup.route(there, home).distance_km();
            }
            Evaluated {
                position,
                route,
                tentative_km,
            }
        })
        .collect();

    let mut best: Option<Evaluated> = None;
    for candidate in evaluated {
        if candidate.tentative_km > budget.max_distance_km {
            continue;
        }
        let better = best
            .as_ref()
            .is_none_or(|b| candidate.route.distance_km() < b.route.distance_km());
        if better {
            best = Some(candidate);
        }
    }

    let best = best?;
    tracing::debug!(
        from = current,
        to = unvisited[best.position],
        km = best.route.distance_km(),
        "selected next stop"
    );
    Some(Selection {
        position: best.position,
        route: best.route,
    })
}

/// Grow one loop from `window[0]` over the points of `window`.
///
/// Stops when no remaining point fits the budget, which may leave points of
/// the window unvisited. The closing leg back to the seed is always added and
/// is not checked against the budget.
pub fn build_loop<T, P>(
    points: &[T],
    window: &[usize],
    budget: &LoopBudget,
    lookup: &RouteLookup<P>,
) -> Option<WalkLoop>
where
    T: Located + Sync,
    P: WalkingRouteProvider + Sync,
{
    let (&seed, rest) = window.split_first()?;

    let mut stops = vec![seed];
    let mut unvisited = rest.to_vec();
    let mut legs = Vec::new();
    let mut distance_km = 0.0;
    let mut current = seed;

    while let Some(selection) = select_next(
        points,
        current,
        seed,
        &unvisited,
        distance_km,
        budget,
        lookup,
    ) {
        let next = unvisited.remove(selection.position);
        distance_km += selection.route.distance_km();
        legs.push(Leg {
            from: current,
            to: next,
            route: selection.route,
        });
        stops.push(next);
        current = next;
    }

    if stops.len() > 1 {
        let route = lookup.route(points[current].location(), points[seed].location());
        distance_km += route.distance_km();
        legs.push(Leg {
            from: current,
            to: seed,
            route,
        });
    }

    Some(WalkLoop {
        stops,
        legs,
        distance_km,
    })
}
