//! Directions providers for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use walk_planner::error::ProviderError;
use walk_planner::haversine::haversine_km;
use walk_planner::polyline::Polyline;
use walk_planner::traits::{RouteLeg, WalkingRouteProvider};

/// Answers with a street detour factor over the straight line and records
/// every request.
pub struct DetourProvider {
    pub factor: f64,
    pub calls: AtomicUsize,
    pub requests: Mutex<HashMap<[u64; 4], usize>>,
}

impl DetourProvider {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of times any single leg was requested.
    pub fn max_requests_per_leg(&self) -> usize {
        self.requests.lock().unwrap().values().copied().max().unwrap_or(0)
    }
}

impl WalkingRouteProvider for DetourProvider {
    fn walking_route(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = [from.0.to_bits(), from.1.to_bits(), to.0.to_bits(), to.1.to_bits()];
        *self.requests.lock().unwrap().entry(key).or_default() += 1;

        let distance_km = haversine_km(from, to) * self.factor;
        Ok(RouteLeg {
            distance_km,
            duration_secs: distance_km * 720.0,
            geometry: Polyline::straight(from, to).encode(),
        })
    }
}

/// Always fails, like an unreachable server, and counts attempts.
#[derive(Default)]
pub struct FailingProvider {
    pub calls: AtomicUsize,
}

impl WalkingRouteProvider for FailingProvider {
    fn walking_route(&self, _from: (f64, f64), _to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Status("NoRoute".to_string()))
    }
}
