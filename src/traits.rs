//! Core seams of the loop planner.
//!
//! The planner only needs coordinates from a point and a way to ask for a
//! walking route between two coordinates. Concrete apps implement these for
//! their own data models and routing backends.

use crate::error::ProviderError;

/// Anything with a (lat, lng) position in degrees.
pub trait Located {
    fn location(&self) -> (f64, f64);
}

impl Located for (f64, f64) {
    fn location(&self) -> (f64, f64) {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> (f64, f64) {
        (**self).location()
    }
}

/// A walked leg as reported by a directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_secs: f64,
    /// Encoded polyline of the walked path.
    pub geometry: String,
}

/// External walking-directions provider.
///
/// Implementations make a single attempt and report any failure as an error;
/// falling back to an estimate is the resolver's job.
pub trait WalkingRouteProvider {
    fn walking_route(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError>;
}

/// Provider that is never reachable. Every non-trivial leg falls back to the
/// straight-line estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl WalkingRouteProvider for OfflineProvider {
    fn walking_route(&self, _from: (f64, f64), _to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}
