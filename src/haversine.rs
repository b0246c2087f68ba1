//! Haversine distance estimates (fallback when the directions provider is
//! unavailable or the hop is too short to bother asking).
//!
//! Great-circle distance ignores the street network, so it underestimates
//! real walking distance, but it is always available.

/// Average walking speed assumption for time estimation.
pub const DEFAULT_WALKING_SPEED_KMH: f64 = 5.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Straight-line walking estimator.
///
/// Estimates walking time from great-circle distance and an assumed speed.
#[derive(Debug, Clone, Copy)]
pub struct HaversineEstimator {
    /// Assumed average walking speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_WALKING_SPEED_KMH,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    pub fn distance_km(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        haversine_km(from, to)
    }

    /// Convert distance in km to walking time in seconds.
    ///
    /// At the default 5 km/h this is 720 seconds per kilometer.
    pub fn km_to_seconds(&self, km: f64) -> f64 {
        km * (3600.0 / self.speed_kmh)
    }
}
