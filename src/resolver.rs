//! Walking-route resolution with a straight-line fallback.
//!
//! The resolver never fails: very short hops and every provider failure are
//! answered with a haversine estimate, tagged as such so callers can tell a
//! real route from a guess.

use serde::Serialize;

use crate::haversine::{DEFAULT_WALKING_SPEED_KMH, HaversineEstimator};
use crate::traits::WalkingRouteProvider;

/// Hops shorter than this are never sent to the provider.
pub const DEFAULT_SHORT_HOP_KM: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    pub short_hop_km: f64,
    pub walking_speed_kmh: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            short_hop_km: DEFAULT_SHORT_HOP_KM,
            walking_speed_kmh: DEFAULT_WALKING_SPEED_KMH,
        }
    }
}

/// Outcome of resolving a leg between two coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteEstimate {
    /// Reported by the directions provider.
    Resolved {
        distance_km: f64,
        duration_secs: f64,
        geometry: String,
    },
    /// Straight-line estimate.
    Estimated { distance_km: f64, duration_secs: f64 },
}

impl RouteEstimate {
    pub fn distance_km(&self) -> f64 {
        match self {
            Self::Resolved { distance_km, .. } | Self::Estimated { distance_km, .. } => *distance_km,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Resolved { duration_secs, .. } | Self::Estimated { duration_secs, .. } => {
                *duration_secs
            }
        }
    }

    pub fn geometry(&self) -> Option<&str> {
        match self {
            Self::Resolved { geometry, .. } => Some(geometry),
            Self::Estimated { .. } => None,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, Self::Estimated { .. })
    }
}

/// Resolves walking legs through a provider.
#[derive(Debug, Clone)]
pub struct WalkingRouteResolver<P> {
    provider: P,
    estimator: HaversineEstimator,
    short_hop_km: f64,
}

impl<P: WalkingRouteProvider> WalkingRouteResolver<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    pub fn with_config(provider: P, config: ResolverConfig) -> Self {
        Self {
            provider,
            estimator: HaversineEstimator::new(config.walking_speed_kmh),
            short_hop_km: config.short_hop_km,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn resolve(&self, from: (f64, f64), to: (f64, f64)) -> RouteEstimate {
        let direct_km = self.estimator.distance_km(from, to);
        if direct_km < self.short_hop_km {
            return self.estimate(direct_km);
        }

        match self.provider.walking_route(from, to) {
            Ok(leg) => RouteEstimate::Resolved {
                distance_km: leg.distance_km,
                duration_secs: leg.duration_secs,
                geometry: leg.geometry,
            },
            Err(err) => {
                tracing::warn!(?from, ?to, error = %err, "walking route unavailable, using straight-line estimate");
                self.estimate(direct_km)
            }
        }
    }

    fn estimate(&self, distance_km: f64) -> RouteEstimate {
        RouteEstimate::Estimated {
            distance_km,
            duration_secs: self.estimator.km_to_seconds(distance_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ProviderError;
    use crate::haversine::haversine_km;
    use crate::traits::{OfflineProvider, RouteLeg};

    struct FixedProvider {
        calls: AtomicUsize,
    }

    impl WalkingRouteProvider for FixedProvider {
        fn walking_route(&self, _from: (f64, f64), _to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouteLeg {
                distance_km: 2.5,
                duration_secs: 1800.0,
                geometry: "_p~iF~ps|U".to_string(),
            })
        }
    }

    const A: (f64, f64) = (33.8303, -116.5453);
    const B: (f64, f64) = (33.8306, -116.5459);
    const C: (f64, f64) = (33.8450, -116.5700);

    #[test]
    fn test_short_hop_skips_provider() {
        let resolver = WalkingRouteResolver::new(FixedProvider { calls: AtomicUsize::new(0) });
        let estimate = resolver.resolve(A, B);

        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);
        let expected = haversine_km(A, B);
        assert!(expected < DEFAULT_SHORT_HOP_KM);
        assert_eq!(
            estimate,
            RouteEstimate::Estimated {
                distance_km: expected,
                duration_secs: expected * 720.0,
            }
        );
    }

    #[test]
    fn test_provider_result_is_used() {
        let resolver = WalkingRouteResolver::new(FixedProvider { calls: AtomicUsize::new(0) });
        let estimate = resolver.resolve(A, C);

        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 1);
        assert!(!estimate.is_estimated());
        assert_eq!(estimate.distance_km(), 2.5);
        assert_eq!(estimate.duration_secs(), 1800.0);
        assert_eq!(estimate.geometry(), Some("_p~iF~ps|U"));
    }

    #[test]
    fn test_failure_falls_back_to_estimate() {
        let resolver = WalkingRouteResolver::new(OfflineProvider);
        let estimate = resolver.resolve(A, C);

        let expected = haversine_km(A, C);
        assert!(estimate.is_estimated());
        assert_eq!(estimate.distance_km(), expected);
        assert!((estimate.duration_secs() - expected * 720.0).abs() < 1e-9);
        assert_eq!(estimate.geometry(), None);
    }

    #[test]
    fn test_config_overrides_hop_and_pace() {
        let config = ResolverConfig {
            short_hop_km: 10.0,
            walking_speed_kmh: 4.0,
        };
        let resolver = WalkingRouteResolver::with_config(FixedProvider { calls: AtomicUsize::new(0) }, config);
        let estimate = resolver.resolve(A, C);

        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);
        assert!((estimate.duration_secs() - haversine_km(A, C) * 900.0).abs() < 1e-9);
    }
}
