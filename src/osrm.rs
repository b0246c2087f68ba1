//! OSRM HTTP adapter for walking routes.

use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::{RouteLeg, WalkingRouteProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 2,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup("OSRM_BASE_URL").filter(|value| !value.is_empty()) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(profile) = lookup("OSRM_PROFILE").filter(|value| !value.is_empty()) {
            config.profile = profile;
        }
        match lookup("OSRM_TIMEOUT_SECS").map(|value| value.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.timeout_secs = secs,
            Some(_) => tracing::warn!("ignoring invalid OSRM_TIMEOUT_SECS"),
            None => {}
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn route_url(&self, from: (f64, f64), to: (f64, f64)) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.config.base_url, self.config.profile, from.1, from.0, to.1, to.0
        )
    }
}

impl WalkingRouteProvider for OsrmClient {
    fn walking_route(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        let body = self
            .client
            .get(self.route_url(from, to))
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        body.into_leg()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: String,
}

impl OsrmRouteResponse {
    fn into_leg(self) -> Result<RouteLeg, ProviderError> {
        if self.code != "Ok" {
            return Err(ProviderError::Status(self.code));
        }
        let route = self.routes.into_iter().next().ok_or(ProviderError::NoRoute)?;
        Ok(RouteLeg {
            distance_km: route.distance / 1000.0,
            duration_secs: route.duration,
            geometry: route.geometry,
        })
    }
}
