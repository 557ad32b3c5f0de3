//! Server configuration from environment.

use crate::provider::RouteType;
use detour_core::RectScaling;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.tomtom.com/maps/orbis/routing/calculateRoute";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub provider_url: String,
    pub provider_api_key: Option<String>,
    /// Bound on every single provider call.
    pub provider_timeout_s: u64,
    /// Planning aborts once more distinct obstacles than this are avoided.
    pub max_avoid_areas: usize,
    pub obstacle_scaling: RectScaling,
    pub default_route_type: RouteType,
    pub default_live_traffic: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            provider_api_key: None,
            provider_timeout_s: 30,
            max_avoid_areas: 10,
            obstacle_scaling: RectScaling::default(),
            default_route_type: RouteType::Fastest,
            default_live_traffic: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let scaling = defaults.obstacle_scaling;
        Self {
            server_port: parse_env("DETOUR_PORT", defaults.server_port),
            provider_url: env::var("DETOUR_PROVIDER_URL")
                .ok()
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.provider_url),
            provider_api_key: env::var("DETOUR_PROVIDER_API_KEY")
                .or_else(|_| env::var("TOMTOM_API_KEY"))
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            provider_timeout_s: parse_env("DETOUR_PROVIDER_TIMEOUT_S", defaults.provider_timeout_s)
                .max(1),
            max_avoid_areas: parse_env("DETOUR_MAX_AVOID_AREAS", defaults.max_avoid_areas),
            obstacle_scaling: RectScaling {
                min_width_m: parse_env("DETOUR_MIN_OBSTACLE_WIDTH_M", scaling.min_width_m).max(0.0),
                min_height_m: parse_env("DETOUR_MIN_OBSTACLE_HEIGHT_M", scaling.min_height_m)
                    .max(0.0),
                safety_pad_m: parse_env("DETOUR_SAFETY_PAD_M", scaling.safety_pad_m).max(0.0),
                lat_limit_deg: parse_env("DETOUR_LAT_LIMIT_DEG", scaling.lat_limit_deg)
                    .clamp(0.0, 90.0),
            },
            default_route_type: env::var("DETOUR_ROUTE_TYPE")
                .ok()
                .map(|value| RouteType::from_name(&value))
                .unwrap_or(defaults.default_route_type),
            default_live_traffic: parse_env("DETOUR_TRAFFIC", defaults.default_live_traffic),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_s)
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_planner_constants() {
        let config = Config::default();
        assert_eq!(config.max_avoid_areas, 10);
        assert_eq!(config.provider_timeout(), Duration::from_secs(30));
        assert_eq!(config.obstacle_scaling.min_width_m, 120.0);
        assert_eq!(config.obstacle_scaling.min_height_m, 120.0);
        assert_eq!(config.obstacle_scaling.safety_pad_m, 60.0);
        assert_eq!(config.obstacle_scaling.lat_limit_deg, 80.0);
        assert!(config.default_live_traffic);
    }

    #[test]
    fn unparsable_values_fall_back_to_default() {
        assert_eq!(parse_env("DETOUR_TEST_UNSET_VARIABLE", 7usize), 7);
    }
}
