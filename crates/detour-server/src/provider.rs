//! Route provider abstraction and the request preferences it understands.

use crate::error::PlanError;
use chrono::{DateTime, Utc};
use detour_core::{LatLon, Rectangle, Route};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Caller-facing route optimisation preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteType {
    #[default]
    Fastest,
    Shortest,
    Eco,
    Efficient,
    Thrilling,
}

impl RouteType {
    /// Case-insensitive lookup; unknown names fall back to `Fastest`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "shortest" | "short" => RouteType::Shortest,
            "eco" => RouteType::Eco,
            "efficient" => RouteType::Efficient,
            "thrilling" => RouteType::Thrilling,
            _ => RouteType::Fastest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Fastest => "fastest",
            RouteType::Shortest => "shortest",
            RouteType::Eco => "eco",
            RouteType::Efficient => "efficient",
            RouteType::Thrilling => "thrilling",
        }
    }

    /// Value of the provider's `routeType` parameter.
    pub fn provider_value(&self) -> &'static str {
        match self {
            RouteType::Fastest => "fast",
            RouteType::Shortest => "short",
            RouteType::Eco | RouteType::Efficient => "efficient",
            RouteType::Thrilling => "thrilling",
        }
    }
}

impl From<String> for RouteType {
    fn from(value: String) -> Self {
        RouteType::from_name(&value)
    }
}

impl From<RouteType> for String {
    fn from(value: RouteType) -> Self {
        value.as_str().to_string()
    }
}

/// Departure time sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DepartAt {
    #[default]
    Now,
    At(DateTime<Utc>),
}

impl std::str::FromStr for DepartAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("now") {
            return Ok(DepartAt::Now);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|at| DepartAt::At(at.with_timezone(&Utc)))
            .map_err(|err| format!("departAt must be 'now' or RFC 3339: {err}"))
    }
}

impl TryFrom<String> for DepartAt {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DepartAt> for String {
    fn from(value: DepartAt) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DepartAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartAt::Now => f.write_str("now"),
            DepartAt::At(at) => f.write_str(&at.to_rfc3339()),
        }
    }
}

/// Everything the provider needs for one route calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: LatLon,
    pub destination: LatLon,
    /// Exclusion zones; empty means unconstrained.
    pub avoid: Vec<Rectangle>,
    pub route_type: RouteType,
    pub live_traffic: bool,
    pub depart_at: DepartAt,
}

impl RouteRequest {
    pub fn traffic_value(&self) -> &'static str {
        if self.live_traffic {
            "live"
        } else {
            "historical"
        }
    }
}

/// An external routing service.
///
/// Implementations return the first route alternative as a [`Route`] whose
/// geometry is in `(lon, lat)` order.
pub trait RouteProvider: Send + Sync {
    fn calculate_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<Route, PlanError>> + Send;
}
