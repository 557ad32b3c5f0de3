//! TomTom Orbis routing client.

use crate::error::PlanError;
use crate::provider::{RouteProvider, RouteRequest};
use detour_core::{LatLon, PathGeometry, Point, Rectangle, Route, RouteSummary};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_VERSION: &str = "2";

/// HTTP client for the `calculateRoute` endpoint.
#[derive(Debug, Clone)]
pub struct TomTomClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvoidAreasBody {
    avoid_areas: AvoidAreas,
}

#[derive(Debug, Serialize, PartialEq)]
struct AvoidAreas {
    rectangles: Vec<AvoidRectangle>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AvoidRectangle {
    south_west_corner: WirePoint,
    north_east_corner: WirePoint,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
struct WirePoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct CalculateRouteResponse {
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    summary: WireSummary,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSummary {
    length_in_meters: f64,
    travel_time_in_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    points: Vec<WirePoint>,
}

impl From<Point> for WirePoint {
    fn from(point: Point) -> Self {
        Self {
            latitude: point.lat(),
            longitude: point.lon(),
        }
    }
}

impl AvoidAreasBody {
    pub(crate) fn from_rectangles(rects: &[Rectangle]) -> Self {
        let rectangles = rects
            .iter()
            .map(|rect| AvoidRectangle {
                south_west_corner: rect.south_west().into(),
                north_east_corner: rect.north_east().into(),
            })
            .collect();
        Self {
            avoid_areas: AvoidAreas { rectangles },
        }
    }
}

impl TomTomClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn from_config(config: &crate::config::Config) -> reqwest::Result<Self> {
        Self::new(
            config.provider_url.clone(),
            config.provider_api_key.clone(),
            config.provider_timeout(),
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn route_url(&self, origin: LatLon, destination: LatLon) -> String {
        format!(
            "{}/{},{}:{},{}/json",
            self.base_url, origin.lat, origin.lon, destination.lat, destination.lon
        )
    }

    fn query_params(&self, api_key: &str, request: &RouteRequest) -> Vec<(&'static str, String)> {
        vec![
            ("key", api_key.to_string()),
            ("apiVersion", API_VERSION.to_string()),
            ("routeType", request.route_type.provider_value().to_string()),
            ("traffic", request.traffic_value().to_string()),
            ("departAt", request.depart_at.to_string()),
        ]
    }
}

impl RouteProvider for TomTomClient {
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Route, PlanError> {
        let api_key = self.api_key.as_deref().ok_or(PlanError::MissingApiKey)?;
        let url = self.route_url(request.origin, request.destination);
        let params = self.query_params(api_key, request);

        let builder = if request.avoid.is_empty() {
            self.client.get(&url).query(&params)
        } else {
            self.client
                .post(&url)
                .query(&params)
                .json(&AvoidAreasBody::from_rectangles(&request.avoid))
        };

        tracing::debug!(
            "Requesting route {:?} -> {:?} with {} avoid areas",
            request.origin,
            request.destination,
            request.avoid.len()
        );

        let response = builder.send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| PlanError::ProviderUnavailable(err.to_string()))?;

        if !status.is_success() {
            return Err(PlanError::ProviderStatus {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_route_response(&body)
    }
}

/// The provider's JSON error document when there is one, else the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

pub(crate) fn parse_route_response(body: &str) -> Result<Route, PlanError> {
    let response: CalculateRouteResponse = serde_json::from_str(body)
        .map_err(|err| PlanError::ProviderPayload(format!("invalid route response: {err}")))?;

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| PlanError::ProviderPayload("response contains no routes".to_string()))?;

    let mut parts = Vec::with_capacity(route.legs.len());
    for (leg_index, leg) in route.legs.into_iter().enumerate() {
        if leg.points.len() < 2 {
            return Err(PlanError::ProviderPayload(format!(
                "leg {leg_index} has {} points, need at least 2",
                leg.points.len()
            )));
        }
        let mut part = Vec::with_capacity(leg.points.len());
        for point in leg.points {
            let point = Point::new(point.longitude, point.latitude);
            if !point.is_finite() {
                return Err(PlanError::ProviderPayload(format!(
                    "leg {leg_index} contains a non-finite point"
                )));
            }
            part.push(point);
        }
        parts.push(part);
    }

    let geometry = match parts.len() {
        0 => {
            return Err(PlanError::ProviderPayload(
                "route contains no legs".to_string(),
            ))
        }
        1 => PathGeometry::LineString(parts.remove(0)),
        _ => PathGeometry::MultiLineString(parts),
    };

    Ok(Route {
        summary: RouteSummary {
            length_m: route.summary.length_in_meters,
            travel_time_s: route.summary.travel_time_in_seconds,
        },
        geometry,
    })
}
