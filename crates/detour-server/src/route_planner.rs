//! Obstacle-avoiding route planning on top of an external route provider.
//!
//! Each planning request owns one [`AvoidancePlanner`]. The planner asks the
//! provider for a route, scans it against the scaled obstacles and, while the
//! route still collides, feeds the offending obstacles back as exclusion
//! zones. It stops on a clear route or once the avoidance set grows past the
//! retry cap.

use crate::config::Config;
use crate::error::PlanError;
use crate::provider::{DepartAt, RouteProvider, RouteRequest, RouteType};
use detour_core::{
    scan, CollisionHit, LatLon, Obstacle, ObstacleIndex, ObstacleSet, Rectangle, Route,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct RoutePlanRequest {
    pub origin: LatLon,
    pub destination: LatLon,
    /// `[minLon, minLat, maxLon, maxLat]` with an optional id as fifth value.
    #[serde(default)]
    pub obstacles: Vec<Vec<f64>>,
    pub route_type: Option<RouteType>,
    pub traffic: Option<bool>,
    pub depart_at: Option<DepartAt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// The route crosses no obstacle.
    Clear,
    /// Planning stopped with collisions left unresolved.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// More distinct obstacles were needed than the retry cap allows.
    RetryBudget,
    /// The provider returned a route through obstacles it was already told
    /// to avoid.
    NoProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanResponse {
    pub ok: bool,
    pub status: PlanStatus,
    pub route: Route,
    /// Obstacles sent to the provider as exclusion zones, in the order they
    /// were added.
    pub avoided: Vec<Obstacle>,
    /// Collisions of `route`; empty when `status` is `clear`.
    pub collisions: Vec<CollisionHit>,
    pub iterations: usize,
    pub budget_exhausted: bool,
    pub abort_reason: Option<AbortReason>,
}

/// Cooperative cancellation, observed after each provider call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Route preferences and limits for one planner.
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub route_type: RouteType,
    pub live_traffic: bool,
    pub depart_at: DepartAt,
    pub max_avoid_areas: usize,
}

impl PlannerSettings {
    pub fn from_request(config: &Config, request: &RoutePlanRequest) -> Self {
        Self {
            route_type: request.route_type.unwrap_or(config.default_route_type),
            live_traffic: request.traffic.unwrap_or(config.default_live_traffic),
            depart_at: request.depart_at.unwrap_or_default(),
            max_avoid_areas: config.max_avoid_areas,
        }
    }
}

#[derive(Debug)]
enum PlannerState {
    Request,
    Scan(Route),
    Grow {
        route: Route,
        collisions: Vec<CollisionHit>,
    },
    Done(Route),
    Aborted {
        route: Route,
        collisions: Vec<CollisionHit>,
        reason: AbortReason,
    },
}

pub struct AvoidancePlanner<'a, P> {
    provider: &'a P,
    origin: LatLon,
    destination: LatLon,
    settings: PlannerSettings,
    obstacles: ObstacleSet,
    index: ObstacleIndex,
    avoidance: Vec<u64>,
    avoided_ids: HashSet<u64>,
    iterations: usize,
    cancel: CancelToken,
}

impl<'a, P: RouteProvider> AvoidancePlanner<'a, P> {
    pub fn new(
        provider: &'a P,
        origin: LatLon,
        destination: LatLon,
        obstacles: ObstacleSet,
        settings: PlannerSettings,
    ) -> Self {
        let index = obstacles.build_index();
        Self {
            provider,
            origin,
            destination,
            settings,
            obstacles,
            index,
            avoidance: Vec::new(),
            avoided_ids: HashSet::new(),
            iterations: 0,
            cancel: CancelToken::default(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Drive the planner to a terminal state.
    pub async fn run(mut self) -> Result<RoutePlanResponse, PlanError> {
        let mut state = PlannerState::Request;
        loop {
            state = match state {
                PlannerState::Request => self.request().await?,
                PlannerState::Scan(route) => self.scan(route),
                PlannerState::Grow { route, collisions } => self.grow(route, collisions),
                PlannerState::Done(route) => return Ok(self.finish(route, Vec::new(), None)),
                PlannerState::Aborted {
                    route,
                    collisions,
                    reason,
                } => return Ok(self.finish(route, collisions, Some(reason))),
            };
        }
    }

    fn avoid_rectangles(&self) -> Vec<Rectangle> {
        self.avoidance
            .iter()
            .filter_map(|id| self.obstacles.get(*id))
            .map(|obstacle| obstacle.scaled)
            .collect()
    }

    async fn request(&mut self) -> Result<PlannerState, PlanError> {
        self.iterations += 1;
        let request = RouteRequest {
            origin: self.origin,
            destination: self.destination,
            avoid: self.avoid_rectangles(),
            route_type: self.settings.route_type,
            live_traffic: self.settings.live_traffic,
            depart_at: self.settings.depart_at,
        };
        tracing::debug!(
            "Avoidance iteration {}: requesting route with {} avoid areas",
            self.iterations,
            request.avoid.len()
        );

        let route = self.provider.calculate_route(&request).await?;
        if self.cancel.is_cancelled() {
            tracing::info!(
                "Planning cancelled after iteration {}, discarding {} avoid areas",
                self.iterations,
                self.avoidance.len()
            );
            return Err(PlanError::Cancelled);
        }
        Ok(PlannerState::Scan(route))
    }

    fn scan(&self, route: Route) -> PlannerState {
        let collisions = scan(&route.geometry, &self.index);
        tracing::debug!(
            "Avoidance iteration {}: {} points, {} collisions",
            self.iterations,
            route.geometry.point_count(),
            collisions.len()
        );
        if collisions.is_empty() {
            PlannerState::Done(route)
        } else {
            for hit in &collisions {
                tracing::warn!(
                    "Route crosses obstacle {} at part {} segment {} ({:.6}, {:.6}) t={:.4}",
                    hit.rect_id,
                    hit.part_index,
                    hit.segment_index,
                    hit.hit_point.lon(),
                    hit.hit_point.lat(),
                    hit.t
                );
            }
            PlannerState::Grow { route, collisions }
        }
    }

    fn grow(&mut self, route: Route, collisions: Vec<CollisionHit>) -> PlannerState {
        let mut added = 0usize;
        for hit in &collisions {
            if self.obstacles.get(hit.rect_id).is_some() && self.avoided_ids.insert(hit.rect_id) {
                self.avoidance.push(hit.rect_id);
                added += 1;
            }
        }

        if added == 0 {
            tracing::warn!(
                "Provider route still crosses avoided obstacles after {} iterations",
                self.iterations
            );
            return PlannerState::Aborted {
                route,
                collisions,
                reason: AbortReason::NoProgress,
            };
        }

        if self.avoidance.len() > self.settings.max_avoid_areas {
            tracing::warn!(
                "Avoid set reached {} obstacles (cap {}), giving up after {} iterations",
                self.avoidance.len(),
                self.settings.max_avoid_areas,
                self.iterations
            );
            return PlannerState::Aborted {
                route,
                collisions,
                reason: AbortReason::RetryBudget,
            };
        }

        PlannerState::Request
    }

    fn finish(
        self,
        route: Route,
        collisions: Vec<CollisionHit>,
        reason: Option<AbortReason>,
    ) -> RoutePlanResponse {
        let clear = reason.is_none();
        if clear {
            tracing::info!(
                "Clear route after {} iterations: {:.2} km, {:.1} min, {} avoid areas",
                self.iterations,
                route.summary.length_km(),
                route.summary.travel_time_min(),
                self.avoidance.len()
            );
        }
        let avoided = self
            .avoidance
            .iter()
            .filter_map(|id| self.obstacles.get(*id).copied())
            .collect();
        RoutePlanResponse {
            ok: clear,
            status: if clear {
                PlanStatus::Clear
            } else {
                PlanStatus::Exhausted
            },
            route,
            avoided,
            collisions,
            iterations: self.iterations,
            budget_exhausted: reason == Some(AbortReason::RetryBudget),
            abort_reason: reason,
        }
    }
}

/// Validate a request, scale its obstacles and plan around them.
pub async fn plan_route<P: RouteProvider>(
    provider: &P,
    config: &Config,
    request: RoutePlanRequest,
    cancel: CancelToken,
) -> Result<RoutePlanResponse, PlanError> {
    request.origin.validate()?;
    request.destination.validate()?;
    let obstacles = ObstacleSet::from_arrays(&request.obstacles, &config.obstacle_scaling)?;
    let settings = PlannerSettings::from_request(config, &request);

    tracing::info!(
        "Planning route {:?} -> {:?} around {} obstacles",
        request.origin,
        request.destination,
        obstacles.len()
    );

    AvoidancePlanner::new(
        provider,
        request.origin,
        request.destination,
        obstacles,
        settings,
    )
    .with_cancel_token(cancel)
    .run()
    .await
}
