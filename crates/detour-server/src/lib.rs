//! Detour server library: provider client, avoidance planner and HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod provider;
pub mod route_planner;
pub mod state;
pub mod tomtom;

pub use error::PlanError;
pub use provider::{DepartAt, RouteProvider, RouteRequest, RouteType};
pub use route_planner::{
    plan_route, AbortReason, AvoidancePlanner, CancelToken, PlanStatus, PlannerSettings,
    RoutePlanRequest, RoutePlanResponse,
};
pub use tomtom::TomTomClient;
