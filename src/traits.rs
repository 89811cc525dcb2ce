//! The seam between the route workflow and the backend.
//!
//! The optimizer and schedule store are external collaborators. Everything in
//! the workflow talks to them through [`RouteBackend`] so front ends and tests
//! can supply their own implementation.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::Area;
use crate::polyline::Polyline;
use crate::request::{AdjustRouteRequest, OptimizationRequest};
use crate::schedule::{SchedulePayload, ScheduleRecord};
use crate::units::deserialize_metric;

/// Aggregate metrics and geometry of an optimized route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Kilometres.
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub distance: f64,
    /// Minutes.
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub duration: f64,
    #[serde(default, alias = "geometry")]
    pub route: Polyline,
}

/// Optimizer response: the visiting order plus its summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    #[serde(default)]
    pub route: RouteSummary,
    #[serde(default)]
    pub bin_sequence: Vec<String>,
}

/// Backend operations used by the route workflow.
pub trait RouteBackend {
    /// All areas, each with the bins located inside it.
    fn areas_with_bins(&self) -> Result<Vec<Area>, ApiError>;

    /// Compute a fresh route for an area.
    fn optimize_route(&self, request: &OptimizationRequest) -> Result<OptimizedRoute, ApiError>;

    /// Recompute an existing route with operator overrides applied.
    fn adjust_route(&self, request: &AdjustRouteRequest) -> Result<OptimizedRoute, ApiError>;

    /// Persist a route as a collector's schedule.
    fn create_schedule(&self, payload: &SchedulePayload) -> Result<ScheduleRecord, ApiError>;
}

impl<B: RouteBackend + ?Sized> RouteBackend for &B {
    fn areas_with_bins(&self) -> Result<Vec<Area>, ApiError> {
        (**self).areas_with_bins()
    }

    fn optimize_route(&self, request: &OptimizationRequest) -> Result<OptimizedRoute, ApiError> {
        (**self).optimize_route(request)
    }

    fn adjust_route(&self, request: &AdjustRouteRequest) -> Result<OptimizedRoute, ApiError> {
        (**self).adjust_route(request)
    }

    fn create_schedule(&self, payload: &SchedulePayload) -> Result<ScheduleRecord, ApiError> {
        (**self).create_schedule(payload)
    }
}
