//! Route request building.
//!
//! Turns the operator's filters into the body sent to the optimizer, and
//! synthesizes a stand-in route when the optimizer is unreachable during
//! development.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RouteError;
use crate::model::{Area, Bin, DEFAULT_DEPOT, WasteType};
use crate::polyline::Polyline;
use crate::traits::{OptimizedRoute, RouteSummary};

/// Bins at or above this fill level are critical.
pub const CRITICAL_FILL_LEVEL: u8 = 90;

/// Heuristics for the synthesized route.
const MOCK_KM_PER_BIN: f64 = 0.5;
const MOCK_MINUTES_PER_BIN: f64 = 15.0;

/// Operator-chosen filters for a new route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFilters {
    pub fill_level_threshold: u8,
    pub waste_type: Option<WasteType>,
    pub include_critical_bins: bool,
}

impl RouteFilters {
    /// Whether `bin` makes the route on fill level and waste type alone.
    pub fn qualifies(&self, bin: &Bin) -> bool {
        bin.fill_level >= self.fill_level_threshold
            && self.waste_type.is_none_or(|waste_type| bin.waste_type == waste_type)
    }
}

impl Default for RouteFilters {
    fn default() -> Self {
        Self {
            fill_level_threshold: 70,
            waste_type: None,
            include_critical_bins: true,
        }
    }
}

/// Body of `POST /api/route-optimization/area/{areaId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub area_id: String,
    pub fill_level_threshold: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_type: Option<WasteType>,
    pub include_critical_bins: bool,
    /// Bins forced into the route regardless of the threshold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_bins: Vec<String>,
}

/// The route as it currently stands, sent along with an adjust request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingRoute {
    pub distance: f64,
    pub duration: f64,
    pub route: Polyline,
    pub bin_sequence: Vec<String>,
}

/// Body of `POST /api/route-optimization/adjust-existing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRouteRequest {
    pub area_id: String,
    pub existing_route: ExistingRoute,
    pub include_bins: Vec<String>,
    pub exclude_bins: Vec<String>,
    pub bin_order: Vec<String>,
}

/// Builds the optimizer request for `area`.
///
/// With `include_critical_bins`, every bin at or above [`CRITICAL_FILL_LEVEL`]
/// is forced in, merged with the bins matching the waste-type filter.
pub fn build_request(
    area: Option<&Area>,
    filters: &RouteFilters,
) -> Result<OptimizationRequest, RouteError> {
    let area = area.ok_or(RouteError::NoAreaSelected)?;
    if filters.fill_level_threshold > 100 {
        return Err(RouteError::InvalidThreshold(filters.fill_level_threshold));
    }

    let mut include_bins: Vec<String> = Vec::new();
    let mut push_unique = |id: &str| {
        if !include_bins.iter().any(|existing| existing == id) {
            include_bins.push(id.to_string());
        }
    };

    if filters.waste_type.is_some() {
        area.bins
            .iter()
            .filter(|bin| filters.qualifies(bin))
            .for_each(|bin| push_unique(&bin.id));
    }

    if filters.include_critical_bins {
        area.bins
            .iter()
            .filter(|bin| bin.fill_level >= CRITICAL_FILL_LEVEL)
            .for_each(|bin| push_unique(&bin.id));
    }

    debug!(
        area_id = %area.id,
        threshold = filters.fill_level_threshold,
        forced = include_bins.len(),
        "built optimization request"
    );

    Ok(OptimizationRequest {
        area_id: area.id.clone(),
        fill_level_threshold: filters.fill_level_threshold,
        waste_type: filters.waste_type,
        include_critical_bins: filters.include_critical_bins,
        include_bins,
    })
}

/// Locally synthesized route used when the optimizer cannot be reached.
///
/// Keeps the area's bin order, takes every bin at or above the threshold plus
/// any forced bins, and estimates the metrics per bin.
pub fn mock_route(area: &Area, request: &OptimizationRequest) -> OptimizedRoute {
    let eligible: Vec<_> = area
        .bins
        .iter()
        .filter(|bin| {
            bin.fill_level >= request.fill_level_threshold
                || request.include_bins.contains(&bin.id)
        })
        .collect();

    let count = eligible.len() as f64;
    let mut points = vec![area.start_point(DEFAULT_DEPOT)];
    points.extend(eligible.iter().map(|bin| bin.coordinates()));
    points.push(area.end_point(DEFAULT_DEPOT));

    OptimizedRoute {
        route: RouteSummary {
            distance: MOCK_KM_PER_BIN * count,
            duration: MOCK_MINUTES_PER_BIN * count,
            route: Polyline::new(points),
        },
        bin_sequence: eligible.iter().map(|bin| bin.id.clone()).collect(),
    }
}
