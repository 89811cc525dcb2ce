//! Test fixtures for waste-route-planner.
//!
//! Provides:
//! - Real Colombo street locations for bins and depots
//! - A bin builder with sensible defaults
//! - An in-memory backend that mimics the optimizer and schedule store

#![allow(dead_code)]

pub mod colombo_locations;

use std::cell::{Cell, RefCell};

use waste_route_planner::error::ApiError;
use waste_route_planner::model::{
    Area, Bin, Coordinates, Depot, PointGeometry, PolygonGeometry, WasteType,
};
use waste_route_planner::polyline::Polyline;
use waste_route_planner::request::{AdjustRouteRequest, OptimizationRequest};
use waste_route_planner::schedule::{SchedulePayload, ScheduleRecord};
use waste_route_planner::traits::{OptimizedRoute, RouteBackend, RouteSummary};

use colombo_locations::{Location, WELLAWATTE_DEPOT, WELLAWATTE_SOUTH, WELLAWATTE_SOUTH_BOUNDARY};

// ============================================================================
// Builders
// ============================================================================

/// Builder for test bins.
#[derive(Clone, Debug)]
pub struct TestBin {
    bin: Bin,
}

impl TestBin {
    pub fn new(id: &str, location: &Location) -> Self {
        Self {
            bin: Bin {
                id: id.to_string(),
                location: PointGeometry {
                    coordinates: Coordinates::new(location.lng, location.lat),
                },
                fill_level: 50,
                waste_type: WasteType::General,
                address: Some(location.name.to_string()),
                status: None,
                last_collected: None,
            },
        }
    }

    pub fn fill(mut self, fill_level: u8) -> Self {
        self.bin.fill_level = fill_level;
        self
    }

    pub fn waste(mut self, waste_type: WasteType) -> Self {
        self.bin.waste_type = waste_type;
        self
    }

    pub fn build(self) -> Bin {
        self.bin
    }
}

/// "Wellawatte South" with bins A (95%), B (40%) and C (75%).
pub fn wellawatte_south() -> Area {
    area_with_bins(vec![
        TestBin::new("A", &WELLAWATTE_SOUTH[0]).fill(95).build(),
        TestBin::new("B", &WELLAWATTE_SOUTH[1]).fill(40).build(),
        TestBin::new("C", &WELLAWATTE_SOUTH[2]).fill(75).build(),
    ])
}

/// "Wellawatte South" with five bins of mixed fill levels and waste types.
pub fn wellawatte_south_extended() -> Area {
    area_with_bins(vec![
        TestBin::new("A", &WELLAWATTE_SOUTH[0]).fill(95).build(),
        TestBin::new("B", &WELLAWATTE_SOUTH[1]).fill(40).build(),
        TestBin::new("C", &WELLAWATTE_SOUTH[2]).fill(75).build(),
        TestBin::new("D", &WELLAWATTE_SOUTH[3]).fill(88).waste(WasteType::Recycle).build(),
        TestBin::new("E", &WELLAWATTE_SOUTH[4]).fill(15).waste(WasteType::Organic).build(),
    ])
}

pub fn area_with_bins(bins: Vec<Bin>) -> Area {
    Area {
        id: "area-wellawatte-south".to_string(),
        name: "Wellawatte South".to_string(),
        geometry: Some(PolygonGeometry {
            coordinates: vec![
                WELLAWATTE_SOUTH_BOUNDARY
                    .iter()
                    .map(|&point| Coordinates::from(point))
                    .collect(),
            ],
        }),
        start_location: Some(Depot {
            coordinates: Coordinates::new(WELLAWATTE_DEPOT.lng, WELLAWATTE_DEPOT.lat),
            address: Some(WELLAWATTE_DEPOT.name.to_string()),
        }),
        end_location: None,
        bins,
    }
}

// ============================================================================
// Fake backend
// ============================================================================

/// In-memory optimizer and schedule store.
///
/// Optimizing keeps the area's bin order and takes every bin at or above the
/// threshold (matching the waste type, if one is set) plus forced bins.
/// Adjusting keeps the requested order, drops excluded ids and appends forced
/// ids that are missing. Each kilometre is 0.8 per stop, each stop 12 minutes.
pub struct FakeBackend {
    pub areas: Vec<Area>,
    pub fail_optimize: Cell<bool>,
    pub fail_adjust: Cell<bool>,
    pub fail_schedule: Cell<bool>,
    pub optimize_requests: RefCell<Vec<OptimizationRequest>>,
    pub adjust_requests: RefCell<Vec<AdjustRouteRequest>>,
    pub schedules: RefCell<Vec<SchedulePayload>>,
}

impl FakeBackend {
    pub fn new(areas: Vec<Area>) -> Self {
        Self {
            areas,
            fail_optimize: Cell::new(false),
            fail_adjust: Cell::new(false),
            fail_schedule: Cell::new(false),
            optimize_requests: RefCell::new(Vec::new()),
            adjust_requests: RefCell::new(Vec::new()),
            schedules: RefCell::new(Vec::new()),
        }
    }

    fn area(&self, id: &str) -> Result<&Area, ApiError> {
        self.areas.iter().find(|area| area.id == id).ok_or(ApiError::Api {
            status: 404,
            message: format!("area {} not found", id),
        })
    }

    fn route_for(&self, area: &Area, sequence: Vec<String>) -> OptimizedRoute {
        let points = sequence
            .iter()
            .filter_map(|id| area.bin(id))
            .map(|bin| bin.coordinates())
            .collect();
        let stops = sequence.len() as f64;
        OptimizedRoute {
            route: RouteSummary {
                distance: 0.8 * stops,
                duration: 12.0 * stops,
                route: Polyline::new(points),
            },
            bin_sequence: sequence,
        }
    }
}

fn server_error(what: &str) -> ApiError {
    ApiError::Api {
        status: 503,
        message: format!("{} unavailable", what),
    }
}

impl RouteBackend for FakeBackend {
    fn areas_with_bins(&self) -> Result<Vec<Area>, ApiError> {
        Ok(self.areas.clone())
    }

    fn optimize_route(&self, request: &OptimizationRequest) -> Result<OptimizedRoute, ApiError> {
        self.optimize_requests.borrow_mut().push(request.clone());
        if self.fail_optimize.get() {
            return Err(server_error("optimizer"));
        }

        let area = self.area(&request.area_id)?;
        let sequence = area
            .bins
            .iter()
            .filter(|bin| {
                let qualifies = bin.fill_level >= request.fill_level_threshold
                    && request.waste_type.is_none_or(|waste_type| waste_type == bin.waste_type);
                qualifies || request.include_bins.contains(&bin.id)
            })
            .map(|bin| bin.id.clone())
            .collect();
        Ok(self.route_for(area, sequence))
    }

    fn adjust_route(&self, request: &AdjustRouteRequest) -> Result<OptimizedRoute, ApiError> {
        self.adjust_requests.borrow_mut().push(request.clone());
        if self.fail_adjust.get() {
            return Err(server_error("optimizer"));
        }

        let area = self.area(&request.area_id)?;
        let mut sequence: Vec<String> = request
            .bin_order
            .iter()
            .filter(|id| !request.exclude_bins.contains(*id))
            .cloned()
            .collect();
        for id in &request.include_bins {
            if !sequence.contains(id) {
                sequence.push(id.clone());
            }
        }
        Ok(self.route_for(area, sequence))
    }

    fn create_schedule(&self, payload: &SchedulePayload) -> Result<ScheduleRecord, ApiError> {
        if self.fail_schedule.get() {
            return Err(server_error("schedule store"));
        }
        let mut schedules = self.schedules.borrow_mut();
        schedules.push(payload.clone());
        Ok(ScheduleRecord {
            id: Some(format!("schedule-{}", schedules.len())),
            name: Some(payload.name.clone()),
            status: Some(payload.status),
        })
    }
}
