//! Route materialization.
//!
//! Turns an optimizer response into a [`RouteDraft`]: every id in the bin
//! sequence becomes a stop, numbered and given a linear ETA.

use jiff::Timestamp;
use tracing::{debug, warn};

use crate::draft::{Endpoint, RouteDraft, RouteStatus, RouteStop};
use crate::model::{Area, Coordinates, DEFAULT_DEPOT};
use crate::traits::OptimizedRoute;

/// Floors applied so a route never reads as "0 km / 0 min".
pub const MIN_DISTANCE_KM: f64 = 0.1;
pub const MIN_DURATION_MINUTES: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Minutes between consecutive stop ETAs.
    pub stop_interval_minutes: i64,
    /// Used when the area has no start or end point.
    pub default_depot: Coordinates,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            stop_interval_minutes: 10,
            default_depot: DEFAULT_DEPOT,
        }
    }
}

/// Builds a draft for `area` from an optimizer response.
///
/// The draft has exactly one stop per id in `response.bin_sequence`; ids the
/// area does not know become placeholder stops.
pub fn materialize(
    area: &Area,
    response: &OptimizedRoute,
    schedule_start: Timestamp,
    options: &MaterializeOptions,
) -> RouteDraft {
    let stops = resolve_stops(area, &[], &response.bin_sequence);

    let mut draft = RouteDraft {
        area_id: area.id.clone(),
        area_name: area.name.clone(),
        collector_id: None,
        stops,
        total_distance: 0.0,
        estimated_duration: 0.0,
        polyline: response.route.route.clone(),
        start: Endpoint {
            label: area.start_label(),
            coordinates: area.start_point(options.default_depot),
        },
        end: Endpoint {
            label: area.end_label(),
            coordinates: area.end_point(options.default_depot),
        },
        status: RouteStatus::Scheduled,
        created_at: Timestamp::now(),
        schedule_start,
        stop_interval_minutes: options.stop_interval_minutes,
    };
    apply_metrics(&mut draft, response);
    draft.renumber();

    debug!(
        area_id = %area.id,
        stops = draft.len(),
        distance_km = draft.total_distance,
        duration_min = draft.estimated_duration,
        "materialized route"
    );
    draft
}

/// Copies distance, duration and geometry from `response`, applying the floors.
pub(crate) fn apply_metrics(draft: &mut RouteDraft, response: &OptimizedRoute) {
    draft.total_distance = response.route.distance.max(MIN_DISTANCE_KM);
    draft.estimated_duration = response.route.duration.max(MIN_DURATION_MINUTES);
    draft.polyline = response.route.route.clone();
}

/// Resolves each id against the area's bins, then against `known`
/// (waypoints carried over from a previous draft), else a placeholder.
pub(crate) fn resolve_stops(area: &Area, known: &[RouteStop], sequence: &[String]) -> Vec<RouteStop> {
    let mut missing = 0usize;
    let stops = sequence
        .iter()
        .map(|id| {
            if let Some(bin) = area.bin(id) {
                RouteStop::from_bin(bin)
            } else if let Some(stop) = known.iter().find(|stop| &stop.id == id) {
                stop.clone()
            } else {
                missing += 1;
                RouteStop::placeholder(id)
            }
        })
        .collect();

    if missing > 0 {
        warn!(
            area_id = %area.id,
            missing,
            "route references bins missing from the area; using placeholders"
        );
    }
    stops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::StopKind;
    use crate::model::{Bin, Depot, PointGeometry, WasteType};
    use crate::polyline::Polyline;
    use crate::traits::RouteSummary;

    fn bin(id: &str, lng: f64, lat: f64) -> Bin {
        Bin {
            id: id.to_string(),
            location: PointGeometry {
                coordinates: Coordinates::new(lng, lat),
            },
            fill_level: 80,
            waste_type: WasteType::General,
            address: Some(format!("{} Galle Road", id)),
            status: None,
            last_collected: None,
        }
    }

    fn area() -> Area {
        Area {
            id: "area-1".to_string(),
            name: "Wellawatte South".to_string(),
            geometry: None,
            start_location: Some(Depot {
                coordinates: Coordinates::new(79.858, 6.871),
                address: None,
            }),
            end_location: None,
            bins: vec![bin("known1", 79.86, 6.87), bin("known2", 79.87, 6.88)],
        }
    }

    fn response(sequence: &[&str], distance: f64, duration: f64) -> OptimizedRoute {
        OptimizedRoute {
            route: RouteSummary {
                distance,
                duration,
                route: Polyline::new(vec![Coordinates::new(79.86, 6.87)]),
            },
            bin_sequence: sequence.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn start() -> Timestamp {
        "2024-06-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_placeholder_keeps_stop_count() {
        let draft = materialize(
            &area(),
            &response(&["known1", "unknown1", "known2"], 3.0, 20.0),
            start(),
            &MaterializeOptions::default(),
        );

        assert_eq!(draft.len(), 3);
        let middle = &draft.stops[1];
        assert_eq!(middle.kind, StopKind::Placeholder);
        assert_eq!(middle.address.as_deref(), Some("Unknown"));
        assert_eq!(middle.coordinates, Coordinates::ORIGIN);
        assert_eq!(draft.stops[2].id, "known2");
        assert!(draft.is_contiguous());
    }

    #[test]
    fn test_metric_floors() {
        let draft = materialize(
            &area(),
            &response(&["known1"], 0.0, 0.0),
            start(),
            &MaterializeOptions::default(),
        );
        assert_eq!(draft.total_distance, MIN_DISTANCE_KM);
        assert_eq!(draft.estimated_duration, MIN_DURATION_MINUTES);
    }

    #[test]
    fn test_linear_eta_uses_configured_interval() {
        let options = MaterializeOptions {
            stop_interval_minutes: 30,
            ..MaterializeOptions::default()
        };
        let draft = materialize(&area(), &response(&["known1", "known2"], 2.0, 15.0), start(), &options);

        assert_eq!(draft.stops[0].estimated_arrival, start());
        assert_eq!(
            draft.stops[1].estimated_arrival,
            "2024-06-01T08:30:00Z".parse::<Timestamp>().unwrap()
        );
    }

    #[test]
    fn test_endpoints_fall_back_to_default_depot() {
        let draft = materialize(
            &area(),
            &response(&[], 1.0, 5.0),
            start(),
            &MaterializeOptions::default(),
        );
        assert!(draft.is_empty());
        assert_eq!(draft.start.coordinates, Coordinates::new(79.858, 6.871));
        assert_eq!(draft.end.coordinates, DEFAULT_DEPOT);
        assert_eq!(draft.status, RouteStatus::Scheduled);
    }
}
