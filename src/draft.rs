//! The editable route and its stops.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::model::{Bin, BinStatus, Coordinates, WasteType};
use crate::polyline::Polyline;

/// Address shown for stops the local bin cache does not know.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// Fill level given to waypoints so they render like urgent stops.
pub const WAYPOINT_FILL_LEVEL: u8 = 100;

/// What backs a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    /// A bin from the area's bin list.
    Bin,
    /// A bin id the optimizer returned but the area does not contain.
    Placeholder,
    /// An operator-added coordinate with no bin behind it.
    Waypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// One visit in a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub id: String,
    pub kind: StopKind,
    pub coordinates: Coordinates,
    pub fill_level: u8,
    pub waste_type: Option<WasteType>,
    pub address: Option<String>,
    pub status: Option<BinStatus>,
    /// 1-based position in visiting order.
    pub sequence_number: usize,
    pub estimated_arrival: Timestamp,
}

impl RouteStop {
    /// Creates an unnumbered stop for a known bin.
    pub fn from_bin(bin: &Bin) -> Self {
        Self {
            id: bin.id.clone(),
            kind: StopKind::Bin,
            coordinates: bin.coordinates(),
            fill_level: bin.fill_level,
            waste_type: Some(bin.waste_type),
            address: bin.address.clone(),
            status: bin.status,
            sequence_number: 0,
            estimated_arrival: Timestamp::UNIX_EPOCH,
        }
    }

    /// Creates a stop for an id no known bin matches. It sits at `[0, 0]`
    /// with an unknown address.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: StopKind::Placeholder,
            coordinates: Coordinates::ORIGIN,
            fill_level: 0,
            waste_type: None,
            address: Some(UNKNOWN_ADDRESS.to_string()),
            status: None,
            sequence_number: 0,
            estimated_arrival: Timestamp::UNIX_EPOCH,
        }
    }

    /// Creates an operator-added stop.
    pub fn waypoint(id: String, coordinates: Coordinates) -> Self {
        Self {
            id,
            kind: StopKind::Waypoint,
            coordinates,
            fill_level: WAYPOINT_FILL_LEVEL,
            waste_type: None,
            address: None,
            status: None,
            sequence_number: 0,
            estimated_arrival: Timestamp::UNIX_EPOCH,
        }
    }

    pub fn is_waypoint(&self) -> bool {
        self.kind == StopKind::Waypoint
    }
}

/// Start or end of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub label: String,
    pub coordinates: Coordinates,
}

/// The working route an operator edits before saving it as a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDraft {
    pub area_id: String,
    pub area_name: String,
    pub collector_id: Option<String>,
    pub stops: Vec<RouteStop>,
    /// Kilometres.
    pub total_distance: f64,
    /// Minutes.
    pub estimated_duration: f64,
    pub polyline: Polyline,
    pub start: Endpoint,
    pub end: Endpoint,
    pub status: RouteStatus,
    pub created_at: Timestamp,
    /// Arrival time of the first stop.
    pub schedule_start: Timestamp,
    pub stop_interval_minutes: i64,
}

impl RouteDraft {
    /// Reassigns sequence numbers `1..=N` in list order and refreshes the
    /// linear ETA of every stop.
    ///
    /// ETAs past the representable range clamp to [`Timestamp::MAX`].
    pub fn renumber(&mut self) {
        let interval = self.stop_interval_minutes;
        for (index, stop) in self.stops.iter_mut().enumerate() {
            stop.sequence_number = index + 1;
            stop.estimated_arrival = i64::try_from(index)
                .ok()
                .and_then(|index| interval.checked_mul(index))
                .and_then(|minutes| minutes.checked_mul(60))
                .and_then(|secs| {
                    self.schedule_start
                        .checked_add(SignedDuration::from_secs(secs))
                        .ok()
                })
                .unwrap_or(Timestamp::MAX);
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.stops.iter().position(|stop| stop.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn stop(&self, id: &str) -> Option<&RouteStop> {
        self.stops.iter().find(|stop| stop.id == id)
    }

    /// Ids of every stop in visiting order, waypoints included.
    pub fn stop_ids(&self) -> Vec<String> {
        self.stops.iter().map(|stop| stop.id.clone()).collect()
    }

    /// Ids of the bin-backed stops in visiting order.
    pub fn bin_sequence(&self) -> Vec<String> {
        self.stops
            .iter()
            .filter(|stop| !stop.is_waypoint())
            .map(|stop| stop.id.clone())
            .collect()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &RouteStop> {
        self.stops.iter().filter(|stop| stop.is_waypoint())
    }

    /// True when sequence numbers are exactly `1..=N` in list order.
    pub fn is_contiguous(&self) -> bool {
        self.stops
            .iter()
            .enumerate()
            .all(|(index, stop)| stop.sequence_number == index + 1)
    }
}
