//! Saving a route as a collector's schedule.

use jiff::civil::{Date, Time};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::draft::{RouteDraft, RouteStatus};
use crate::editor::{RequestState, RouteEditor};
use crate::error::RouteError;
use crate::polyline::Polyline;
use crate::traits::RouteBackend;

/// Operator input collected alongside the route.
#[derive(Debug, Clone)]
pub struct ScheduleForm {
    pub collector_id: Option<String>,
    pub date: Date,
    pub start_time: Time,
    /// Zone `date` and `start_time` are expressed in.
    pub time_zone: TimeZone,
    pub notes: String,
    /// Defaults to the area name and date.
    pub name: Option<String>,
}

impl ScheduleForm {
    /// Creates a form in UTC with no notes and the default name.
    pub fn new(collector_id: Option<String>, date: Date, start_time: Time) -> Self {
        Self {
            collector_id,
            date,
            start_time,
            time_zone: TimeZone::UTC,
            notes: String::new(),
            name: None,
        }
    }

    /// Start of the shift as an instant.
    pub fn start(&self) -> Result<Timestamp, RouteError> {
        self.date
            .to_datetime(self.start_time)
            .to_zoned(self.time_zone.clone())
            .map(|zoned| zoned.timestamp())
            .map_err(|err| RouteError::InvalidStartTime(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointEntry {
    pub sequence_number: usize,
    pub lat: f64,
    pub lng: f64,
}

/// Body of `POST /api/schedules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub name: String,
    pub area_id: String,
    pub collector_id: String,
    pub date: Date,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: RouteStatus,
    pub notes: String,
    pub route: Polyline,
    pub distance: f64,
    pub duration: f64,
    pub bin_sequence: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<WaypointEntry>,
}

/// What the schedule store returns for a created schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<RouteStatus>,
}

/// Validates the form and builds the schedule payload for `draft`.
///
/// The form's collector wins over the one assigned on the draft.
pub fn build_payload(draft: &RouteDraft, form: &ScheduleForm) -> Result<SchedulePayload, RouteError> {
    let collector_id = [&form.collector_id, &draft.collector_id]
        .into_iter()
        .filter_map(|id| id.as_deref().map(str::trim))
        .find(|id| !id.is_empty())
        .ok_or(RouteError::MissingCollector)?;
    if draft.is_empty() {
        return Err(RouteError::EmptyRoute);
    }

    let start_time = form.start()?;
    let duration_secs = (draft.estimated_duration * 60.0).round() as i64;
    let end_time = start_time
        .checked_add(SignedDuration::from_secs(duration_secs))
        .map_err(|err| RouteError::InvalidStartTime(err.to_string()))?;

    let name = form
        .name
        .clone()
        .unwrap_or_else(|| format!("{} - {}", draft.area_name, form.date));

    Ok(SchedulePayload {
        name,
        area_id: draft.area_id.clone(),
        collector_id: collector_id.to_string(),
        date: form.date,
        start_time,
        end_time,
        status: RouteStatus::Scheduled,
        notes: form.notes.clone(),
        route: draft.polyline.clone(),
        distance: draft.total_distance,
        duration: draft.estimated_duration,
        bin_sequence: draft.bin_sequence(),
        waypoints: draft
            .waypoints()
            .map(|stop| WaypointEntry {
                sequence_number: stop.sequence_number,
                lat: stop.coordinates.lat,
                lng: stop.coordinates.lng,
            })
            .collect(),
    })
}

/// Persists the editor's current draft.
///
/// The editor is only borrowed, so after a failure the operator can retry
/// with the same route.
pub fn save_schedule<B: RouteBackend>(
    backend: &B,
    editor: &RouteEditor,
    form: &ScheduleForm,
) -> Result<ScheduleRecord, RouteError> {
    if editor.request_state() == RequestState::Pending {
        return Err(RouteError::RequestPending);
    }
    let payload = build_payload(editor.draft(), form)?;

    match backend.create_schedule(&payload) {
        Ok(record) => {
            info!(
                area_id = %payload.area_id,
                collector_id = %payload.collector_id,
                stops = payload.bin_sequence.len() + payload.waypoints.len(),
                "schedule created"
            );
            Ok(record)
        }
        Err(err) => {
            error!(area_id = %payload.area_id, error = %err, "failed to create schedule");
            Err(err.into())
        }
    }
}
