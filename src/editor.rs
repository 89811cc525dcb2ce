//! Operator edits on a materialized route.
//!
//! [`RouteEditor`] owns the working draft, a pristine copy to reset to, and
//! the two override sets sent to the optimizer on reoptimization:
//!
//! - `selected_bins` forces in bins the route filters would leave out (and
//!   records waypoints so they survive a server recompute),
//! - `excluded_bins` forces out bins that would otherwise qualify.
//!
//! After every edit stops are numbered `1..=N` with no gaps, no id is in both
//! sets, and no excluded id is an active stop. Reoptimization is a two-phase
//! `Idle -> Pending -> Idle` exchange; every mutating command is rejected
//! while a request is pending.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::draft::{RouteDraft, RouteStop};
use crate::error::{ApiError, RouteError};
use crate::materialize::{apply_metrics, resolve_stops};
use crate::model::{Area, Coordinates};
use crate::request::{AdjustRouteRequest, ExistingRoute, RouteFilters};
use crate::traits::{OptimizedRoute, RouteBackend};

const WAYPOINT_PREFIX: &str = "waypoint-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Pending,
}

#[derive(Debug, Clone)]
pub struct RouteEditor {
    area: Area,
    filters: RouteFilters,
    original: RouteDraft,
    draft: RouteDraft,
    selected_bins: BTreeSet<String>,
    excluded_bins: BTreeSet<String>,
    adjusted: bool,
    edit_mode: bool,
    request_state: RequestState,
    waypoint_counter: u64,
}

impl RouteEditor {
    /// Starts editing `draft`, which becomes the state [`reset_to_original`]
    /// returns to.
    ///
    /// [`reset_to_original`]: RouteEditor::reset_to_original
    pub fn new(area: Area, filters: RouteFilters, draft: RouteDraft) -> Self {
        Self {
            area,
            filters,
            original: draft.clone(),
            draft,
            selected_bins: BTreeSet::new(),
            excluded_bins: BTreeSet::new(),
            adjusted: false,
            edit_mode: false,
            request_state: RequestState::Idle,
            waypoint_counter: 0,
        }
    }

    /// The route as edited so far.
    pub fn draft(&self) -> &RouteDraft {
        &self.draft
    }

    /// The route as first materialized.
    pub fn original(&self) -> &RouteDraft {
        &self.original
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    /// Filters the route was generated with.
    pub fn filters(&self) -> &RouteFilters {
        &self.filters
    }

    /// Ids forced into the route, waypoints included.
    pub fn selected_bins(&self) -> &BTreeSet<String> {
        &self.selected_bins
    }

    /// Ids kept out of the route.
    pub fn excluded_bins(&self) -> &BTreeSet<String> {
        &self.excluded_bins
    }

    /// True once the draft differs from the last optimizer result.
    pub fn is_adjusted(&self) -> bool {
        self.adjusted
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    /// Reordering is only allowed in edit mode.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    /// Assigns the collector saved with the route unless the schedule form
    /// names one.
    pub fn set_collector(&mut self, collector_id: Option<String>) -> Result<(), RouteError> {
        self.ensure_idle()?;
        self.draft.collector_id = collector_id;
        Ok(())
    }

    /// Moves the stop at `source` to `destination`.
    ///
    /// Does nothing outside edit mode or when both indices are equal.
    pub fn reorder(&mut self, source: usize, destination: usize) -> Result<(), RouteError> {
        self.ensure_idle()?;
        if !self.edit_mode || source == destination {
            return Ok(());
        }

        let len = self.draft.len();
        for index in [source, destination] {
            if index >= len {
                return Err(RouteError::StopOutOfRange { index, len });
            }
        }

        let stop = self.draft.stops.remove(source);
        debug!(stop = %stop.id, source, destination, "reordering stop");
        self.draft.stops.insert(destination, stop);
        self.touch();
        Ok(())
    }

    /// Removes `bin_id` from the route and keeps it out of reoptimization.
    ///
    /// Waypoints are dropped outright instead of being recorded as excluded.
    pub fn exclude(&mut self, bin_id: &str) -> Result<(), RouteError> {
        self.ensure_idle()?;

        if self.draft.stop(bin_id).is_some_and(RouteStop::is_waypoint) {
            self.selected_bins.remove(bin_id);
            self.draft.stops.retain(|stop| stop.id != bin_id);
            debug!(waypoint = bin_id, "removed waypoint");
            self.touch();
            return Ok(());
        }

        if self.area.bin(bin_id).is_none() && !self.draft.contains(bin_id) {
            return Err(RouteError::UnknownBin(bin_id.to_string()));
        }

        self.selected_bins.remove(bin_id);
        self.excluded_bins.insert(bin_id.to_string());
        self.draft.stops.retain(|stop| stop.id != bin_id);
        debug!(bin = bin_id, "excluded bin");
        self.touch();
        Ok(())
    }

    /// Puts `bin_id` back into the route.
    ///
    /// Clears any exclusion; the bin is only force-selected when the route
    /// filters would not pick it up on their own. An excluded stop the area
    /// does not know comes back as a placeholder.
    pub fn include(&mut self, bin_id: &str) -> Result<(), RouteError> {
        self.ensure_idle()?;
        let Some(bin) = self.area.bin(bin_id) else {
            if !self.excluded_bins.remove(bin_id) {
                return Err(RouteError::UnknownBin(bin_id.to_string()));
            }
            self.draft.stops.push(RouteStop::placeholder(bin_id));
            debug!(bin = bin_id, "restored unresolved stop");
            self.touch();
            return Ok(());
        };

        self.excluded_bins.remove(bin_id);
        if !self.filters.qualifies(bin) {
            self.selected_bins.insert(bin_id.to_string());
        }
        if !self.draft.contains(bin_id) {
            self.draft.stops.push(RouteStop::from_bin(bin));
        }
        debug!(bin = bin_id, "included bin");
        self.touch();
        Ok(())
    }

    /// Flips the membership of `bin_id`.
    ///
    /// Excluded bins are included, force-selected bins are deselected, bins
    /// on the route are excluded and anything else is included.
    pub fn toggle(&mut self, bin_id: &str) -> Result<(), RouteError> {
        if self.excluded_bins.contains(bin_id) {
            return self.include(bin_id);
        }

        let is_waypoint = self.draft.stop(bin_id).is_some_and(RouteStop::is_waypoint);
        if self.selected_bins.contains(bin_id) && !is_waypoint {
            self.ensure_idle()?;
            self.selected_bins.remove(bin_id);
            self.draft.stops.retain(|stop| stop.id != bin_id);
            debug!(bin = bin_id, "deselected bin");
            self.touch();
            return Ok(());
        }

        if self.draft.contains(bin_id) {
            self.exclude(bin_id)
        } else {
            self.include(bin_id)
        }
    }

    /// Appends a free-form stop at `lat`/`lng`, both given as operator text.
    ///
    /// Returns the new waypoint's id. Invalid input leaves the draft as is.
    pub fn add_waypoint(&mut self, lat: &str, lng: &str) -> Result<String, RouteError> {
        self.ensure_idle()?;
        let coordinates = parse_waypoint(lat, lng)?;

        let id = loop {
            self.waypoint_counter += 1;
            let candidate = format!("{}{}", WAYPOINT_PREFIX, self.waypoint_counter);
            if self.area.bin(&candidate).is_none() && !self.draft.contains(&candidate) {
                break candidate;
            }
        };

        self.draft
            .stops
            .push(RouteStop::waypoint(id.clone(), coordinates));
        self.selected_bins.insert(id.clone());
        debug!(waypoint = %id, lat = coordinates.lat, lng = coordinates.lng, "added waypoint");
        self.touch();
        Ok(id)
    }

    /// Builds the adjust request for the current draft and marks it pending.
    pub fn begin_reoptimization(&mut self) -> Result<AdjustRouteRequest, RouteError> {
        self.ensure_idle()?;

        let request = AdjustRouteRequest {
            area_id: self.draft.area_id.clone(),
            existing_route: ExistingRoute {
                distance: self.draft.total_distance,
                duration: self.draft.estimated_duration,
                route: self.draft.polyline.clone(),
                bin_sequence: self.draft.bin_sequence(),
            },
            include_bins: self.selected_bins.iter().cloned().collect(),
            exclude_bins: self.excluded_bins.iter().cloned().collect(),
            bin_order: self.draft.stop_ids(),
        };
        self.request_state = RequestState::Pending;
        Ok(request)
    }

    /// Applies the outcome of a pending reoptimization.
    ///
    /// A failure leaves the draft exactly as it was.
    pub fn complete_reoptimization(
        &mut self,
        result: Result<OptimizedRoute, ApiError>,
    ) -> Result<(), RouteError> {
        if self.request_state != RequestState::Pending {
            return Err(RouteError::NoRequestPending);
        }
        self.request_state = RequestState::Idle;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(area_id = %self.draft.area_id, error = %err, "route reoptimization failed");
                return Err(err.into());
            }
        };

        let waypoints: Vec<RouteStop> = self.draft.waypoints().cloned().collect();
        let sequence: Vec<String> = response
            .bin_sequence
            .iter()
            .filter(|id| !self.excluded_bins.contains(*id))
            .cloned()
            .collect();
        if sequence.len() != response.bin_sequence.len() {
            warn!(
                dropped = response.bin_sequence.len() - sequence.len(),
                "optimizer returned excluded bins; dropping them"
            );
        }

        let mut stops = resolve_stops(&self.area, &waypoints, &sequence);
        for waypoint in waypoints {
            if !stops.iter().any(|stop| stop.id == waypoint.id) {
                stops.push(waypoint);
            }
        }

        self.draft.stops = stops;
        apply_metrics(&mut self.draft, &response);
        self.draft.renumber();
        self.adjusted = false;

        info!(
            area_id = %self.draft.area_id,
            stops = self.draft.len(),
            distance_km = self.draft.total_distance,
            duration_min = self.draft.estimated_duration,
            "route reoptimized"
        );
        Ok(())
    }

    /// Sends the current overrides to the optimizer and applies the result.
    pub fn reoptimize<B: RouteBackend>(&mut self, backend: &B) -> Result<(), RouteError> {
        let request = self.begin_reoptimization()?;
        let result = backend.adjust_route(&request);
        self.complete_reoptimization(result)
    }

    /// Restores the draft as first materialized and clears every override.
    pub fn reset_to_original(&mut self) -> Result<(), RouteError> {
        self.ensure_idle()?;
        self.draft = self.original.clone();
        self.selected_bins.clear();
        self.excluded_bins.clear();
        self.adjusted = false;
        debug!(area_id = %self.draft.area_id, "route reset");
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), RouteError> {
        match self.request_state {
            RequestState::Idle => Ok(()),
            RequestState::Pending => Err(RouteError::RequestPending),
        }
    }

    fn touch(&mut self) {
        self.adjusted = true;
        self.draft.renumber();
    }
}

/// Parses operator-entered coordinates.
pub fn parse_waypoint(lat: &str, lng: &str) -> Result<Coordinates, RouteError> {
    let lat = parse_degrees(lat, "latitude", 90.0)?;
    let lng = parse_degrees(lng, "longitude", 180.0)?;
    Ok(Coordinates::new(lng, lat))
}

fn parse_degrees(text: &str, name: &str, limit: f64) -> Result<f64, RouteError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| RouteError::InvalidCoordinates(format!("{} '{}' is not a number", name, text)))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(RouteError::InvalidCoordinates(format!(
            "{} must be between -{} and {}",
            name, limit, limit
        )));
    }
    Ok(value)
}
