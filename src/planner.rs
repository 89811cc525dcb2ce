//! End-to-end route building against a [`RouteBackend`].

use jiff::Timestamp;
use tracing::{error, info, warn};

use crate::editor::RouteEditor;
use crate::error::{ApiError, RouteError};
use crate::materialize::{MaterializeOptions, materialize};
use crate::model::Area;
use crate::request::{RouteFilters, build_request, mock_route};
use crate::schedule::{ScheduleForm, ScheduleRecord, save_schedule};
use crate::traits::RouteBackend;

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub materialize: MaterializeOptions,
    /// Synthesize a route locally when the optimizer fails. Off in release
    /// builds.
    pub allow_mock_fallback: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            materialize: MaterializeOptions::default(),
            allow_mock_fallback: cfg!(debug_assertions),
        }
    }
}

/// A freshly generated route, ready for editing.
#[derive(Debug)]
pub struct GeneratedRoute {
    pub editor: RouteEditor,
    /// Set when the optimizer failed and the route was synthesized locally.
    pub fallback_reason: Option<ApiError>,
}

impl GeneratedRoute {
    pub fn is_mock(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RoutePlanner<B> {
    backend: B,
    options: PlannerOptions,
}

impl<B: RouteBackend> RoutePlanner<B> {
    /// Creates a planner over `backend`.
    pub fn new(backend: B, options: PlannerOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Loads every area with its bins. Areas without a usable boundary are
    /// kept but logged.
    pub fn areas(&self) -> Result<Vec<Area>, RouteError> {
        let areas = self.backend.areas_with_bins().map_err(|err| {
            error!(error = %err, "failed to load areas");
            RouteError::from(err)
        })?;

        for area in areas.iter().filter(|area| !area.has_valid_boundary()) {
            warn!(area_id = %area.id, name = %area.name, "area boundary is missing or not a closed ring");
        }
        Ok(areas)
    }

    /// Requests an optimized route for `area` and materializes it.
    pub fn generate(
        &self,
        area: Option<&Area>,
        filters: &RouteFilters,
        schedule_start: Timestamp,
    ) -> Result<GeneratedRoute, RouteError> {
        let area = area.ok_or(RouteError::NoAreaSelected)?;
        let request = build_request(Some(area), filters)?;

        let (response, fallback_reason) = match self.backend.optimize_route(&request) {
            Ok(response) => (response, None),
            Err(err) if self.options.allow_mock_fallback => {
                warn!(area_id = %area.id, error = %err, "optimizer failed; using a locally synthesized route");
                (mock_route(area, &request), Some(err))
            }
            Err(err) => {
                error!(area_id = %area.id, error = %err, "optimizer failed");
                return Err(err.into());
            }
        };

        let draft = materialize(area, &response, schedule_start, &self.options.materialize);
        info!(
            area_id = %area.id,
            stops = draft.len(),
            mock = fallback_reason.is_some(),
            "route generated"
        );

        Ok(GeneratedRoute {
            editor: RouteEditor::new(area.clone(), filters.clone(), draft),
            fallback_reason,
        })
    }

    pub fn reoptimize(&self, editor: &mut RouteEditor) -> Result<(), RouteError> {
        editor.reoptimize(&self.backend)
    }

    pub fn save(&self, editor: &RouteEditor, form: &ScheduleForm) -> Result<ScheduleRecord, RouteError> {
        save_schedule(&self.backend, editor, form)
    }
}
