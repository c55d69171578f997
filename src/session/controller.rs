//! Well session controller
//!
//! Owns everything that depends on the selected well: its detail, the curve
//! and depth selection, chart data, the interpretation payload, the active
//! tab, and the user-facing activity log and toasts.
//!
//! All operations take `&mut self`, so two actions never interleave and a
//! response can only ever be applied to the state that requested it.

use crate::api::{ChartData, HealthStatus, UploadProgress, WellApi, WellDetail, WellId, WellSummary};
use crate::error::{user_message_of, Result, WellscopeError};
use crate::session::activity::{ActivityKind, ActivityLog};
use crate::session::selection::{retain_available, DepthBounds, DepthEdit, SelectionState, Tab};
use crate::session::toast::{ToastKind, ToastNotifier};

use futures::future::join_all;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prior session fields to re-apply against a freshly loaded well
///
/// Every field is validated against the well before it is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreRequest {
    pub curves: Vec<String>,
    pub depth_min: Option<f64>,
    pub depth_max: Option<f64>,
    pub chart_curves: Vec<String>,
    pub interpretation: Option<Value>,
    pub tab: Option<Tab>,
}

/// How [`WellSessionController::select_well`] treats existing state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectMode {
    /// Drop everything tied to the previous well
    #[default]
    Fresh,
    /// Re-apply a prior session to the well
    Restore(RestoreRequest),
}

/// Options for a well selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub mode: SelectMode,
    /// Suppress info and success log entries and toasts
    pub silent: bool,
}

impl SelectOptions {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn restore(request: RestoreRequest) -> Self {
        Self {
            mode: SelectMode::Restore(request),
            silent: false,
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn preserve_selections(&self) -> bool {
        matches!(self.mode, SelectMode::Restore(_))
    }
}

/// Result of a bulk delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub deleted: usize,
    pub failed: usize,
}

/// Session state for the selected well
pub struct WellSessionController {
    api: Arc<dyn WellApi>,
    wells: Vec<WellSummary>,
    selection: SelectionState,
    well_detail: Option<WellDetail>,
    chart: Option<ChartData>,
    chart_curves: Vec<String>,
    interpretation: Option<Value>,
    activity: ActivityLog,
    toasts: ToastNotifier,
}

impl std::fmt::Debug for WellSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WellSessionController")
            .field("wells", &self.wells.len())
            .field("selection", &self.selection)
            .field("chart_curves", &self.chart_curves)
            .field("has_interpretation", &self.interpretation.is_some())
            .finish()
    }
}

impl WellSessionController {
    /// Creates a controller with an empty session
    ///
    /// # Arguments
    ///
    /// * `api` - Backend the controller issues requests against
    /// * `toasts` - Toast slot shared with whatever renders the session
    pub fn new(api: Arc<dyn WellApi>, toasts: ToastNotifier) -> Self {
        Self {
            api,
            wells: Vec::new(),
            selection: SelectionState::default(),
            well_detail: None,
            chart: None,
            chart_curves: Vec::new(),
            interpretation: None,
            activity: ActivityLog::new(),
            toasts,
        }
    }

    pub fn api(&self) -> Arc<dyn WellApi> {
        Arc::clone(&self.api)
    }

    pub fn wells(&self) -> &[WellSummary] {
        &self.wells
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn well_detail(&self) -> Option<&WellDetail> {
        self.well_detail.as_ref()
    }

    pub fn chart(&self) -> Option<&ChartData> {
        self.chart.as_ref()
    }

    /// Curves of the last successful chart load
    pub fn chart_curves(&self) -> &[String] {
        &self.chart_curves
    }

    pub fn interpretation(&self) -> Option<&Value> {
        self.interpretation.as_ref()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn activity_mut(&mut self) -> &mut ActivityLog {
        &mut self.activity
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }

    /// Bounds of the loaded well
    pub fn bounds(&self) -> Option<DepthBounds> {
        self.well_detail.as_ref().map(WellDetail::bounds)
    }

    /// Re-fetch the well list
    ///
    /// # Errors
    ///
    /// Returns the backend error after toasting it; the list is left unchanged.
    pub async fn refresh_wells(&mut self) -> Result<()> {
        match self.api.list_wells().await {
            Ok(wells) => {
                debug!(count = wells.len(), "Well list loaded");
                self.wells = wells;
                Ok(())
            }
            Err(e) => {
                self.report_failure("Loading wells", &e);
                Err(e)
            }
        }
    }

    /// Select a well
    ///
    /// In fresh mode all dependent state is cleared before the detail request
    /// is issued. In restore mode the request's fields are validated against
    /// the fetched well and applied; chart data is then re-fetched if any
    /// chart curves survived, and a failure there only produces a warning.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the well detail cannot be loaded. The
    /// well stays selected with no detail.
    pub async fn select_well(&mut self, id: WellId, options: SelectOptions) -> Result<()> {
        let silent = options.silent;
        match options.mode {
            SelectMode::Fresh => self.select_fresh(id, silent).await,
            SelectMode::Restore(request) => self.select_restore(id, request, silent).await,
        }
    }

    async fn select_fresh(&mut self, id: WellId, silent: bool) -> Result<()> {
        self.clear_dependent_state();
        self.selection.selected_well_id = Some(id);
        self.selection.active_tab = Tab::Chart;
        match self.wells.iter().find(|w| w.id == id) {
            Some(summary) => self.selection.set_full_range(summary.bounds()),
            None => {
                self.selection.depth_min = None;
                self.selection.depth_max = None;
            }
        }

        let detail = match self.api.get_well(id).await {
            Ok(detail) => detail,
            Err(e) => {
                self.report_failure("Loading well", &e);
                return Err(e);
            }
        };

        self.selection.set_full_range(detail.bounds());
        self.note(
            silent,
            format!(
                "Well '{}' ready ({} curves)",
                detail.well_name,
                detail.curves.len()
            ),
            ActivityKind::Success,
        );
        self.well_detail = Some(detail);
        Ok(())
    }

    async fn select_restore(
        &mut self,
        id: WellId,
        request: RestoreRequest,
        silent: bool,
    ) -> Result<()> {
        self.selection.selected_well_id = Some(id);
        self.well_detail = None;

        let detail = match self.api.get_well(id).await {
            Ok(detail) => detail,
            Err(e) => {
                self.report_failure("Restoring well", &e);
                self.reset_session();
                return Err(e);
            }
        };

        self.selection
            .set_curves(retain_available(&request.curves, &detail));
        let (min, max) = detail.bounds().restore(request.depth_min, request.depth_max);
        self.selection.depth_min = Some(min);
        self.selection.depth_max = Some(max);
        self.chart_curves = retain_available(&request.chart_curves, &detail);
        self.chart = None;
        self.interpretation = request.interpretation.filter(Value::is_object);
        self.selection.active_tab = request.tab.unwrap_or_default();
        info!(
            well = id,
            curves = self.selection.selected_curves.len(),
            chart_curves = self.chart_curves.len(),
            "Restored selection"
        );
        let name = detail.well_name.clone();
        self.well_detail = Some(detail);

        if !self.chart_curves.is_empty() {
            match self
                .api
                .get_data(id, &self.chart_curves, Some(min), Some(max))
                .await
            {
                Ok(chart) => self.chart = Some(chart),
                Err(e) => {
                    warn!(well = id, error = %e, "Chart restore failed");
                    self.chart_curves.clear();
                    self.activity.append(
                        format!("Could not restore chart: {}", user_message_of(&e)),
                        ActivityKind::Warning,
                    );
                }
            }
        }

        self.note(silent, format!("Restored session for '{}'", name), ActivityKind::Info);
        Ok(())
    }

    /// Replace the curve selection, keeping only curves of the loaded well
    pub fn set_curves<S: AsRef<str>>(&mut self, curves: &[S]) {
        match &self.well_detail {
            Some(detail) => self.selection.set_curves(retain_available(curves, detail)),
            None => self
                .selection
                .set_curves(curves.iter().map(|c| c.as_ref().to_string())),
        }
    }

    /// Toggle one curve; returns whether it is now selected
    pub fn toggle_curve(&mut self, mnemonic: &str) -> bool {
        if let Some(detail) = &self.well_detail {
            if !detail.has_curve(mnemonic) {
                self.toasts
                    .show(format!("Curve {} is not in this well", mnemonic), ToastKind::Warning);
                return false;
            }
        }
        self.selection.toggle_curve(mnemonic)
    }

    /// Apply a named preset filtered to the loaded well
    ///
    /// Returns the number of curves selected; unknown names change nothing.
    pub fn apply_preset(&mut self, name: &str) -> Option<usize> {
        let mut scratch = self.selection.clone();
        if !scratch.apply_preset(name) {
            self.toasts
                .show(format!("Unknown preset '{}'", name), ToastKind::Warning);
            return None;
        }
        let curves: Vec<String> = scratch.selected_curves.into_iter().collect();
        self.set_curves(&curves);
        Some(self.selection.selected_curves.len())
    }

    /// Apply a depth window typed by the user
    pub fn set_depth_range(&mut self, raw_min: &str, raw_max: &str) -> DepthEdit {
        let bounds = self.bounds();
        let edit = self.selection.set_depth_range(raw_min, raw_max, bounds);
        if edit == DepthEdit::Rejected {
            self.toasts
                .show("Depth range must start above where it ends", ToastKind::Warning);
        }
        edit
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.selection.active_tab = tab;
    }

    /// Fetch chart data for the selected curves over the current window
    ///
    /// # Errors
    ///
    /// Returns `WellscopeError::Validation` without issuing a request when no
    /// well is loaded or no curve is selected, or the backend error. The
    /// previous chart is kept on failure.
    pub async fn load_chart(&mut self) -> Result<()> {
        let Some(id) = self.loaded_well_id() else {
            return Err(self.refuse("Select a well first"));
        };
        if self.selection.selected_curves.is_empty() {
            return Err(self.refuse("Select at least one curve to chart"));
        }

        let curves: Vec<String> = self.selection.selected_curves.iter().cloned().collect();
        let (min, max) = match self.selection.depth_range() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        match self.api.get_data(id, &curves, min, max).await {
            Ok(chart) => {
                let points = chart.point_count();
                self.chart = Some(chart);
                self.chart_curves = curves;
                self.selection.active_tab = Tab::Chart;
                self.announce(
                    format!("Loaded {} curves ({} depth points)", self.chart_curves.len(), points),
                    ActivityKind::Success,
                );
                Ok(())
            }
            Err(e) => {
                self.report_failure("Loading chart", &e);
                Err(e)
            }
        }
    }

    /// Request an interpretation of the selected curves over the current window
    ///
    /// # Errors
    ///
    /// Returns `WellscopeError::Validation` when the well, curves or depth
    /// window are missing, or the backend error.
    pub async fn interpret(&mut self) -> Result<()> {
        let Some(id) = self.loaded_well_id() else {
            return Err(self.refuse("Select a well first"));
        };
        if self.selection.selected_curves.is_empty() {
            return Err(self.refuse("Select at least one curve to interpret"));
        }
        let Some((min, max)) = self.selection.depth_range() else {
            return Err(self.refuse("Set a depth range first"));
        };

        let curves: Vec<String> = self.selection.selected_curves.iter().cloned().collect();
        self.note(false, "Running interpretation...", ActivityKind::Info);
        match self.api.interpret(id, &curves, min, max).await {
            Ok(response) => {
                self.interpretation = Some(response.interpretation);
                self.selection.active_tab = Tab::Interpretation;
                self.announce(
                    format!("Interpretation ready for {} curves", response.curves_analyzed.len()),
                    ActivityKind::Success,
                );
                Ok(())
            }
            Err(e) => {
                self.report_failure("Interpretation", &e);
                Err(e)
            }
        }
    }

    /// Upload a LAS file, refresh the list and select the new well
    ///
    /// # Errors
    ///
    /// Returns the upload error. Errors from the follow-up list refresh and
    /// selection are reported through toasts only.
    pub async fn upload(&mut self, path: &Path, progress: Option<UploadProgress>) -> Result<WellId> {
        self.note(false, format!("Uploading {}...", path.display()), ActivityKind::Info);
        let response = match self.api.upload(path, progress).await {
            Ok(response) => response,
            Err(e) => {
                self.report_failure("Upload", &e);
                return Err(e);
            }
        };

        self.announce(response.message.clone(), ActivityKind::Success);
        let _ = self.refresh_wells().await;
        let _ = self.select_well(response.well_id, SelectOptions::fresh()).await;
        Ok(response.well_id)
    }

    /// Delete a well and refresh the list
    ///
    /// Session state is cleared only when the deleted well is the selected one.
    pub async fn delete_well(&mut self, id: WellId) -> Result<()> {
        if let Err(e) = self.api.delete_well(id).await {
            self.report_failure("Delete", &e);
            return Err(e);
        }

        if self.selection.selected_well_id == Some(id) {
            self.reset_session();
        }
        self.announce(format!("Deleted well {}", id), ActivityKind::Success);
        let _ = self.refresh_wells().await;
        Ok(())
    }

    /// Delete every known well concurrently, then reset the whole session
    ///
    /// Individual delete failures are logged and otherwise ignored.
    pub async fn clear_all(&mut self) -> ClearSummary {
        let ids: Vec<WellId> = self.wells.iter().map(|w| w.id).collect();
        let api = &self.api;
        let results = join_all(ids.iter().map(|id| api.delete_well(*id))).await;

        let mut summary = ClearSummary::default();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    warn!(well = id, error = %e, "Delete failed during clear all");
                    summary.failed += 1;
                }
            }
        }

        self.reset_session();
        self.wells.clear();
        self.announce(
            format!("Cleared {} wells", summary.deleted),
            ActivityKind::Success,
        );
        summary
    }

    /// Query backend health and toast the result
    pub async fn check_health(&mut self) -> Result<HealthStatus> {
        match self.api.health().await {
            Ok(status) => {
                let kind = if status.is_ok() {
                    ActivityKind::Success
                } else {
                    ActivityKind::Warning
                };
                self.announce(
                    format!(
                        "Backend {} (database: {}, s3: {})",
                        status.status,
                        status.database.as_deref().unwrap_or("unknown"),
                        status.s3.as_deref().unwrap_or("unknown")
                    ),
                    kind,
                );
                Ok(status)
            }
            Err(e) => {
                self.report_failure("Health check", &e);
                Err(e)
            }
        }
    }

    /// Forget the selected well and everything tied to it
    ///
    /// The activity log and the well list are kept.
    pub fn reset_session(&mut self) {
        self.clear_dependent_state();
        self.selection = SelectionState::default();
    }

    fn clear_dependent_state(&mut self) {
        self.well_detail = None;
        self.chart = None;
        self.chart_curves.clear();
        self.interpretation = None;
        self.selection.selected_curves.clear();
    }

    fn loaded_well_id(&self) -> Option<WellId> {
        self.well_detail.as_ref().map(|w| w.id)
    }

    fn refuse(&mut self, message: &str) -> anyhow::Error {
        self.toasts.show(message, ToastKind::Warning);
        WellscopeError::Validation(message.to_string()).into()
    }

    fn report_failure(&mut self, what: &str, err: &anyhow::Error) {
        let message = format!("{} failed: {}", what, user_message_of(err));
        self.toasts.show(message.clone(), ToastKind::Error);
        self.activity.append(message, ActivityKind::Error);
    }

    /// Log entry only; info and success entries are dropped when silent
    fn note(&mut self, silent: bool, message: impl Into<String>, kind: ActivityKind) {
        if silent && matches!(kind, ActivityKind::Info | ActivityKind::Success) {
            return;
        }
        self.activity.append(message, kind);
    }

    /// Log entry plus matching toast
    fn announce(&mut self, message: String, kind: ActivityKind) {
        let toast_kind = match kind {
            ActivityKind::Info => ToastKind::Info,
            ActivityKind::Success => ToastKind::Success,
            ActivityKind::Warning => ToastKind::Warning,
            ActivityKind::Error => ToastKind::Error,
        };
        self.toasts.show(message.clone(), toast_kind);
        self.activity.append(message, kind);
    }
}
