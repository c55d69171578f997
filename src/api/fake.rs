//! In-process fake backend for unit and integration tests
//!
//! [`FakeWellApi`] implements [`WellApi`] over an in-memory well list,
//! records every call it receives, and can be scripted to fail specific
//! calls.
//!
//! # Example
//!
//! ```
//! use wellscope::api::fake::{sample_well, FakeCall, FakeWellApi};
//! use wellscope::api::WellApi;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let api = FakeWellApi::new().with_well(sample_well(1, "Alpha-1", &["HC1", "HC2"]));
//! api.fail_on(FakeCall::GetWell(1));
//!
//! assert_eq!(api.list_wells().await.unwrap().len(), 1);
//! assert!(api.get_well(1).await.is_err());
//! assert_eq!(api.calls(), vec![FakeCall::ListWells, FakeCall::GetWell(1)]);
//! # }
//! ```

use crate::api::{
    ChartData, ChatReply, ChatRequest, CurveInfo, DepthRange, DepthRecord, HealthStatus,
    InterpretationResponse, UploadProgress, UploadResponse, WellApi, WellDetail, WellId,
    WellSummary,
};
use crate::error::{Result, WellscopeError};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A call received by the fake, also used to script failures
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FakeCall {
    Health,
    ListWells,
    GetWell(WellId),
    GetData(WellId),
    DeleteWell(WellId),
    Interpret(WellId),
    Chat,
    Upload,
}

#[derive(Default)]
struct FakeState {
    wells: Vec<WellDetail>,
    failing: HashSet<FakeCall>,
    calls: Vec<FakeCall>,
    chat_requests: Vec<ChatRequest>,
    chat_reply: Option<String>,
    interpretation: Option<Value>,
    upload_well: Option<WellDetail>,
}

/// Scriptable in-memory [`WellApi`]
#[derive(Default)]
pub struct FakeWellApi {
    state: Mutex<FakeState>,
}

/// A well with the given curves spanning 1000-2000 ft
pub fn sample_well(id: WellId, name: &str, curves: &[&str]) -> WellDetail {
    WellDetail {
        id,
        well_name: name.to_string(),
        original_filename: format!("{}.las", name.to_lowercase()),
        start_depth: 1000.0,
        stop_depth: 2000.0,
        depth_unit: "F".to_string(),
        curves: curves
            .iter()
            .map(|m| CurveInfo {
                mnemonic: m.to_string(),
                unit: None,
                description: None,
                category: None,
            })
            .collect(),
        step: Some(1.0),
        null_value: Some(-999.25),
        location: None,
        country: None,
        company: None,
        field: None,
        service_company: None,
        date_analyzed: None,
        las_version: Some("2.0".to_string()),
        s3_key: None,
        uploaded_at: None,
    }
}

fn scripted_failure(call: &FakeCall) -> anyhow::Error {
    WellscopeError::Api {
        status: 500,
        detail: format!("scripted failure for {:?}", call),
    }
    .into()
}

fn not_found() -> anyhow::Error {
    WellscopeError::Api {
        status: 404,
        detail: "Well not found.".to_string(),
    }
    .into()
}

impl FakeWellApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a well to the backend's list
    pub fn with_well(self, well: WellDetail) -> Self {
        self.lock().wells.push(well);
        self
    }

    /// Make every future occurrence of `call` fail with a 500
    pub fn fail_on(&self, call: FakeCall) {
        self.lock().failing.insert(call);
    }

    /// Stop failing `call`
    pub fn recover(&self, call: &FakeCall) {
        self.lock().failing.remove(call);
    }

    /// Text returned by the chat endpoint
    pub fn set_chat_reply(&self, reply: impl Into<String>) {
        self.lock().chat_reply = Some(reply.into());
    }

    /// Payload returned by the interpretation endpoint
    pub fn set_interpretation(&self, interpretation: Value) {
        self.lock().interpretation = Some(interpretation);
    }

    /// Well created by the next upload
    pub fn set_upload_well(&self, well: WellDetail) {
        self.lock().upload_well = Some(well);
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Chat requests received so far, in order
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// Ids of the wells currently held
    pub fn well_ids(&self) -> Vec<WellId> {
        self.lock().wells.iter().map(|w| w.id).collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // a panicking test thread must not hide the state from the others
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record `call` and fail it when scripted to
    fn enter(&self, call: FakeCall) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.calls.push(call.clone());
        if state.failing.contains(&call) {
            return Err(scripted_failure(&call));
        }
        Ok(state)
    }
}

fn summary_of(well: &WellDetail) -> WellSummary {
    WellSummary {
        id: well.id,
        well_name: well.well_name.clone(),
        original_filename: well.original_filename.clone(),
        start_depth: well.start_depth,
        stop_depth: well.stop_depth,
        depth_unit: well.depth_unit.clone(),
        location: well.location.clone(),
        country: well.country.clone(),
        uploaded_at: well.uploaded_at.clone(),
        curve_count: Some(well.curves.len()),
    }
}

#[async_trait]
impl WellApi for FakeWellApi {
    async fn health(&self) -> Result<HealthStatus> {
        self.enter(FakeCall::Health)?;
        Ok(HealthStatus {
            status: "ok".to_string(),
            database: Some("connected".to_string()),
            s3: Some("not configured".to_string()),
        })
    }

    async fn list_wells(&self) -> Result<Vec<WellSummary>> {
        let state = self.enter(FakeCall::ListWells)?;
        Ok(state.wells.iter().map(summary_of).collect())
    }

    async fn get_well(&self, id: WellId) -> Result<WellDetail> {
        let state = self.enter(FakeCall::GetWell(id))?;
        state
            .wells
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_data(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: Option<f64>,
        depth_max: Option<f64>,
    ) -> Result<ChartData> {
        let state = self.enter(FakeCall::GetData(id))?;
        let well = state.wells.iter().find(|w| w.id == id).ok_or_else(not_found)?;
        let min = depth_min.unwrap_or(well.start_depth);
        let max = depth_max.unwrap_or(well.stop_depth);

        let data: Vec<DepthRecord> = [min, (min + max) / 2.0, max]
            .iter()
            .enumerate()
            .map(|(i, depth)| {
                let mut record = DepthRecord::new();
                record.insert("depth".to_string(), json!(depth));
                for curve in curves {
                    record.insert(curve.clone(), json!(i as f64 + 1.0));
                }
                record
            })
            .collect();

        Ok(ChartData {
            well_id: well.id,
            well_name: well.well_name.clone(),
            depth_range: DepthRange {
                min,
                max,
                unit: Some(well.depth_unit.clone()),
            },
            curves: curves.to_vec(),
            data,
        })
    }

    async fn delete_well(&self, id: WellId) -> Result<()> {
        let mut state = self.enter(FakeCall::DeleteWell(id))?;
        let before = state.wells.len();
        state.wells.retain(|w| w.id != id);
        if state.wells.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn interpret(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: f64,
        depth_max: f64,
    ) -> Result<InterpretationResponse> {
        let state = self.enter(FakeCall::Interpret(id))?;
        let well = state.wells.iter().find(|w| w.id == id).ok_or_else(not_found)?;
        let interpretation = state.interpretation.clone().unwrap_or_else(|| {
            json!({
                "summary": format!("Interpretation of {} curves", curves.len()),
                "zones": [],
            })
        });
        Ok(InterpretationResponse {
            well_id: well.id,
            well_name: well.well_name.clone(),
            depth_range: DepthRange {
                min: depth_min,
                max: depth_max,
                unit: Some(well.depth_unit.clone()),
            },
            curves_analyzed: curves.to_vec(),
            interpretation,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut state = self.enter(FakeCall::Chat)?;
        state.chat_requests.push(request.clone());
        let response = state
            .chat_reply
            .clone()
            .unwrap_or_else(|| format!("You asked: {}", request.message));
        Ok(ChatReply {
            response,
            well_id: request.well_id,
        })
    }

    async fn upload(
        &self,
        path: &Path,
        progress: Option<UploadProgress>,
    ) -> Result<UploadResponse> {
        let mut state = self.enter(FakeCall::Upload)?;
        let well = state.upload_well.take().ok_or_else(|| WellscopeError::Api {
            status: 400,
            detail: format!("Cannot parse {}", path.display()),
        })?;
        if let Some(report) = progress {
            report(100, 100);
        }
        let response = UploadResponse {
            well_id: well.id,
            well_name: well.well_name.clone(),
            s3_key: None,
            curve_count: well.curves.len(),
            data_points: 3,
            depth_range: DepthRange {
                min: well.start_depth,
                max: well.stop_depth,
                unit: Some(well.depth_unit.clone()),
            },
            message: format!("Successfully uploaded and parsed '{}'.", well.original_filename),
        };
        state.wells.push(well);
        Ok(response)
    }
}
