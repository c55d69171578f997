//! Backend REST boundary
//!
//! This module contains the wire types exchanged with the well-log backend
//! and the [`WellApi`] abstraction the session core is written against.
//! [`HttpWellApi`] is the reqwest implementation used by the binary.

pub mod fake;
pub mod http;

pub use http::HttpWellApi;

use crate::error::Result;
use crate::session::selection::DepthBounds;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Identifier the backend assigns to an uploaded well
pub type WellId = i64;

/// One depth-indexed row of chart data: `{"depth": 8665.0, "HC1": 279.03, ...}`
pub type DepthRecord = serde_json::Map<String, serde_json::Value>;

/// Callback receiving `(bytes_sent, bytes_total)` while a file uploads
pub type UploadProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A measurement channel available on a well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveInfo {
    /// Curve mnemonic, e.g. `HC1` or `TOTAL_GAS`
    pub mnemonic: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Backend-assigned grouping such as `Hydrocarbons` or `Ratios`
    #[serde(default)]
    pub category: Option<String>,
}

/// Entry of the well list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellSummary {
    pub id: WellId,
    pub well_name: String,
    pub original_filename: String,
    pub start_depth: f64,
    pub stop_depth: f64,
    pub depth_unit: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub curve_count: Option<usize>,
}

impl WellSummary {
    /// Full depth interval of the well
    pub fn bounds(&self) -> DepthBounds {
        DepthBounds::new(self.start_depth, self.stop_depth)
    }
}

/// Full well metadata including its curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellDetail {
    pub id: WellId,
    pub well_name: String,
    pub original_filename: String,
    pub start_depth: f64,
    pub stop_depth: f64,
    pub depth_unit: String,
    #[serde(default)]
    pub curves: Vec<CurveInfo>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub null_value: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub service_company: Option<String>,
    #[serde(default)]
    pub date_analyzed: Option<String>,
    #[serde(default)]
    pub las_version: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

impl WellDetail {
    /// Full depth interval of the well
    pub fn bounds(&self) -> DepthBounds {
        DepthBounds::new(self.start_depth, self.stop_depth)
    }

    /// Whether the well carries a curve with this mnemonic
    pub fn has_curve(&self, mnemonic: &str) -> bool {
        self.curves.iter().any(|c| c.mnemonic == mnemonic)
    }

    /// Curve mnemonics in backend order
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.curves.iter().map(|c| c.mnemonic.as_str())
    }
}

/// Depth interval echoed back by data and interpretation responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Curve data for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub well_id: WellId,
    pub well_name: String,
    pub depth_range: DepthRange,
    /// Curves present in every record, in request order
    pub curves: Vec<String>,
    /// Records ordered by increasing depth
    pub data: Vec<DepthRecord>,
}

impl ChartData {
    /// Number of depth-indexed records
    pub fn point_count(&self) -> usize {
        self.data.len()
    }

    /// Numeric value of `curve` in record `index`; `None` for nulls
    pub fn value(&self, index: usize, curve: &str) -> Option<f64> {
        self.data.get(index)?.get(curve)?.as_f64()
    }
}

/// Result of the AI interpretation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationResponse {
    pub well_id: WellId,
    pub well_name: String,
    pub depth_range: DepthRange,
    #[serde(default)]
    pub curves_analyzed: Vec<String>,
    /// Opaque structured interpretation
    pub interpretation: serde_json::Value,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat message as stored and as sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Message typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Message produced by the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub well_id: WellId,
    pub message: String,
    pub history: Vec<ChatTurn>,
    pub curves: Vec<String>,
    pub depth_min: Option<f64>,
    pub depth_max: Option<f64>,
    pub detail_level: u8,
}

/// Answer of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub well_id: WellId,
}

/// Answer of `POST /wells/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub well_id: WellId,
    pub well_name: String,
    #[serde(default)]
    pub s3_key: Option<String>,
    pub curve_count: usize,
    pub data_points: usize,
    pub depth_range: DepthRange,
    pub message: String,
}

/// Answer of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub s3: Option<String>,
}

impl HealthStatus {
    /// Whether the backend reports itself healthy
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Well-log backend operations consumed by the session core
///
/// Every call is an independent unit of suspension; implementations must not
/// retry or cancel on their own.
#[async_trait]
pub trait WellApi: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /wells`
    async fn list_wells(&self) -> Result<Vec<WellSummary>>;

    /// `GET /wells/{id}`
    async fn get_well(&self, id: WellId) -> Result<WellDetail>;

    /// `GET /wells/{id}/data?curves=<csv>&depth_min=&depth_max=`
    async fn get_data(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: Option<f64>,
        depth_max: Option<f64>,
    ) -> Result<ChartData>;

    /// `DELETE /wells/{id}`
    async fn delete_well(&self, id: WellId) -> Result<()>;

    /// `POST /wells/{id}/interpret`
    async fn interpret(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: f64,
        depth_max: f64,
    ) -> Result<InterpretationResponse>;

    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// `POST /wells/upload`
    async fn upload(&self, path: &Path, progress: Option<UploadProgress>)
        -> Result<UploadResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_detail_deserializes_backend_payload() {
        let payload = json!({
            "id": 7,
            "well_name": "Alpha-1",
            "original_filename": "alpha.las",
            "s3_key": null,
            "start_depth": 8665.0,
            "stop_depth": 20035.0,
            "step": 1.0,
            "depth_unit": "F",
            "null_value": -999.25,
            "uploaded_at": "2025-01-01T00:00:00",
            "curves": [
                {"mnemonic": "HC1", "unit": "ppm", "description": null, "category": "Hydrocarbons"},
                {"mnemonic": "GR", "category": "Petrophysics"}
            ]
        });
        let detail: WellDetail = serde_json::from_value(payload).unwrap();
        assert_eq!(detail.id, 7);
        assert_eq!(detail.curves.len(), 2);
        assert!(detail.has_curve("GR"));
        assert!(!detail.has_curve("HC2"));
        assert_eq!(detail.mnemonics().collect::<Vec<_>>(), vec!["HC1", "GR"]);
        assert_eq!(detail.bounds(), DepthBounds::new(8665.0, 20035.0));
    }

    #[test]
    fn test_chart_data_value_lookup() {
        let chart: ChartData = serde_json::from_value(json!({
            "well_id": 1,
            "well_name": "Alpha-1",
            "depth_range": {"min": 100.0, "max": 101.0, "unit": "F"},
            "curves": ["HC1"],
            "data": [
                {"depth": 100.0, "HC1": 12.5},
                {"depth": 101.0, "HC1": null}
            ]
        }))
        .unwrap();
        assert_eq!(chart.point_count(), 2);
        assert_eq!(chart.value(0, "HC1"), Some(12.5));
        assert_eq!(chart.value(1, "HC1"), None);
        assert_eq!(chart.value(5, "HC1"), None);
    }

    #[test]
    fn test_chat_turn_serializes_lowercase_role() {
        let value = serde_json::to_value(ChatTurn::assistant("hi")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_health_status_is_ok() {
        let health: HealthStatus =
            serde_json::from_value(json!({"status": "ok", "database": "connected"})).unwrap();
        assert!(health.is_ok());
        assert!(health.s3.is_none());
    }
}
