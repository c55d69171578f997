//! Persisted UI session snapshot
//!
//! The snapshot is read back by a different process than the one that wrote
//! it, possibly an older or newer build, so every field deserializes
//! leniently: a malformed field becomes its empty value instead of failing
//! the whole snapshot. Field-level validation against the live well happens
//! in the controller's restore mode.

use crate::api::WellId;
use crate::session::activity::ActivityEntry;
use crate::session::controller::{RestoreRequest, WellSessionController};
use crate::session::selection::Tab;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Longest serialized interpretation that is still persisted
pub const INTERPRETATION_MAX_CHARS: usize = 250_000;

/// UI session state written after every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSessionSnapshot {
    #[serde(default, deserialize_with = "lenient_value")]
    pub selected_well_id: Option<WellId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub selected_curves: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub depth_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub depth_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub chart_curves: Vec<String>,
    #[serde(default)]
    pub interpretation: Option<Value>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub active_tab: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub logs: Vec<ActivityEntry>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub updated_at: Option<String>,
}

impl UiSessionSnapshot {
    /// Capture the controller's current state
    ///
    /// An interpretation above [`INTERPRETATION_MAX_CHARS`] is written as
    /// `null`; the controller keeps its in-memory copy.
    pub fn capture(controller: &WellSessionController) -> Self {
        let selection = controller.selection();
        Self {
            selected_well_id: selection.selected_well_id,
            selected_curves: selection.selected_curves.iter().cloned().collect(),
            depth_min: selection.depth_min,
            depth_max: selection.depth_max,
            chart_curves: controller.chart_curves().to_vec(),
            interpretation: controller.interpretation().and_then(persistable_interpretation),
            active_tab: Some(selection.active_tab.as_str().to_string()),
            logs: controller.activity().to_vec(),
            updated_at: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Fields handed to the controller's restore mode
    pub fn restore_request(&self) -> RestoreRequest {
        RestoreRequest {
            curves: self.selected_curves.clone(),
            depth_min: self.depth_min,
            depth_max: self.depth_max,
            chart_curves: self.chart_curves.clone(),
            interpretation: self.interpretation.clone(),
            tab: self
                .active_tab
                .as_deref()
                .and_then(|t| Tab::parse_str(t).ok()),
        }
    }
}

/// The interpretation as it should be persisted, or `None` when too large
pub fn persistable_interpretation(value: &Value) -> Option<Value> {
    let serialized = serde_json::to_string(value).ok()?;
    let chars = serialized.chars().count();
    if chars > INTERPRETATION_MAX_CHARS {
        tracing::warn!(
            chars,
            "Interpretation too large to persist, keeping it in memory only"
        );
        return None;
    }
    Some(value.clone())
}

fn lenient_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_oversized_interpretation_is_not_persistable() {
        let big = json!({ "summary": "x".repeat(300_000) });
        assert!(persistable_interpretation(&big).is_none());

        let small = json!({ "summary": "gas show at 9100 ft" });
        assert_eq!(persistable_interpretation(&small), Some(small.clone()));
    }

    #[test]
    fn test_lenient_fields_tolerate_garbage() {
        let snapshot: UiSessionSnapshot = serde_json::from_value(json!({
            "selected_well_id": "five",
            "selected_curves": ["HC1", 7, "HC2"],
            "depth_min": "deep",
            "depth_max": 2000.0,
            "chart_curves": "HC1",
            "active_tab": 3,
            "logs": [
                {"time": "2025-01-01T00:00:00Z", "msg": "ok", "type": "info"},
                {"broken": true}
            ]
        }))
        .unwrap();

        assert_eq!(snapshot.selected_well_id, None);
        assert_eq!(snapshot.selected_curves, vec!["HC1", "HC2"]);
        assert_eq!(snapshot.depth_min, None);
        assert_eq!(snapshot.depth_max, Some(2000.0));
        assert!(snapshot.chart_curves.is_empty());
        assert!(snapshot.active_tab.is_none());
        assert_eq!(snapshot.logs.len(), 1);
    }

    #[test]
    fn test_empty_object_is_default_snapshot() {
        let snapshot: UiSessionSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, UiSessionSnapshot::default());
    }

    #[test]
    fn test_restore_request_parses_tab() {
        let snapshot = UiSessionSnapshot {
            active_tab: Some("interpretation".to_string()),
            ..Default::default()
        };
        assert_eq!(snapshot.restore_request().tab, Some(Tab::Interpretation));

        let snapshot = UiSessionSnapshot {
            active_tab: Some("bogus".to_string()),
            ..Default::default()
        };
        assert_eq!(snapshot.restore_request().tab, None);
    }
}
