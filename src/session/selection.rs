//! Curve and depth selection state
//!
//! Tracks which curves are active, the depth window, and the visible tab.
//! Depth edits coming from text inputs fall back to the well bounds instead
//! of failing, and a window that is not strictly increasing is never stored.

use crate::api::{WellDetail, WellId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Named curve bundles offered by the curve picker
pub const CURVE_PRESETS: &[(&str, &[&str])] = &[
    ("gas", &["HC1", "HC2", "HC3", "HC4", "HC5", "TOTAL_GAS"]),
    (
        "ratios",
        &["HC2_HC1", "HC3_HC1", "HC5_HC3", "C3_C1", "C1_THC", "G_L"],
    ),
    ("aromatics", &["Benzene", "Toluene", "Xylene", "TotalArom"]),
    ("pixler", &["PIX1", "PIX2", "PIX3", "PIX4"]),
];

/// Curves of a named preset, if the name is known
///
/// # Examples
///
/// ```
/// use wellscope::session::selection::preset_curves;
///
/// assert!(preset_curves("gas").unwrap().contains(&"TOTAL_GAS"));
/// assert!(preset_curves("nope").is_none());
/// ```
pub fn preset_curves(name: &str) -> Option<&'static [&'static str]> {
    let name = name.trim().to_lowercase();
    CURVE_PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, curves)| *curves)
}

/// Dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Chart,
    Interpretation,
    Chat,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Tab {
    /// Parse a tab name
    ///
    /// # Examples
    ///
    /// ```
    /// use wellscope::session::selection::Tab;
    ///
    /// assert_eq!(Tab::parse_str("Chat").unwrap(), Tab::Chat);
    /// assert!(Tab::parse_str("settings").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "chart" => Ok(Self::Chart),
            "interpretation" => Ok(Self::Interpretation),
            "chat" => Ok(Self::Chat),
            other => Err(format!("Unknown tab: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Interpretation => "interpretation",
            Self::Chat => "chat",
        }
    }
}

/// Depth interval of a well, `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBounds {
    pub min: f64,
    pub max: f64,
}

impl DepthBounds {
    /// Bounds from two ends in any order
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// `max(min, min(x, max))`
    pub fn clamp(&self, x: f64) -> f64 {
        self.min.max(x.min(self.max))
    }

    /// Apply a previously saved window to these bounds
    ///
    /// Both ends are clamped; a missing end, or a clamped pair that is not
    /// strictly increasing, falls back to the full bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellscope::session::selection::DepthBounds;
    ///
    /// let well = DepthBounds::new(1000.0, 2000.0);
    /// assert_eq!(well.restore(Some(900.0), Some(1500.0)), (1000.0, 1500.0));
    /// assert_eq!(well.restore(Some(2500.0), Some(3000.0)), (1000.0, 2000.0));
    /// ```
    pub fn restore(&self, min: Option<f64>, max: Option<f64>) -> (f64, f64) {
        match (min, max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => {
                let (lo, hi) = (self.clamp(min), self.clamp(max));
                if lo < hi {
                    (lo, hi)
                } else {
                    (self.min, self.max)
                }
            }
            _ => (self.min, self.max),
        }
    }
}

/// Result of a depth edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthEdit {
    /// The window now spans `min..max`
    Applied { min: f64, max: f64 },
    /// The edit did not produce a strictly increasing window; nothing changed
    Rejected,
}

/// Parse a user-typed depth
pub fn parse_depth_input(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Keep the curves the well actually has, preserving input order, without duplicates
pub fn retain_available<S: AsRef<str>>(curves: &[S], well: &WellDetail) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for curve in curves {
        let curve = curve.as_ref();
        if well.has_curve(curve) && !kept.iter().any(|k| k == curve) {
            kept.push(curve.to_string());
        }
    }
    kept
}

/// Curve mnemonics grouped by backend category (`Other` when missing)
pub fn curves_by_category(well: &WellDetail) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for curve in &well.curves {
        let category = curve
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Other".to_string());
        groups.entry(category).or_default().push(curve.mnemonic.clone());
    }
    groups
}

/// User selections driving the chart, interpretation and chat scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_well_id: Option<WellId>,
    pub selected_curves: BTreeSet<String>,
    pub depth_min: Option<f64>,
    pub depth_max: Option<f64>,
    pub active_tab: Tab,
}

impl SelectionState {
    /// Replace the active curve set
    pub fn set_curves<I, S>(&mut self, next: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_curves = next.into_iter().map(Into::into).collect();
    }

    /// Add the curve if absent, remove it if present; returns whether it is now selected
    pub fn toggle_curve(&mut self, mnemonic: &str) -> bool {
        if self.selected_curves.remove(mnemonic) {
            false
        } else {
            self.selected_curves.insert(mnemonic.to_string());
            true
        }
    }

    /// Replace the curve set with a named preset; unknown names change nothing
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match preset_curves(name) {
            Some(curves) => {
                self.set_curves(curves.iter().copied());
                true
            }
            None => false,
        }
    }

    /// Set the window to the full well interval
    pub fn set_full_range(&mut self, bounds: DepthBounds) {
        self.depth_min = Some(bounds.min);
        self.depth_max = Some(bounds.max);
    }

    /// Apply a depth edit typed by the user
    ///
    /// Each side that does not parse falls back to the matching well bound.
    /// With bounds known, both sides are clamped into them. A window that is
    /// not strictly increasing is rejected and the previous one kept.
    pub fn set_depth_range(
        &mut self,
        raw_min: &str,
        raw_max: &str,
        bounds: Option<DepthBounds>,
    ) -> DepthEdit {
        let min = parse_depth_input(raw_min).or(bounds.map(|b| b.min));
        let max = parse_depth_input(raw_max).or(bounds.map(|b| b.max));

        let (min, max) = match (min, max, bounds) {
            (Some(min), Some(max), Some(b)) => (b.clamp(min), b.clamp(max)),
            (Some(min), Some(max), None) => (min, max),
            _ => return DepthEdit::Rejected,
        };

        if min >= max {
            return DepthEdit::Rejected;
        }

        self.depth_min = Some(min);
        self.depth_max = Some(max);
        DepthEdit::Applied { min, max }
    }

    /// The current window when both ends are set
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        Some((self.depth_min?, self.depth_max?))
    }
}
