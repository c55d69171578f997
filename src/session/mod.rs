//! Dashboard session state
//!
//! - `selection`: curve, depth window and tab selection
//! - `controller`: the well session state machine
//! - `restore`: one-shot restoration of the previous session
//! - `snapshot`: the persisted shape of the session
//! - `activity` / `toast`: user-facing feedback

pub mod activity;
pub mod controller;
pub mod restore;
pub mod selection;
pub mod snapshot;
pub mod toast;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use controller::{ClearSummary, RestoreRequest, SelectMode, SelectOptions, WellSessionController};
pub use restore::{RestoreOutcome, RestorePhase, SessionRestorer};
pub use selection::{DepthBounds, DepthEdit, SelectionState, Tab};
pub use snapshot::UiSessionSnapshot;
pub use toast::{Toast, ToastKind, ToastNotifier};
