//! One-shot session restoration
//!
//! Runs once after the first well list load and re-applies the persisted
//! UI snapshot. Persistence writes are only allowed once the restorer has
//! reached [`RestorePhase::Ready`], so a half-restored session is never
//! written over the snapshot it came from.

use crate::api::WellId;
use crate::session::controller::{SelectOptions, WellSessionController};
use crate::session::snapshot::UiSessionSnapshot;
use tracing::info;

/// Restoration progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestorePhase {
    #[default]
    NotStarted,
    Restoring,
    Ready,
}

/// What a restoration attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No snapshot, or no well selected in it
    NothingToRestore,
    /// The snapshot's well is not in the current list
    WellMissing(WellId),
    Restored(WellId),
    /// The well exists but could not be loaded
    Failed(WellId),
    /// Restoration already ran in this session
    AlreadyAttempted,
}

/// Drives the restore state machine
#[derive(Debug, Default)]
pub struct SessionRestorer {
    phase: RestorePhase,
}

impl SessionRestorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    /// Whether session writes may go to the store
    pub fn persistence_enabled(&self) -> bool {
        self.phase == RestorePhase::Ready
    }

    /// Re-apply `snapshot` to `controller`
    ///
    /// Must be called after the well list has loaded. Every path ends in
    /// [`RestorePhase::Ready`]; later calls return
    /// [`RestoreOutcome::AlreadyAttempted`] without touching the controller.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wellscope::api::fake::FakeWellApi;
    /// use wellscope::session::controller::WellSessionController;
    /// use wellscope::session::restore::{RestoreOutcome, SessionRestorer};
    /// use wellscope::session::toast::ToastNotifier;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut controller = WellSessionController::new(Arc::new(FakeWellApi::new()), ToastNotifier::new());
    /// let mut restorer = SessionRestorer::new();
    ///
    /// assert_eq!(restorer.run(None, &mut controller).await, RestoreOutcome::NothingToRestore);
    /// assert!(restorer.persistence_enabled());
    /// assert_eq!(restorer.run(None, &mut controller).await, RestoreOutcome::AlreadyAttempted);
    /// # }
    /// ```
    pub async fn run(
        &mut self,
        snapshot: Option<UiSessionSnapshot>,
        controller: &mut WellSessionController,
    ) -> RestoreOutcome {
        if self.phase != RestorePhase::NotStarted {
            return RestoreOutcome::AlreadyAttempted;
        }
        self.phase = RestorePhase::Restoring;
        let outcome = Self::restore(snapshot, controller).await;
        self.phase = RestorePhase::Ready;
        info!(?outcome, "Session restoration finished");
        outcome
    }

    async fn restore(
        snapshot: Option<UiSessionSnapshot>,
        controller: &mut WellSessionController,
    ) -> RestoreOutcome {
        let Some(snapshot) = snapshot else {
            return RestoreOutcome::NothingToRestore;
        };
        let Some(id) = snapshot.selected_well_id else {
            return RestoreOutcome::NothingToRestore;
        };

        if !snapshot.logs.is_empty() {
            controller.activity_mut().restore(snapshot.logs.clone());
        }

        if !controller.wells().iter().any(|w| w.id == id) {
            info!(well = id, "Saved well no longer exists");
            return RestoreOutcome::WellMissing(id);
        }

        let options = SelectOptions::restore(snapshot.restore_request()).silent();
        match controller.select_well(id, options).await {
            Ok(()) => RestoreOutcome::Restored(id),
            Err(_) => RestoreOutcome::Failed(id),
        }
    }
}
