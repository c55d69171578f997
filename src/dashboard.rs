//! Application shell
//!
//! [`Dashboard`] is one page load: it reads the saved session once, loads the
//! well list, restores the session, and from then on writes the session back
//! to the store after every change. Writes are suppressed until restoration
//! has finished.

use crate::api::{HealthStatus, UploadProgress, WellApi, WellId};
use crate::chat::{ChatContextBinder, DetailLevel, SendOutcome};
use crate::config::ChatConfig;
use crate::error::Result;
use crate::session::controller::{ClearSummary, SelectOptions, WellSessionController};
use crate::session::restore::{RestoreOutcome, SessionRestorer};
use crate::session::selection::{DepthEdit, Tab};
use crate::session::snapshot::UiSessionSnapshot;
use crate::session::toast::ToastNotifier;
use crate::storage::{KeyValueStore, PersistenceCodec, SaveOutcome, UI_SESSION_KEY};

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Session controller, restoration, chat and persistence wired together
#[derive(Debug)]
pub struct Dashboard {
    controller: WellSessionController,
    restorer: SessionRestorer,
    chat: ChatContextBinder,
    codec: PersistenceCodec,
    pending_snapshot: Option<UiSessionSnapshot>,
}

impl Dashboard {
    /// Open a dashboard over `store`, reading the saved session
    ///
    /// Nothing is fetched until [`Dashboard::start`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wellscope::api::fake::{sample_well, FakeWellApi};
    /// use wellscope::config::ChatConfig;
    /// use wellscope::dashboard::Dashboard;
    /// use wellscope::session::restore::RestoreOutcome;
    /// use wellscope::storage::MemoryStore;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let api = Arc::new(FakeWellApi::new().with_well(sample_well(1, "Alpha-1", &["HC1"])));
    /// let store = Arc::new(MemoryStore::new(1 << 20));
    ///
    /// let mut dashboard = Dashboard::open(api, store, &ChatConfig::default());
    /// assert_eq!(dashboard.start().await, RestoreOutcome::NothingToRestore);
    /// dashboard.select_well(1).await.unwrap();
    /// assert_eq!(dashboard.controller().selection().selected_well_id, Some(1));
    /// # }
    /// ```
    pub fn open(api: Arc<dyn WellApi>, store: Arc<dyn KeyValueStore>, chat: &ChatConfig) -> Self {
        let codec = PersistenceCodec::new(store);
        let pending_snapshot = codec.load::<UiSessionSnapshot>(UI_SESSION_KEY);
        debug!(found = pending_snapshot.is_some(), "Read saved UI session");

        Self {
            controller: WellSessionController::new(api, ToastNotifier::new()),
            restorer: SessionRestorer::new(),
            chat: ChatContextBinder::new(
                codec.clone(),
                DetailLevel::new(i64::from(chat.default_detail_level)),
            ),
            codec,
            pending_snapshot,
        }
    }

    /// Load the well list and restore the saved session
    ///
    /// A failed list fetch still counts as loaded: restoration then finds the
    /// saved well missing and the session starts empty.
    pub async fn start(&mut self) -> RestoreOutcome {
        let _ = self.controller.refresh_wells().await;
        let snapshot = self.pending_snapshot.take();
        let outcome = self.restorer.run(snapshot, &mut self.controller).await;
        self.sync_chat();
        outcome
    }

    pub fn controller(&self) -> &WellSessionController {
        &self.controller
    }

    pub fn chat(&self) -> &ChatContextBinder {
        &self.chat
    }

    pub fn restorer(&self) -> &SessionRestorer {
        &self.restorer
    }

    pub fn toasts(&self) -> &ToastNotifier {
        self.controller.toasts()
    }

    /// The session as it would be written now
    pub fn snapshot(&self) -> UiSessionSnapshot {
        UiSessionSnapshot::capture(&self.controller)
    }

    /// Write the UI session; `None` while restoration has not finished
    pub fn persist(&self) -> Option<SaveOutcome> {
        if !self.restorer.persistence_enabled() {
            debug!("Skipping session write before restoration");
            return None;
        }
        Some(self.codec.save(UI_SESSION_KEY, &self.snapshot()))
    }

    pub async fn refresh_wells(&mut self) -> Result<()> {
        let result = self.controller.refresh_wells().await;
        self.after_change();
        result
    }

    pub async fn select_well(&mut self, id: WellId) -> Result<()> {
        let result = self.controller.select_well(id, SelectOptions::fresh()).await;
        self.after_change();
        result
    }

    pub fn set_curves<S: AsRef<str>>(&mut self, curves: &[S]) {
        self.controller.set_curves(curves);
        self.after_change();
    }

    pub fn toggle_curve(&mut self, mnemonic: &str) -> bool {
        let selected = self.controller.toggle_curve(mnemonic);
        self.after_change();
        selected
    }

    pub fn apply_preset(&mut self, name: &str) -> Option<usize> {
        let count = self.controller.apply_preset(name);
        self.after_change();
        count
    }

    pub fn set_depth_range(&mut self, raw_min: &str, raw_max: &str) -> DepthEdit {
        let edit = self.controller.set_depth_range(raw_min, raw_max);
        self.after_change();
        edit
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.controller.set_tab(tab);
        self.after_change();
    }

    pub async fn load_chart(&mut self) -> Result<()> {
        let result = self.controller.load_chart().await;
        self.after_change();
        result
    }

    pub async fn interpret(&mut self) -> Result<()> {
        let result = self.controller.interpret().await;
        self.after_change();
        result
    }

    pub async fn upload(&mut self, path: &Path, progress: Option<UploadProgress>) -> Result<WellId> {
        let result = self.controller.upload(path, progress).await;
        self.after_change();
        result
    }

    pub async fn delete_well(&mut self, id: WellId) -> Result<()> {
        let result = self.controller.delete_well(id).await;
        self.after_change();
        result
    }

    pub async fn check_health(&mut self) -> Result<HealthStatus> {
        let result = self.controller.check_health().await;
        self.after_change();
        result
    }

    /// Send a chat message about the selected well
    pub async fn send_chat(&mut self, text: &str) -> SendOutcome {
        self.sync_chat();
        let api = self.controller.api();
        let outcome = self
            .chat
            .send(api.as_ref(), text, self.controller.activity_mut())
            .await;
        self.after_change();
        outcome
    }

    pub fn set_detail_level(&mut self, raw: &str) -> DetailLevel {
        let level = self.chat.set_detail_level(raw);
        self.after_change();
        level
    }

    pub fn clear_chat(&mut self) {
        self.sync_chat();
        self.chat.clear();
    }

    /// Delete every well and forget the saved session
    ///
    /// Per-well chat sessions stay in the store under their old keys.
    pub async fn clear_all(&mut self) -> ClearSummary {
        let summary = self.controller.clear_all().await;
        self.codec.remove(UI_SESSION_KEY);
        self.chat.unbind();
        summary
    }

    fn after_change(&mut self) {
        self.sync_chat();
        self.persist();
    }

    /// Keep the chat bound to the loaded well
    fn sync_chat(&mut self) {
        if !self.restorer.persistence_enabled() {
            return;
        }
        match self.controller.well_detail() {
            Some(detail) => self.chat.bind(
                detail,
                self.controller.chart_curves(),
                self.controller.selection(),
            ),
            None => {
                if self.chat.bound_well().is_some() {
                    self.chat.unbind();
                }
            }
        }
    }
}
