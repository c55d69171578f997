//! Binds the chat panel to the selected well
//!
//! The binder holds the chat of exactly one well at a time. Binding a
//! different well replaces the history with that well's own (from the
//! session cache, then the store). Each change is written through to the
//! cache and the store.

use crate::api::{ChatRequest, ChatRole, ChatTurn, WellApi, WellDetail, WellId};
use crate::chat::detail::DetailLevel;
use crate::chat::session::{cap_history, ChatContext, ChatSession, ChatSessionCache};
use crate::error::user_message_of;
use crate::session::activity::{ActivityKind, ActivityLog};
use crate::session::selection::SelectionState;
use crate::storage::{chat_session_key, PersistenceCodec};
use chrono::Utc;
use tracing::{debug, warn};

/// First words of every introductory message
pub const INTRO_PREFIX: &str = "Hi! I'm your well-log assistant";

/// Assistant message shown in place of a failed reply
pub const CHAT_FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't get an answer right now. Please try again in a moment.";

/// What happened to a sent message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was blank
    Empty,
    /// No well is bound
    Unbound,
    /// The assistant answered
    Replied,
    /// The request failed and the fallback message was appended
    Fallback,
}

#[derive(Debug, Clone)]
struct BoundWell {
    id: WellId,
    name: String,
}

/// Chat state for the bound well
#[derive(Debug)]
pub struct ChatContextBinder {
    codec: PersistenceCodec,
    cache: ChatSessionCache,
    well: Option<BoundWell>,
    context: ChatContext,
    messages: Vec<ChatTurn>,
    detail_level: DetailLevel,
}

/// Intro text for a well in a given context
pub fn intro_message(well_name: &str, context: &ChatContext) -> String {
    let scope = if context.curves.is_empty() {
        "no curves selected yet".to_string()
    } else {
        format!("{} ({})", context.curves.join(", "), context.mode)
    };
    let depth = match (context.depth_min, context.depth_max) {
        (Some(min), Some(max)) => format!("{:.1}-{:.1}", min, max),
        _ => "the full interval".to_string(),
    };
    format!(
        "{} for {}. I'm looking at {} over {}. Ask me about gas shows, fluid type or zones of interest.",
        INTRO_PREFIX, well_name, scope, depth
    )
}

/// Whether a message is a synthesized introduction
pub fn is_intro(turn: &ChatTurn) -> bool {
    turn.role == ChatRole::Assistant && turn.content.starts_with(INTRO_PREFIX)
}

impl ChatContextBinder {
    pub fn new(codec: PersistenceCodec, detail_level: DetailLevel) -> Self {
        Self {
            codec,
            cache: ChatSessionCache::new(),
            well: None,
            context: ChatContext::default(),
            messages: Vec::new(),
            detail_level,
        }
    }

    pub fn bound_well(&self) -> Option<WellId> {
        self.well.as_ref().map(|w| w.id)
    }

    pub fn messages(&self) -> &[ChatTurn] {
        &self.messages
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    pub fn cache(&self) -> &ChatSessionCache {
        &self.cache
    }

    /// Point the chat at `well` and refresh its context from the current view
    ///
    /// A different well than the bound one has its history and detail level
    /// loaded, replacing the current ones. The intro is regenerated when the
    /// history is empty or holds nothing but an outdated intro.
    pub fn bind(&mut self, well: &WellDetail, chart_curves: &[String], selection: &SelectionState) {
        let mut changed = false;
        if self.bound_well() != Some(well.id) {
            self.messages = match self.load_session(well.id) {
                Some(session) => {
                    self.detail_level = session.context.detail_level;
                    session.messages
                }
                None => Vec::new(),
            };
            self.well = Some(BoundWell {
                id: well.id,
                name: well.well_name.clone(),
            });
            changed = true;
        }

        let context = ChatContext::derive(
            chart_curves,
            &selection.selected_curves,
            selection.depth_range(),
            self.detail_level,
        );
        changed |= context != self.context;
        self.context = context;

        let intro = intro_message(&well.well_name, &self.context);
        let stale_intro = self.messages.len() == 1
            && is_intro(&self.messages[0])
            && self.messages[0].content != intro;
        if self.messages.is_empty() || stale_intro {
            self.messages = vec![ChatTurn::assistant(intro)];
            changed = true;
        }

        if changed {
            self.persist();
        }
    }

    /// Detach from any well
    pub fn unbind(&mut self) {
        self.well = None;
        self.messages.clear();
        self.context = ChatContext::default();
    }

    /// Set the detail level from user input
    pub fn set_detail_level(&mut self, raw: &str) -> DetailLevel {
        self.detail_level = DetailLevel::parse_str(raw);
        if self.context.detail_level != self.detail_level {
            self.context.detail_level = self.detail_level;
            self.persist();
        }
        self.detail_level
    }

    /// Send a message about the bound well
    ///
    /// The backend receives the history as it was before this message. A
    /// failed request appends [`CHAT_FALLBACK_MESSAGE`] and logs the real
    /// error to `activity`.
    pub async fn send(
        &mut self,
        api: &dyn WellApi,
        text: &str,
        activity: &mut ActivityLog,
    ) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Empty;
        }
        let Some(well_id) = self.bound_well() else {
            return SendOutcome::Unbound;
        };

        let request = ChatRequest {
            well_id,
            message: text.to_string(),
            history: self.messages.clone(),
            curves: self.context.curves.clone(),
            depth_min: self.context.depth_min,
            depth_max: self.context.depth_max,
            detail_level: self.context.detail_level.get(),
        };
        self.messages.push(ChatTurn::user(text));
        debug!(well = well_id, history = request.history.len(), "Sending chat message");

        let outcome = match api.chat(&request).await {
            Ok(reply) => {
                self.messages.push(ChatTurn::assistant(reply.response));
                SendOutcome::Replied
            }
            Err(e) => {
                activity.append(
                    format!("Chat failed: {}", user_message_of(&e)),
                    ActivityKind::Error,
                );
                self.messages.push(ChatTurn::assistant(CHAT_FALLBACK_MESSAGE));
                SendOutcome::Fallback
            }
        };

        cap_history(&mut self.messages);
        self.persist();
        outcome
    }

    /// Reset the history to the intro and persist immediately
    pub fn clear(&mut self) {
        let Some(well) = &self.well else {
            return;
        };
        self.messages = vec![ChatTurn::assistant(intro_message(&well.name, &self.context))];
        self.persist();
    }

    /// The well's saved session, from the cache first, then the store
    fn load_session(&self, well_id: WellId) -> Option<ChatSession> {
        let key = chat_session_key(well_id);
        let mut session = match self.cache.get(&key) {
            Some(session) => session.clone(),
            None => self.codec.load::<ChatSession>(&key)?,
        };
        cap_history(&mut session.messages);
        Some(session)
    }

    /// Write the bound well's session to the cache and the store
    pub fn persist(&mut self) {
        let Some(well) = &self.well else {
            return;
        };
        let key = chat_session_key(well.id);
        let session = ChatSession {
            context: self.context.clone(),
            messages: self.messages.clone(),
            updated_at: Some(Utc::now().to_rfc3339()),
        };
        if !self.codec.save(&key, &session).is_saved() {
            warn!(well = well.id, "Chat session kept in memory only");
        }
        self.cache.insert(key, session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{sample_well, FakeCall, FakeWellApi};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn binder_with(store: Arc<MemoryStore>) -> ChatContextBinder {
        ChatContextBinder::new(PersistenceCodec::new(store), DetailLevel::default())
    }

    fn selection(curves: &[&str]) -> SelectionState {
        let mut selection = SelectionState::default();
        selection.set_curves(curves.iter().copied());
        selection.depth_min = Some(1000.0);
        selection.depth_max = Some(2000.0);
        selection
    }

    #[test]
    fn test_bind_inserts_intro() {
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));
        let well = sample_well(1, "Alpha-1", &["HC1"]);
        binder.bind(&well, &[], &selection(&["HC1"]));

        assert_eq!(binder.messages().len(), 1);
        assert!(is_intro(&binder.messages()[0]));
        assert!(binder.messages()[0].content.contains("Alpha-1"));
    }

    #[test]
    fn test_stale_single_intro_is_replaced() {
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));
        let well = sample_well(1, "Alpha-1", &["HC1", "HC2"]);
        binder.bind(&well, &[], &selection(&["HC1"]));
        let first = binder.messages()[0].content.clone();

        binder.bind(&well, &["HC2".to_string()], &selection(&["HC1"]));
        assert_eq!(binder.messages().len(), 1);
        assert_ne!(binder.messages()[0].content, first);
        assert!(binder.messages()[0].content.contains("HC2"));
    }

    #[tokio::test]
    async fn test_switching_wells_replaces_history() {
        let store = Arc::new(MemoryStore::new(1 << 20));
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::clone(&store));
        let alpha = sample_well(1, "Alpha-1", &["HC1"]);
        let bravo = sample_well(2, "Bravo-2", &["HC1"]);

        binder.bind(&alpha, &[], &selection(&["HC1"]));
        binder.send(&api, "gas at 1500?", &mut activity).await;
        assert_eq!(binder.messages().len(), 3);

        binder.bind(&bravo, &[], &selection(&["HC1"]));
        assert_eq!(binder.messages().len(), 1);

        binder.bind(&alpha, &[], &selection(&["HC1"]));
        assert_eq!(binder.messages().len(), 3);
        assert_eq!(binder.messages()[1].content, "gas at 1500?");
    }

    #[tokio::test]
    async fn test_history_is_loaded_from_store_by_a_new_binder() {
        let store = Arc::new(MemoryStore::new(1 << 20));
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let well = sample_well(1, "Alpha-1", &["HC1"]);

        let mut first = binder_with(Arc::clone(&store));
        first.bind(&well, &[], &selection(&["HC1"]));
        first.send(&api, "hello", &mut activity).await;

        let mut second = binder_with(store);
        second.bind(&well, &[], &selection(&["HC1"]));
        assert_eq!(second.messages().len(), 3);
        assert_eq!(second.messages()[2].content, "You asked: hello");
    }

    #[tokio::test]
    async fn test_send_passes_prior_history_and_context() {
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));
        binder.set_detail_level("4.6");
        binder.bind(&sample_well(7, "Golf-7", &["HC1"]), &["HC1".to_string()], &selection(&["HC1"]));

        assert_eq!(binder.send(&api, "  what zone?  ", &mut activity).await, SendOutcome::Replied);

        let request = api.chat_requests().pop().unwrap();
        assert_eq!(request.well_id, 7);
        assert_eq!(request.message, "what zone?");
        assert_eq!(request.history.len(), 1);
        assert!(is_intro(&request.history[0]));
        assert_eq!(request.curves, vec!["HC1".to_string()]);
        assert_eq!(request.depth_min, Some(1000.0));
        assert_eq!(request.detail_level, 5);
    }

    #[test]
    fn test_detail_level_is_restored_per_well() {
        let store = Arc::new(MemoryStore::new(1 << 20));
        let alpha = sample_well(1, "Alpha-1", &["HC1"]);
        let bravo = sample_well(2, "Bravo-2", &["HC1"]);

        let mut first = binder_with(Arc::clone(&store));
        first.bind(&alpha, &[], &selection(&["HC1"]));
        first.set_detail_level("5");

        let mut second = binder_with(store);
        second.bind(&alpha, &[], &selection(&["HC1"]));
        assert_eq!(second.detail_level().get(), 5);
        assert_eq!(second.context().detail_level.get(), 5);

        // a well without a saved chat keeps the level in effect
        second.bind(&bravo, &[], &selection(&["HC1"]));
        assert_eq!(second.detail_level().get(), 5);
        second.set_detail_level("1");
        second.bind(&alpha, &[], &selection(&["HC1"]));
        assert_eq!(second.detail_level().get(), 5);
    }

    #[tokio::test]
    async fn test_send_recovers_after_backend_failure() {
        let api = FakeWellApi::new();
        api.set_chat_reply("Wet gas between 1400 and 1450.");
        api.fail_on(FakeCall::Chat);
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));
        binder.bind(&sample_well(1, "Alpha-1", &["HC1"]), &[], &selection(&["HC1"]));

        assert_eq!(binder.send(&api, "gas?", &mut activity).await, SendOutcome::Fallback);
        api.recover(&FakeCall::Chat);
        assert_eq!(binder.send(&api, "gas?", &mut activity).await, SendOutcome::Replied);

        assert_eq!(
            binder.messages().last().unwrap().content,
            "Wet gas between 1400 and 1450."
        );
        // the retry carries the failed exchange in its history
        assert_eq!(api.chat_requests().last().unwrap().history.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_send_appends_fallback() {
        let api = FakeWellApi::new();
        api.fail_on(FakeCall::Chat);
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));
        binder.bind(&sample_well(1, "Alpha-1", &["HC1"]), &[], &selection(&["HC1"]));

        let outcome = binder.send(&api, "hi", &mut activity).await;

        assert_eq!(outcome, SendOutcome::Fallback);
        assert_eq!(binder.messages().last().unwrap().content, CHAT_FALLBACK_MESSAGE);
        assert_eq!(activity.latest().unwrap().kind, ActivityKind::Error);
    }

    #[tokio::test]
    async fn test_blank_or_unbound_send_is_noop() {
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::new(MemoryStore::new(1 << 20)));

        assert_eq!(binder.send(&api, "hi", &mut activity).await, SendOutcome::Unbound);
        binder.bind(&sample_well(1, "Alpha-1", &["HC1"]), &[], &selection(&[]));
        assert_eq!(binder.send(&api, "   ", &mut activity).await, SendOutcome::Empty);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_history_capped_and_clear_leaves_intro() {
        let store = Arc::new(MemoryStore::new(1 << 20));
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(Arc::clone(&store));
        let well = sample_well(1, "Alpha-1", &["HC1"]);
        binder.bind(&well, &[], &selection(&["HC1"]));

        for i in 0..30 {
            binder.send(&api, &format!("q{}", i), &mut activity).await;
            assert!(binder.messages().len() <= 40);
        }
        assert_eq!(binder.messages().len(), 40);

        let codec = PersistenceCodec::new(store);
        let saved: ChatSession = codec.load(&chat_session_key(1)).unwrap();
        assert_eq!(saved.messages.len(), 40);

        binder.clear();
        assert_eq!(binder.messages().len(), 1);
        assert!(is_intro(&binder.messages()[0]));
        let saved: ChatSession = codec.load(&chat_session_key(1)).unwrap();
        assert_eq!(saved.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_chat_in_memory() {
        let store = Arc::new(MemoryStore::new(1 << 20));
        store.set_disabled(true);
        let api = FakeWellApi::new();
        let mut activity = ActivityLog::new();
        let mut binder = binder_with(store);
        binder.bind(&sample_well(1, "Alpha-1", &["HC1"]), &[], &selection(&["HC1"]));

        assert_eq!(binder.send(&api, "hi", &mut activity).await, SendOutcome::Replied);
        assert_eq!(binder.messages().len(), 3);
        assert!(binder.cache().get(&chat_session_key(1)).is_some());
    }
}
