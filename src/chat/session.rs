//! Chat context and per-well chat sessions

use crate::api::ChatTurn;
use crate::chat::detail::DetailLevel;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Most recent messages kept per well
pub const CHAT_HISTORY_LIMIT: usize = 40;

/// Where the chat's curve scope came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// The curves currently charted
    Chart,
    /// The raw curve selection, nothing charted yet
    #[default]
    Selection,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chart => write!(f, "chart"),
            Self::Selection => write!(f, "selection"),
        }
    }
}

impl ContextMode {
    /// Colored `[CHART]`/`[SELECTION]` tag for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Chart => format!("[{}]", "CHART".green()),
            Self::Selection => format!("[{}]", "SELECTION".yellow()),
        }
    }
}

/// Scope sent along with every chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub mode: ContextMode,
    #[serde(default)]
    pub curves: Vec<String>,
    #[serde(default)]
    pub depth_min: Option<f64>,
    #[serde(default)]
    pub depth_max: Option<f64>,
    #[serde(default)]
    pub detail_level: DetailLevel,
}

impl ChatContext {
    /// Context for the current view, preferring charted curves over the selection
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use wellscope::chat::{ChatContext, ContextMode, DetailLevel};
    ///
    /// let selected: BTreeSet<String> = ["HC1".to_string()].into();
    /// let ctx = ChatContext::derive(&[], &selected, None, DetailLevel::default());
    /// assert_eq!(ctx.mode, ContextMode::Selection);
    ///
    /// let ctx = ChatContext::derive(&["HC2".to_string()], &selected, None, DetailLevel::default());
    /// assert_eq!(ctx.mode, ContextMode::Chart);
    /// assert_eq!(ctx.curves, vec!["HC2".to_string()]);
    /// ```
    pub fn derive(
        chart_curves: &[String],
        selected_curves: &BTreeSet<String>,
        depth: Option<(f64, f64)>,
        detail_level: DetailLevel,
    ) -> Self {
        let (mode, curves) = if chart_curves.is_empty() {
            (
                ContextMode::Selection,
                selected_curves.iter().cloned().collect(),
            )
        } else {
            (ContextMode::Chart, chart_curves.to_vec())
        };
        Self {
            mode,
            curves,
            depth_min: depth.map(|(min, _)| min),
            depth_max: depth.map(|(_, max)| max),
            detail_level,
        }
    }
}

/// Persisted chat of one well
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    #[serde(default)]
    pub context: ChatContext,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ChatSession {
    /// Drop the oldest messages beyond [`CHAT_HISTORY_LIMIT`]
    pub fn cap(&mut self) {
        cap_history(&mut self.messages);
    }
}

/// Keep only the newest [`CHAT_HISTORY_LIMIT`] messages
pub fn cap_history(messages: &mut Vec<ChatTurn>) {
    if messages.len() > CHAT_HISTORY_LIMIT {
        let excess = messages.len() - CHAT_HISTORY_LIMIT;
        messages.drain(..excess);
    }
}

/// In-memory mirror of persisted chat sessions, keyed by storage key
#[derive(Debug, Clone, Default)]
pub struct ChatSessionCache {
    sessions: HashMap<String, ChatSession>,
}

impl ChatSessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ChatSession> {
        self.sessions.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, session: ChatSession) {
        self.sessions.insert(key.into(), session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cap_keeps_newest() {
        let mut session = ChatSession {
            messages: (0..55).map(|i| ChatTurn::user(format!("m{}", i))).collect(),
            ..Default::default()
        };
        session.cap();
        assert_eq!(session.messages.len(), CHAT_HISTORY_LIMIT);
        assert_eq!(session.messages[0].content, "m15");
        assert_eq!(session.messages.last().unwrap().content, "m54");
    }

    #[test]
    fn test_derive_carries_depth_and_detail() {
        let ctx = ChatContext::derive(
            &[],
            &BTreeSet::new(),
            Some((1000.0, 1500.0)),
            DetailLevel::new(5),
        );
        assert_eq!(ctx.depth_min, Some(1000.0));
        assert_eq!(ctx.depth_max, Some(1500.0));
        assert_eq!(ctx.detail_level.get(), 5);
        assert!(ctx.curves.is_empty());
    }

    #[test]
    fn test_session_tolerates_missing_fields() {
        let session: ChatSession = serde_json::from_value(json!({
            "context": {"mode": "chart", "detail_level": "7"}
        }))
        .unwrap();
        assert_eq!(session.context.mode, ContextMode::Chart);
        assert_eq!(session.context.detail_level.get(), 5);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_cache_lookup_by_key() {
        let mut cache = ChatSessionCache::new();
        cache.insert("a", ChatSession::default());
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert_eq!(cache.len(), 1);
    }
}
