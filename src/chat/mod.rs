//! Per-well AI chat
//!
//! The chat is scoped by a [`ChatContext`] derived from the dashboard view
//! and keeps one persisted [`ChatSession`] per well.

pub mod binder;
pub mod detail;
pub mod session;

pub use binder::{ChatContextBinder, SendOutcome, CHAT_FALLBACK_MESSAGE, INTRO_PREFIX};
pub use detail::DetailLevel;
pub use session::{ChatContext, ChatSession, ChatSessionCache, ContextMode, CHAT_HISTORY_LIMIT};
