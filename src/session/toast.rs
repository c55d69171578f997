//! Ephemeral status messages
//!
//! A single toast slot. Showing a toast replaces the current one and starts
//! a timer that empties the slot after [`TOAST_DURATION`]. Timers are not
//! cancelled: an older timer may clear a newer toast early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long a toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A visible status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic sequence number of this toast
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Shared single-slot toast holder
#[derive(Debug, Clone, Default)]
pub struct ToastNotifier {
    slot: Arc<Mutex<Option<Toast>>>,
    next_id: Arc<AtomicU64>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible toast and schedule its dismissal
    ///
    /// Outside a tokio runtime the toast stays until replaced or dismissed.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> Toast {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
        };
        tracing::debug!(toast = toast.id, "{}", toast.message);

        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(toast.clone());
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = Arc::clone(&self.slot);
            handle.spawn(async move {
                tokio::time::sleep(TOAST_DURATION).await;
                if let Ok(mut slot) = slot.lock() {
                    *slot = None;
                }
            });
        }

        toast
    }

    /// The toast currently visible, if any
    pub fn current(&self) -> Option<Toast> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn dismiss(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
