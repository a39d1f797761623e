//! Transient toast notifications with per-toast expiry timers.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::{runtime::Handle, task::AbortHandle};
use tracing::{debug, warn};

use crate::models::Severity;

/// Lifetime of a toast when the caller does not pick one.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(3800);

/// Identifier of a toast: creation time plus a random salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId {
    millis: i64,
    salt: u32,
}

impl ToastId {
    fn generate() -> Self {
        Self {
            millis: Utc::now().timestamp_millis(),
            salt: rand::random(),
        }
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:08x}", self.millis, self.salt)
    }
}

/// A notification currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// Identifier used for removal.
    pub id: ToastId,
    /// Text shown to the user.
    pub message: String,
    /// Styling tag.
    pub severity: Severity,
    /// Time until the toast dismisses itself.
    pub ttl: Duration,
    /// Whether an expiry timer was armed.
    pub auto_dismiss: bool,
}

/// Newest-first list of toasts.
///
/// Each auto-dismissing toast owns one timer task. Removing the toast by
/// any path aborts that task, and dropping the queue aborts all of them.
pub struct ToastQueue {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    toasts: Vec<Toast>,
    timers: HashMap<ToastId, AbortHandle>,
    closed: bool,
}

impl Inner {
    fn take(&mut self, id: ToastId) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        before != self.toasts.len()
    }
}

impl ToastQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Show a toast that dismisses itself after `ttl`.
    ///
    /// Needs a Tokio runtime for the timer; without one the toast stays
    /// until removed explicitly.
    pub fn push(&self, message: impl Into<String>, severity: Severity, ttl: Duration) -> ToastId {
        self.insert(message.into(), severity, ttl, true)
    }

    /// Show a toast that stays until dismissed.
    pub fn push_sticky(&self, message: impl Into<String>, severity: Severity) -> ToastId {
        self.insert(message.into(), severity, DEFAULT_TOAST_TTL, false)
    }

    fn insert(&self, message: String, severity: Severity, ttl: Duration, auto: bool) -> ToastId {
        let mut inner = self.inner.lock();
        let mut id = ToastId::generate();
        while inner.toasts.iter().any(|toast| toast.id == id) {
            id = ToastId::generate();
        }
        if inner.closed {
            debug!(%id, "toast queue closed; dropping notification");
            return id;
        }

        let auto_dismiss = auto && arm_timer(&mut inner, &self.inner, id, ttl);
        inner.toasts.insert(
            0,
            Toast {
                id,
                message,
                severity,
                ttl,
                auto_dismiss,
            },
        );
        id
    }

    /// Remove a toast. Absent ids are ignored; returns whether one was removed.
    pub fn remove(&self, id: ToastId) -> bool {
        self.inner.lock().take(id)
    }

    /// Remove the most recent toast, if any.
    pub fn dismiss_newest(&self) -> Option<ToastId> {
        let mut inner = self.inner.lock();
        let id = inner.toasts.first()?.id;
        inner.take(id);
        Some(id)
    }

    /// Copy of the visible toasts, newest first.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.inner.lock().toasts.clone()
    }

    /// Number of visible toasts.
    pub fn len(&self) -> usize {
        self.inner.lock().toasts.len()
    }

    /// Whether no toast is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of armed expiry timers.
    pub fn pending_timers(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Cancel every timer, clear the list, and ignore later pushes.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        inner.toasts.clear();
        inner.closed = true;
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ToastQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn arm_timer(inner: &mut Inner, shared: &Arc<Mutex<Inner>>, id: ToastId, ttl: Duration) -> bool {
    let Ok(runtime) = Handle::try_current() else {
        warn!(%id, "no async runtime; toast will not auto-dismiss");
        return false;
    };
    let weak: Weak<Mutex<Inner>> = Arc::downgrade(shared);
    let task = runtime.spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Some(shared) = weak.upgrade() {
            let mut inner = shared.lock();
            // The timer entry is ours; forget it before taking the toast.
            inner.timers.remove(&id);
            if inner.take(id) {
                debug!(%id, "toast expired");
            }
        }
    });
    inner.timers.insert(id, task.abort_handle());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn toast_expires_after_ttl() {
        let queue = ToastQueue::new();
        let id = queue.push("Saved", Severity::Success, Duration::from_millis(100));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_timers(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.snapshot()[0].id, id);

        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert!(queue.is_empty());
        assert_eq!(queue.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn early_removal_cancels_timer() {
        let queue = ToastQueue::new();
        let first = queue.push("Deleted", Severity::Success, Duration::from_millis(100));
        assert!(queue.remove(first));
        assert_eq!(queue.pending_timers(), 0);

        let sticky = queue.push_sticky("Still here", Severity::Error);
        tokio::time::sleep(Duration::from_millis(250)).await;
        tokio::task::yield_now().await;

        let visible = queue.snapshot();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, sticky);
        assert!(!visible[0].auto_dismiss);
        assert!(!queue.remove(first), "second removal is a no-op");
    }

    #[tokio::test(start_paused = true)]
    async fn newest_toast_is_listed_first() {
        let queue = ToastQueue::new();
        queue.push("one", Severity::Success, DEFAULT_TOAST_TTL);
        let second = queue.push("two", Severity::Error, DEFAULT_TOAST_TTL);
        let visible = queue.snapshot();
        assert_eq!(visible[0].message, "two");
        assert_eq!(visible[1].message, "one");

        assert_eq!(queue.dismiss_newest(), Some(second));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_all_timers() {
        let queue = ToastQueue::new();
        queue.push("a", Severity::Success, Duration::from_millis(10));
        queue.push("b", Severity::Success, Duration::from_millis(20));
        queue.shutdown();
        assert_eq!(queue.pending_timers(), 0);
        assert!(queue.is_empty());

        queue.push("late", Severity::Error, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(queue.is_empty());
    }

    #[test]
    fn push_without_runtime_keeps_toast() {
        let queue = ToastQueue::new();
        let id = queue.push("offline", Severity::Error, Duration::from_millis(1));
        let visible = queue.snapshot();
        assert_eq!(visible[0].id, id);
        assert!(!visible[0].auto_dismiss);
        assert_eq!(queue.pending_timers(), 0);
    }
}
