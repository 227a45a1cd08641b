//! User-facing notices — trait for surfacing wizard outcomes to whatever
//! front end is attached.
//!
//! The pipeline and session layer accept an `Arc<dyn Notifier>` and report
//! successes, warnings, and failures through it instead of talking to a UI
//! directly.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// One message destined for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Trait for delivering notices. Implementations push to the web client,
/// a CLI, or a test buffer.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// No-op notifier for headless callers.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _kind: NoticeKind, _message: &str) {}
}

/// In-memory notifier that captures notices for testing.
#[derive(Default)]
pub struct CaptureNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CaptureNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().expect("notifier mutex poisoned").len()
    }

    pub fn count_kind(&self, kind: NoticeKind) -> usize {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.notices.lock().expect("notifier mutex poisoned").clear();
    }
}

impl Notifier for CaptureNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(Notice {
                kind,
                message: message.to_string(),
            });
    }
}

/// Convenience: notifier for callers that don't surface messages.
pub fn noop_notifier() -> Arc<dyn Notifier> {
    Arc::new(NoopNotifier)
}

/// Convenience: capture notifier for tests.
pub fn capture_notifier() -> Arc<CaptureNotifier> {
    Arc::new(CaptureNotifier::new())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_notifier() {
        let notifier = capture_notifier();
        assert_eq!(notifier.count(), 0);

        notifier.notify(NoticeKind::Success, "Campaign sent to 3/3 recipients");
        notifier.notify(NoticeKind::Warning, "Dispatcher unreachable");

        assert_eq!(notifier.count(), 2);
        assert_eq!(notifier.count_kind(NoticeKind::Success), 1);
        assert_eq!(notifier.count_kind(NoticeKind::Warning), 1);
        assert_eq!(notifier.count_kind(NoticeKind::Error), 0);

        let notices = notifier.notices();
        assert_eq!(notices[0].message, "Campaign sent to 3/3 recipients");

        notifier.clear();
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_noop_notifier() {
        let notifier = noop_notifier();
        // Should not panic
        notifier.notify(NoticeKind::Info, "ignored");
    }
}
