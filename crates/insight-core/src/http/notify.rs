//! User-facing notification service interface.

use std::sync::{Mutex, PoisonError};

/// Severity of a transient notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for transient notifications, the slow-request advisory, and the
/// forced-logout redirect.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
    fn show_advisory(&self, message: &str);
    fn dismiss_advisory(&self);
    fn redirect_to_login(&self);
}

/// Everything a [`RecordingNotifier`] observed, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifierEvent {
    Notice { level: NoticeLevel, message: String },
    AdvisoryShown(String),
    AdvisoryDismissed,
    RedirectedToLogin,
}

/// Notifier that records events; used by headless embedders and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notices at `level`, oldest first.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NotifierEvent::Notice {
                    level: seen,
                    message,
                } if seen == level => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: NotifierEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.push(NotifierEvent::Notice {
            level,
            message: message.to_string(),
        });
    }

    fn show_advisory(&self, message: &str) {
        self.push(NotifierEvent::AdvisoryShown(message.to_string()));
    }

    fn dismiss_advisory(&self) {
        self.push(NotifierEvent::AdvisoryDismissed);
    }

    fn redirect_to_login(&self) {
        self.push(NotifierEvent::RedirectedToLogin);
    }
}
