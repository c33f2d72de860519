//! Terminal rendering of client notifications.

use insight_core::http::{NoticeLevel, Notifier};

/// Writes notices to stderr so stdout stays reserved for command output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

pub fn format_notice(level: NoticeLevel, message: &str) -> String {
    let label = match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{label}] {message}")
}

impl Notifier for TerminalNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        eprintln!("{}", format_notice(level, message));
    }

    fn show_advisory(&self, message: &str) {
        eprintln!("{}", format_notice(NoticeLevel::Info, message));
    }

    fn dismiss_advisory(&self) {
        tracing::debug!("Advisory dismissed");
    }

    fn redirect_to_login(&self) {
        eprintln!("Session ended. Run `insight auth login` to sign in again.");
    }
}
