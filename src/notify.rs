//! User-facing notifications.
//!
//! The compose workflow reports every failure through exactly one
//! [`NotificationSink`] call and never reads anything back.

use std::sync::Mutex;

use crate::error::{is_session_expired, ComposeError};
use crate::ui::display;

/// Where a stale session sends the user.
pub const NEW_SESSION_TARGET: &str = "/session";
/// Where a recipient without keys can have one uploaded.
pub const UPLOAD_KEY_TARGET: &str = "/upload";

/// Fire-and-forget notification surface.
pub trait NotificationSink {
    fn show_modal(&self, title: &str, header: &str, body: &str);

    fn show_confirm_modal(
        &self,
        title: &str,
        header: &str,
        body: &str,
        continue_target: &str,
        continue_label: Option<&str>,
        dismiss_label: Option<&str>,
    );

    /// Show an error. Text ending with the session-expired suffix offers a
    /// new session instead of a plain dismissal.
    fn show_error(&self, message: &str) {
        if is_session_expired(message) {
            self.show_confirm_modal(
                "Sorry",
                "Your session has expired",
                "Please click 'New Session' to get back on the saddle",
                NEW_SESSION_TARGET,
                Some("New Session"),
                None,
            );
        } else {
            self.show_modal("Sorry", "There was an error", message);
        }
    }
}

/// Report a compose failure through the sink.
pub fn report(sink: &dyn NotificationSink, error: &ComposeError) {
    sink.show_error(&error.to_string());
}

/// Point the user at the key upload path for a recipient with no keys.
pub fn report_no_keys(sink: &dyn NotificationSink, identifier: &str) {
    sink.show_confirm_modal(
        "No keys found",
        &format!("There are no public keys for {}", identifier),
        "Upload their public key (or import it from a URL) to add them as a recipient",
        UPLOAD_KEY_TARGET,
        Some("Upload Key"),
        None,
    );
}

/// A notification as shown, for sinks that keep them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Modal {
        title: String,
        header: String,
        body: String,
    },
    Confirm {
        title: String,
        header: String,
        body: String,
        continue_target: String,
        continue_label: Option<String>,
        dismiss_label: Option<String>,
    },
}

/// Prints notifications to stderr.
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn show_modal(&self, title: &str, header: &str, body: &str) {
        display::error(&format!("{} {}", title, header.to_lowercase()));
        if !body.is_empty() {
            display::info("", body);
        }
    }

    fn show_confirm_modal(
        &self,
        title: &str,
        header: &str,
        body: &str,
        continue_target: &str,
        continue_label: Option<&str>,
        _dismiss_label: Option<&str>,
    ) {
        display::warning(&format!("{}: {}", title, header));
        display::info("", body);
        display::info(continue_label.unwrap_or("Continue"), continue_target);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    fn push(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

impl NotificationSink for RecordingSink {
    fn show_modal(&self, title: &str, header: &str, body: &str) {
        self.push(Notice::Modal {
            title: title.to_string(),
            header: header.to_string(),
            body: body.to_string(),
        });
    }

    fn show_confirm_modal(
        &self,
        title: &str,
        header: &str,
        body: &str,
        continue_target: &str,
        continue_label: Option<&str>,
        dismiss_label: Option<&str>,
    ) {
        self.push(Notice::Confirm {
            title: title.to_string(),
            header: header.to_string(),
            body: body.to_string(),
            continue_target: continue_target.to_string(),
            continue_label: continue_label.map(str::to_string),
            dismiss_label: dismiss_label.map(str::to_string),
        });
    }
}
