//! Desktop notifications. Best effort: callers log failures and move on.

use notify_rust::Notification;

use crate::error::{DriveError, Result};

/// Displays a system notification.
pub trait Notifier {
    fn notify(&self, summary: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<()> {
        Notification::new()
            .appname("drog")
            .summary(summary)
            .body(body)
            .show()
            .map(|_| ())
            .map_err(|e| DriveError::IoError(std::io::Error::other(e.to_string())))
    }
}

/// Used with `--no-notify`.
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _summary: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}
