//! Reporting upload outcomes on stdout and as a desktop notification.

use std::io::Write;

use crate::models::FileMetadata;
use crate::notify::Notifier;

/// Summary shown in the success notification.
pub const SUCCESS_SUMMARY: &str = "Upload succeeded";

/// Human-readable description of a created document.
pub fn format_result(result: &FileMetadata) -> String {
    let mut message = format!(
        "Filename in drive: {}\nID in drive: {}\nMIME type: {}\n",
        result.name,
        result.id,
        result.mime_type.as_deref().unwrap_or("-"),
    );
    if let Some(link) = &result.web_view_link {
        message.push_str(&format!("Link: {}\n", link));
    }
    message
}

pub struct Reporter {
    notifier: Box<dyn Notifier>,
}

impl Reporter {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Print the result to stdout and notify.
    pub fn report(&self, result: &FileMetadata) {
        let stdout = std::io::stdout();
        if let Err(e) = self.report_to(&mut stdout.lock(), result) {
            tracing::warn!(error = %e, "failed to write upload result");
        }
    }

    /// Write the result to `out`, then send the notification.
    ///
    /// A failing notification is logged and otherwise ignored.
    pub fn report_to<W: Write>(&self, out: &mut W, result: &FileMetadata) -> std::io::Result<()> {
        let message = format_result(result);
        out.write_all(message.as_bytes())?;
        out.flush()?;

        if let Err(e) = self.notifier.notify(SUCCESS_SUMMARY, &message) {
            tracing::warn!(error = %e, "desktop notification failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DriveError, Result};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording(Rc<RefCell<Vec<(String, String)>>>);

    impl Notifier for Recording {
        fn notify(&self, summary: &str, body: &str) -> Result<()> {
            self.0
                .borrow_mut()
                .push((summary.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _summary: &str, _body: &str) -> Result<()> {
            Err(DriveError::IoError(std::io::Error::other("no dbus")))
        }
    }

    fn result() -> FileMetadata {
        FileMetadata {
            id: "1xYz".to_string(),
            name: "Q1  drogpost".to_string(),
            mime_type: Some("application/vnd.google-apps.spreadsheet".to_string()),
            web_view_link: None,
        }
    }

    #[test]
    fn test_format_result() {
        let message = format_result(&result());
        assert_eq!(
            message,
            "Filename in drive: Q1  drogpost\nID in drive: 1xYz\nMIME type: application/vnd.google-apps.spreadsheet\n"
        );
    }

    #[test]
    fn test_format_result_with_link() {
        let mut metadata = result();
        metadata.web_view_link = Some("https://docs.google.com/spreadsheets/d/1xYz".to_string());
        assert!(format_result(&metadata).ends_with("Link: https://docs.google.com/spreadsheets/d/1xYz\n"));
    }

    #[test]
    fn test_report_notifies() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let reporter = Reporter::new(Box::new(Recording(Rc::clone(&calls))));
        let mut out = Vec::new();

        reporter.report_to(&mut out, &result()).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("ID in drive: 1xYz"));
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SUCCESS_SUMMARY);
        assert_eq!(calls[0].1, printed);
    }

    #[test]
    fn test_failed_notification_is_not_fatal() {
        let reporter = Reporter::new(Box::new(Failing));
        let mut out = Vec::new();
        assert!(reporter.report_to(&mut out, &result()).is_ok());
        assert!(!out.is_empty());
    }
}
