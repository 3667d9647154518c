//! Operating-system collaborators: browser and selection detection through
//! AppleScript, handing URIs to the OS, and terminal notifications.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command;

use crate::capture::{
    LinkDetector, NoteWriter, Notification, NotificationStyle, Notifier, SelectionReader,
};
use crate::error::CaptureError;
use crate::models::SourceLink;

/// Browsers whose front tab can be read.
pub const SUPPORTED_BROWSERS: &[&str] = &[
    "Safari",
    "Google Chrome",
    "Google Chrome Canary",
    "Chromium",
    "Arc",
    "Brave Browser",
    "Microsoft Edge",
    "Vivaldi",
    "Opera",
    "Orion",
];

const ACTIVE_APP_SCRIPT: &str = r#"tell application "System Events" to get name of first application process whose frontmost is true"#;

const SELECTION_SCRIPT: &str = r#"set savedClipboard to the clipboard
set the clipboard to ""
tell application "System Events" to keystroke "c" using command down
delay 0.2
set selectedText to the clipboard
set the clipboard to savedClipboard
return selectedText"#;

/// Script returning `url<TAB>title` for the front tab of `browser`.
pub fn browser_link_script(browser: &str) -> String {
    match browser {
        "Safari" | "Orion" => format!(
            r#"tell application "{0}" to return (URL of front document) & tab & (name of front document)"#,
            browser
        ),
        _ => format!(
            r#"tell application "{0}" to return (URL of active tab of front window) & tab & (title of active tab of front window)"#,
            browser
        ),
    }
}

/// Parse `url<TAB>title` script output. Both parts are required.
pub fn parse_link_output(output: &str) -> Option<SourceLink> {
    let (url, title) = output.trim_end_matches(['\r', '\n']).split_once('\t')?;
    let (url, title) = (url.trim(), title.trim());
    if url.is_empty() || title.is_empty() {
        return None;
    }
    Some(SourceLink::new(url, Some(title.to_string())))
}

async fn run_applescript(script: &str) -> Result<String, CaptureError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(|e| CaptureError::Detection(format!("osascript unavailable: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::Detection(stderr.trim().to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\r', '\n'])
        .to_string())
}

/// Reads the front browser tab through AppleScript.
#[derive(Debug, Clone, Default)]
pub struct AppleScriptLinkDetector;

#[async_trait]
impl LinkDetector for AppleScriptLinkDetector {
    async fn active_link(&self) -> Result<Option<SourceLink>, CaptureError> {
        let app = run_applescript(ACTIVE_APP_SCRIPT).await?;
        if !SUPPORTED_BROWSERS.contains(&app.as_str()) {
            tracing::debug!(app = %app, "Active application is not a supported browser");
            return Ok(None);
        }
        let output = run_applescript(&browser_link_script(&app)).await?;
        Ok(parse_link_output(&output))
    }
}

/// Copies the current selection and reads it back from the clipboard.
#[derive(Debug, Clone, Default)]
pub struct AppleScriptSelection;

#[async_trait]
impl SelectionReader for AppleScriptSelection {
    async fn selected_text(&self) -> Result<Option<String>, CaptureError> {
        let text = run_applescript(SELECTION_SCRIPT).await?;
        Ok((!text.is_empty()).then_some(text))
    }
}

/// A link supplied up front instead of detected.
#[derive(Debug, Clone, Default)]
pub struct FixedLink(pub Option<SourceLink>);

#[async_trait]
impl LinkDetector for FixedLink {
    async fn active_link(&self) -> Result<Option<SourceLink>, CaptureError> {
        Ok(self.0.clone())
    }
}

/// A selection supplied up front instead of detected.
#[derive(Debug, Clone, Default)]
pub struct FixedSelection(pub Option<String>);

#[async_trait]
impl SelectionReader for FixedSelection {
    async fn selected_text(&self) -> Result<Option<String>, CaptureError> {
        Ok(self.0.clone())
    }
}

/// Opens write targets with the OS URI handler.
#[derive(Debug, Clone, Default)]
pub struct UriOpener;

#[async_trait]
impl NoteWriter for UriOpener {
    async fn write(&self, target: &str) -> Result<(), CaptureError> {
        let target = target.to_string();
        tokio::task::spawn_blocking(move || open::that(target))
            .await
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))?
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))
    }
}

/// Prints write targets instead of opening them. Keeps what it printed.
#[derive(Debug, Default)]
pub struct DryRunWriter {
    written: Mutex<Vec<String>>,
}

impl DryRunWriter {
    pub fn written(&self) -> Vec<String> {
        self.written.lock().expect("writer lock poisoned").clone()
    }
}

#[async_trait]
impl NoteWriter for DryRunWriter {
    async fn write(&self, target: &str) -> Result<(), CaptureError> {
        println!("{}", target);
        self.written
            .lock()
            .expect("writer lock poisoned")
            .push(target.to_string());
        Ok(())
    }
}

/// Notifications on stderr, mirrored to the log.
#[derive(Debug, Clone, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.style {
            NotificationStyle::Success => "✓",
            NotificationStyle::Failure => "✗",
            NotificationStyle::Progress => "…",
        };
        match notification.style {
            NotificationStyle::Failure => tracing::warn!("{}", notification.title),
            _ => tracing::debug!("{}", notification.title),
        }
        eprintln!("{} {}", marker, notification.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_and_title() {
        let link = parse_link_output("https://example.com/a\tExample Page\n").unwrap();
        assert_eq!(link.url, "https://example.com/a");
        assert_eq!(link.label.as_deref(), Some("Example Page"));
    }

    #[test]
    fn requires_both_parts() {
        assert!(parse_link_output("https://example.com").is_none());
        assert!(parse_link_output("https://example.com\t").is_none());
        assert!(parse_link_output("\tTitle").is_none());
    }

    #[test]
    fn safari_uses_document_script() {
        assert!(browser_link_script("Safari").contains("URL of front document"));
        assert!(browser_link_script("Arc").contains("active tab of front window"));
    }

    #[tokio::test]
    async fn dry_run_writer_records_targets() {
        let writer = DryRunWriter::default();
        writer.write("obsidian://advanced-uri?vault=V").await.unwrap();
        assert_eq!(writer.written(), vec!["obsidian://advanced-uri?vault=V"]);
    }
}
