/// Error from the platform clipboard.
#[derive(Debug, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Write-only clipboard used by the copy action.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via `arboard`.
///
/// The handle is opened on first copy and kept for the session. On Linux the
/// copied text is only served while a handle is alive, so dropping it after
/// each copy would empty the clipboard.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        // A handle that failed is dropped and reopened on the next copy.
        let mut clipboard = match self.handle.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?,
        };
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError(e.to_string()))?;
        self.handle = Some(clipboard);
        Ok(())
    }
}

/// In-memory clipboard, handy for headless sessions and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clipboard_connects_lazily() {
        let clipboard = SystemClipboard::new();
        assert!(!clipboard.is_connected());
    }

    #[test]
    fn test_memory_clipboard_keeps_last_copy() {
        let mut clipboard = MemoryClipboard::default();
        clipboard.set_text("first").unwrap();
        clipboard.set_text("second").unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("second"));
    }
}
