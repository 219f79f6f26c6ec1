use super::ClipboardBackend;
use anyhow::Result;
use arboard::Clipboard;

/// The system clipboard.
pub struct SystemClipboard {
    inner: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: Clipboard::new()?,
        })
    }
}

impl ClipboardBackend for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match self.inner.get_text() {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(%err, "clipboard holds no text");
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner.set_text(text.to_string())?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        Ok(())
    }
}

/// Process-local clipboard, used when no system clipboard is reachable
/// (headless sessions, CI).
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.text = None;
        Ok(())
    }
}
