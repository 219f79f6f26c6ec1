//! Seams between the DemoType engine and the platform.

use super::KeyStroke;
use anyhow::Result;

/// An application that had input focus when a session started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppHandle {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
}

impl AppHandle {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.bundle_id.as_deref())
            .unwrap_or("unknown")
    }
}

/// Reports which application currently receives keyboard input.
pub trait ForegroundTracker {
    fn frontmost(&mut self) -> Option<AppHandle>;
}

/// Delivers synthetic keyboard input.
pub trait InputBackend {
    /// Live capability test. Must actually exercise the input path rather
    /// than trust a cached permission flag.
    fn probe(&mut self) -> bool;
    fn send(&mut self, stroke: &KeyStroke) -> Result<()>;
    fn activate(&mut self, app: &AppHandle) -> Result<()>;
}

pub trait ClipboardBackend {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Global key registration used to cancel a session while another
/// application has focus. Acquired and released in pairs.
pub trait KeyCapture {
    fn acquire(&mut self) -> Result<()>;
    fn release(&mut self);
}

/// Capture for hosts whose hotkey dispatcher already routes the cancel key.
#[derive(Debug, Default)]
pub struct NoopCapture;

impl KeyCapture for NoopCapture {
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The last block was delivered.
    Completed,
    /// The user pressed the cancel key.
    Cancelled,
    /// The owner closed the session, e.g. to start another activity.
    Closed,
    /// The session could not start; the error was returned to the caller.
    StartFailed,
}

/// Owner of a DemoType session. `session_ended` fires at most once per
/// session.
pub trait SessionObserver {
    fn status_changed(&mut self, _status: &str) {}
    fn session_ended(&mut self, reason: EndReason);
}

/// Everything the engine talks to.
pub struct Collaborators {
    pub foreground: Box<dyn ForegroundTracker>,
    pub input: Box<dyn InputBackend>,
    pub clipboard: Box<dyn ClipboardBackend>,
    pub capture: Box<dyn KeyCapture>,
    pub observer: Box<dyn SessionObserver>,
}
