//! DemoType: delivers pre-written `[start]`...`[end]` text blocks into the
//! focused application, one block per trigger, either by synthetic typing or
//! through the clipboard.

pub mod backend;
pub mod blocks;
pub mod clipboard;
pub mod keystroke;
pub mod osascript;
pub mod session;

use std::path::PathBuf;

pub use backend::{
    AppHandle, ClipboardBackend, Collaborators, EndReason, ForegroundTracker, InputBackend,
    KeyCapture, NoopCapture, SessionObserver,
};
pub use blocks::{expand_tilde, load_blocks, parse_blocks, TextBlock};
pub use keystroke::KeyStroke;
pub use session::{DeliveryMode, DemoType, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum DemoTypeError {
    #[error("no DemoType file configured; choose a text file with [start]...[end] blocks")]
    Configuration,
    #[error("could not read file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no [start]...[end] blocks found in {}", path.display())]
    EmptyContent { path: PathBuf },
    #[error("live typing failed on the first character; continuing in clipboard mode")]
    DeliveryDegraded,
}
