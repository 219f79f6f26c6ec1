use super::backend::{AppHandle, Collaborators, EndReason};
use super::blocks::{expand_tilde, load_blocks, TextBlock};
use super::keystroke::{delivery_chars, KeyStroke};
use super::DemoTypeError;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Wait after a trigger before typing, so the hotkey is released first.
pub const INITIAL_DELAY: Duration = Duration::from_millis(600);
/// Wait after reactivating the target before the first keystroke.
pub const ACTIVATION_SETTLE: Duration = Duration::from_millis(500);
pub const DEFAULT_CHAR_INTERVAL: Duration = Duration::from_millis(35);
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_secs(2);

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Typing,
    WaitingForNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    LiveTyping,
    Clipboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    ActivateTarget,
    TypeChar,
    AutoClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Deferred {
    due: Instant,
    seq: u64,
    generation: u64,
    step: Step,
}

struct ActiveSession {
    blocks: Vec<TextBlock>,
    block_index: usize,
    chars: Vec<char>,
    char_index: usize,
    mode: DeliveryMode,
    state: SessionState,
    target: Option<AppHandle>,
    /// Clipboard text before the first clipboard delivery; the outer `Some`
    /// means "saved, restore on close".
    saved_clipboard: Option<Option<String>>,
    capture_held: bool,
    completed: bool,
}

/// The DemoType engine. Single-threaded: callers feed it triggers and call
/// [`DemoType::tick`] from their event loop to run deferred steps.
pub struct DemoType {
    io: Collaborators,
    session: Option<ActiveSession>,
    queue: BinaryHeap<Reverse<Deferred>>,
    generation: u64,
    seq: u64,
    char_interval: Duration,
    status: String,
}

impl DemoType {
    pub fn new(io: Collaborators) -> Self {
        Self {
            io,
            session: None,
            queue: BinaryHeap::new(),
            generation: 0,
            seq: 0,
            char_interval: DEFAULT_CHAR_INTERVAL,
            status: String::new(),
        }
    }

    pub fn with_char_interval(mut self, interval: Duration) -> Self {
        self.char_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<DeliveryMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn block_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.block_index)
    }

    pub fn block_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.blocks.len())
    }

    /// Characters of the current block delivered so far in live typing mode.
    pub fn char_index(&self) -> Option<usize> {
        self.session
            .as_ref()
            .filter(|s| s.mode == DeliveryMode::LiveTyping)
            .map(|s| s.char_index)
    }

    /// Text for the floating status indicator; empty when idle.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// When the next deferred step is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .iter()
            .filter(|Reverse(d)| d.generation == self.generation)
            .map(|Reverse(d)| d.due)
            .min()
    }

    /// Handles the DemoType hotkey.
    ///
    /// Idle: loads the configured file and starts a session. Typing: ignored.
    /// Waiting for next: delivers the next block, or finishes the session.
    pub fn trigger(
        &mut self,
        now: Instant,
        configured_path: Option<&str>,
    ) -> Result<(), DemoTypeError> {
        match self.state() {
            SessionState::Idle => self.start(now, configured_path),
            SessionState::Typing => {
                tracing::debug!("trigger ignored while a block is being typed");
                Ok(())
            }
            SessionState::WaitingForNext => {
                self.advance(now);
                Ok(())
            }
        }
    }

    /// Explicit cancel. Valid in every state; a no-op when idle.
    pub fn cancel(&mut self) {
        self.close(EndReason::Cancelled);
    }

    /// Ends the session: drops pending steps, restores the clipboard, releases
    /// the cancel key and notifies the observer.
    pub fn close(&mut self, reason: EndReason) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.generation += 1;
        self.queue.clear();

        if let Some(saved) = session.saved_clipboard {
            let restored = match saved {
                Some(text) => self.io.clipboard.set_text(&text),
                None => self.io.clipboard.clear(),
            };
            if let Err(err) = restored {
                tracing::warn!(error = %err, "failed to restore clipboard");
            }
        }
        if session.capture_held {
            self.io.capture.release();
        }
        self.status.clear();

        tracing::info!(
            ?reason,
            block = session.block_index + 1,
            total = session.blocks.len(),
            "DemoType session closed"
        );
        self.io.observer.session_ended(reason);
    }

    /// Runs every deferred step due at or before `now`. Steps scheduled by a
    /// session that has since closed are discarded.
    pub fn tick(&mut self, now: Instant) {
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.due > now {
                break;
            }
            self.queue.pop();
            if next.generation != self.generation || self.session.is_none() {
                tracing::trace!(step = ?next.step, "dropping stale step");
                continue;
            }
            match next.step {
                Step::ActivateTarget => self.activate_before_typing(next.due),
                Step::TypeChar => self.type_next_char(next.due),
                Step::AutoClose => self.close(EndReason::Completed),
            }
        }
    }

    fn start(&mut self, now: Instant, configured_path: Option<&str>) -> Result<(), DemoTypeError> {
        let loaded = match configured_path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => load_blocks(&expand_tilde(path)),
            None => Err(DemoTypeError::Configuration),
        };
        let blocks = match loaded {
            Ok(blocks) => blocks,
            Err(err) => {
                tracing::warn!(error = %err, "DemoType session not started");
                self.io.observer.session_ended(EndReason::StartFailed);
                return Err(err);
            }
        };

        // Must run before anything of ours takes focus.
        let target = self.io.foreground.frontmost();
        let capture_held = match self.io.capture.acquire() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "could not capture the cancel key");
                false
            }
        };
        let mode = if self.io.input.probe() {
            DeliveryMode::LiveTyping
        } else {
            DeliveryMode::Clipboard
        };
        tracing::info!(
            ?mode,
            target = ?target.as_ref().map(AppHandle::label),
            blocks = blocks.len(),
            "DemoType session started"
        );

        self.generation += 1;
        self.session = Some(ActiveSession {
            blocks,
            block_index: 0,
            chars: Vec::new(),
            char_index: 0,
            mode,
            state: SessionState::WaitingForNext,
            target,
            saved_clipboard: None,
            capture_held,
            completed: false,
        });
        self.deliver_current(now);
        Ok(())
    }

    fn advance(&mut self, now: Instant) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        if s.completed {
            tracing::debug!("all blocks delivered; waiting for auto-close");
            return;
        }
        if s.block_index + 1 < s.blocks.len() {
            s.block_index += 1;
            self.deliver_current(now);
        } else {
            s.completed = true;
            let total = s.blocks.len();
            self.set_status(format!("All {total} blocks done!"));
            self.schedule(now + AUTO_CLOSE_DELAY, Step::AutoClose);
        }
    }

    fn deliver_current(&mut self, now: Instant) {
        match self.session.as_ref().map(|s| s.mode) {
            Some(DeliveryMode::LiveTyping) => self.begin_typing(now),
            Some(DeliveryMode::Clipboard) => self.deliver_via_clipboard(),
            None => {}
        }
    }

    fn begin_typing(&mut self, now: Instant) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let Some(block) = s.blocks.get(s.block_index) else {
            return;
        };
        s.chars = delivery_chars(block.as_str());
        s.char_index = 0;
        s.state = SessionState::Typing;
        let status = format!(
            "Typing block {}/{}...  |  Esc: cancel",
            s.block_index + 1,
            s.blocks.len()
        );
        self.set_status(status);
        self.schedule(now + INITIAL_DELAY, Step::ActivateTarget);
    }

    fn activate_before_typing(&mut self, at: Instant) {
        let Some(s) = self.session.as_ref() else {
            return;
        };
        if s.state != SessionState::Typing {
            return;
        }
        if let Some(target) = s.target.clone() {
            self.activate(&target);
        }
        self.schedule(at + ACTIVATION_SETTLE, Step::TypeChar);
    }

    fn type_next_char(&mut self, at: Instant) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        if s.state != SessionState::Typing {
            return;
        }
        let Some(&ch) = s.chars.get(s.char_index) else {
            self.finish_block(at);
            return;
        };

        match self.io.input.send(&KeyStroke::from_char(ch)) {
            Ok(()) => {}
            Err(err) if s.char_index == 0 => {
                // Permission was claimed but nothing got through.
                tracing::warn!(
                    error = %err,
                    fallback = %DemoTypeError::DeliveryDegraded,
                    "first keystroke failed"
                );
                s.mode = DeliveryMode::Clipboard;
                self.deliver_via_clipboard();
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, index = s.char_index, "keystroke failed");
            }
        }

        s.char_index += 1;
        self.schedule(at + self.char_interval, Step::TypeChar);
    }

    fn finish_block(&mut self, at: Instant) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        s.state = SessionState::WaitingForNext;
        let (n, total) = (s.block_index + 1, s.blocks.len());
        if n < total {
            self.set_status(format!(
                "Block {n}/{total} typed  |  trigger again for the next block  |  Esc: stop"
            ));
        } else {
            s.completed = true;
            self.set_status(format!("All {total} blocks typed!"));
            self.schedule(at + AUTO_CLOSE_DELAY, Step::AutoClose);
        }
    }

    fn deliver_via_clipboard(&mut self) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let Some(block) = s.blocks.get(s.block_index) else {
            return;
        };

        if s.saved_clipboard.is_none() {
            s.saved_clipboard = Some(self.io.clipboard.get_text());
        }
        if let Err(err) = self.io.clipboard.set_text(block.as_str()) {
            tracing::warn!(error = %err, "failed to place block on the clipboard");
        }
        s.state = SessionState::WaitingForNext;
        s.chars.clear();
        s.char_index = 0;

        let (n, total) = (s.block_index + 1, s.blocks.len());
        tracing::info!(
            block = n,
            total,
            preview = %block.preview(PREVIEW_CHARS),
            "copied block to clipboard"
        );
        let status = if n < total {
            format!(
                "Block {n}/{total} copied!  Press Cmd+V to paste  |  trigger again for the next block  |  Esc: stop"
            )
        } else {
            format!("Block {n}/{total} copied!  Press Cmd+V to paste  |  Esc: close")
        };
        let target = s.target.clone();

        self.set_status(status);
        if let Some(target) = target {
            self.activate(&target);
        }
    }

    fn activate(&mut self, target: &AppHandle) {
        if let Err(err) = self.io.input.activate(target) {
            tracing::warn!(error = %err, "could not reactivate target application");
        }
    }

    fn set_status(&mut self, status: String) {
        self.io.observer.status_changed(&status);
        self.status = status;
    }

    fn schedule(&mut self, due: Instant, step: Step) {
        self.seq += 1;
        self.queue.push(Reverse(Deferred {
            due,
            seq: self.seq,
            generation: self.generation,
            step,
        }));
    }
}

impl Drop for DemoType {
    fn drop(&mut self) {
        self.close(EndReason::Closed);
    }
}
