#![allow(dead_code)]

use anyhow::{anyhow, Result};
use stagehand::demotype::{
    AppHandle, ClipboardBackend, Collaborators, EndReason, ForegroundTracker, InputBackend,
    KeyCapture, KeyStroke, SessionObserver,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything the fakes saw, in one place.
#[derive(Debug, Default)]
pub struct Log {
    pub probes: usize,
    pub sent: Vec<KeyStroke>,
    pub activations: Vec<AppHandle>,
    pub clipboard: Option<String>,
    pub clipboard_reads: usize,
    pub clipboard_writes: Vec<String>,
    pub clipboard_clears: usize,
    pub acquires: usize,
    pub releases: usize,
    pub statuses: Vec<String>,
    pub ended: Vec<EndReason>,
}

impl Log {
    pub fn typed(&self) -> String {
        self.sent
            .iter()
            .map(|stroke| match stroke {
                KeyStroke::Return => '\n',
                KeyStroke::Tab => '\t',
                KeyStroke::Text(c) => *c,
            })
            .collect()
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub live_typing: bool,
    /// Every `send` fails when set.
    pub send_fails: bool,
    pub capture_fails: bool,
    pub frontmost: Option<AppHandle>,
    pub clipboard: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            live_typing: true,
            send_fails: false,
            capture_fails: false,
            frontmost: Some(AppHandle {
                name: Some("Editor".into()),
                bundle_id: Some("com.example.editor".into()),
            }),
            clipboard: Some("original clipboard".into()),
        }
    }
}

impl MockConfig {
    pub fn clipboard_only() -> Self {
        Self {
            live_typing: false,
            ..Self::default()
        }
    }
}

struct FakeForeground {
    frontmost: Option<AppHandle>,
}

impl ForegroundTracker for FakeForeground {
    fn frontmost(&mut self) -> Option<AppHandle> {
        self.frontmost.clone()
    }
}

struct FakeInput {
    log: SharedLog,
    live: bool,
    send_fails: bool,
}

impl InputBackend for FakeInput {
    fn probe(&mut self) -> bool {
        self.log.borrow_mut().probes += 1;
        self.live
    }

    fn send(&mut self, stroke: &KeyStroke) -> Result<()> {
        if self.send_fails {
            return Err(anyhow!("events are not being delivered"));
        }
        self.log.borrow_mut().sent.push(stroke.clone());
        Ok(())
    }

    fn activate(&mut self, app: &AppHandle) -> Result<()> {
        self.log.borrow_mut().activations.push(app.clone());
        Ok(())
    }
}

struct FakeClipboard {
    log: SharedLog,
}

impl ClipboardBackend for FakeClipboard {
    fn get_text(&mut self) -> Option<String> {
        let mut log = self.log.borrow_mut();
        log.clipboard_reads += 1;
        log.clipboard.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.clipboard = Some(text.to_string());
        log.clipboard_writes.push(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.clipboard = None;
        log.clipboard_clears += 1;
        Ok(())
    }
}

struct FakeCapture {
    log: SharedLog,
    fails: bool,
}

impl KeyCapture for FakeCapture {
    fn acquire(&mut self) -> Result<()> {
        if self.fails {
            return Err(anyhow!("hotkey already taken"));
        }
        self.log.borrow_mut().acquires += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

struct FakeObserver {
    log: SharedLog,
}

impl SessionObserver for FakeObserver {
    fn status_changed(&mut self, status: &str) {
        self.log.borrow_mut().statuses.push(status.to_string());
    }

    fn session_ended(&mut self, reason: EndReason) {
        self.log.borrow_mut().ended.push(reason);
    }
}

pub fn collaborators(config: MockConfig) -> (Collaborators, SharedLog) {
    let log: SharedLog = Rc::new(RefCell::new(Log {
        clipboard: config.clipboard.clone(),
        ..Log::default()
    }));
    let io = Collaborators {
        foreground: Box::new(FakeForeground {
            frontmost: config.frontmost.clone(),
        }),
        input: Box::new(FakeInput {
            log: log.clone(),
            live: config.live_typing,
            send_fails: config.send_fails,
        }),
        clipboard: Box::new(FakeClipboard { log: log.clone() }),
        capture: Box::new(FakeCapture {
            log: log.clone(),
            fails: config.capture_fails,
        }),
        observer: Box::new(FakeObserver { log: log.clone() }),
    };
    (io, log)
}
