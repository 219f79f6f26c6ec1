use stagehand::app::App;
use stagehand::demotype::clipboard::{MemoryClipboard, SystemClipboard};
use stagehand::demotype::osascript::OsaScript;
use stagehand::demotype::{
    ClipboardBackend, Collaborators, DemoType, EndReason, NoopCapture, SessionObserver,
};
use stagehand::hotkey::{parse_hotkey, HotkeyDispatcher, HotkeyHandler};
use stagehand::logging;
use stagehand::settings::{resolve_settings_path, Settings};
use stagehand::timer::FixedPrompt;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

struct LogObserver;

impl SessionObserver for LogObserver {
    fn status_changed(&mut self, status: &str) {
        tracing::info!(status, "DemoType");
    }

    fn session_ended(&mut self, reason: EndReason) {
        tracing::info!(?reason, "DemoType session ended");
    }
}

/// Reads key combinations such as `Ctrl+3` from stdin, one per line, and
/// fires the matching binding. `quit` or end of input stops the reader.
fn read_hotkeys(dispatcher: HotkeyDispatcher) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }
        match parse_hotkey(line).and_then(|hotkey| dispatcher.resolve(&hotkey)) {
            Some(id) => dispatcher.hotkey_fired(id),
            None => tracing::warn!(input = line, "no binding for key combination"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let settings_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => resolve_settings_path()?,
    };
    let settings = Settings::load(&settings_path)?;
    logging::init(
        settings.debug_logging,
        settings.log_file.as_deref().map(PathBuf::from),
    );
    tracing::info!(path = %settings_path.display(), "settings loaded");

    let (tx, rx) = mpsc::channel();
    let dispatcher = HotkeyDispatcher::from_settings(&settings, tx);
    for (id, hotkey, command) in dispatcher.bindings() {
        tracing::info!(id, %hotkey, ?command, "hotkey bound");
    }
    thread::Builder::new()
        .name("hotkey-input".into())
        .spawn(move || read_hotkeys(dispatcher))?;

    let clipboard: Box<dyn ClipboardBackend> = match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(err) => {
            tracing::warn!(error = %err, "system clipboard unavailable; using a private one");
            Box::new(MemoryClipboard::default())
        }
    };
    let osa = OsaScript::default();
    let demo_type = DemoType::new(Collaborators {
        foreground: Box::new(osa.clone()),
        input: Box::new(osa),
        clipboard,
        capture: Box::new(NoopCapture),
        observer: Box::new(LogObserver),
    })
    .with_char_interval(settings.typing_interval());
    let prompt = FixedPrompt::answering(settings.default_break_minutes.to_string());
    let mut app = App::new(settings, rx, demo_type, Box::new(prompt));

    loop {
        let now = Instant::now();
        let connected = app.pump(now);
        app.tick(now);
        for message in app.take_messages() {
            tracing::error!("{message}");
        }
        if !connected && !app.demo_type().is_active() {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    app.close_all(EndReason::Closed);
    tracing::info!("exiting");
    Ok(())
}
