//! macOS backend built on `osascript` and System Events.
//!
//! System Events refuses synthetic keystrokes unless the calling process has
//! Accessibility permission, so the same path doubles as the live permission
//! probe. On platforms without `osascript` every call fails and the engine
//! stays in clipboard mode.

use super::keystroke::escape_script_string;
use super::{AppHandle, ForegroundTracker, InputBackend, KeyStroke};
use anyhow::{bail, Context, Result};
use std::process::Command;

const FRONTMOST_SCRIPT: [&str; 4] = [
    "tell application \"System Events\"",
    "set p to first application process whose frontmost is true",
    "return (name of p) & linefeed & (bundle identifier of p)",
    "end tell",
];

// Releasing a modifier that is not held changes nothing, but still requires
// the right to post events.
const PROBE_SCRIPT: &str = "tell application \"System Events\" to key up shift";

#[derive(Debug, Clone)]
pub struct OsaScript {
    program: String,
}

impl Default for OsaScript {
    fn default() -> Self {
        Self {
            program: "osascript".into(),
        }
    }
}

impl OsaScript {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, lines: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        for line in lines {
            cmd.arg("-e").arg(line);
        }
        let output = cmd
            .output()
            .with_context(|| format!("spawn {}", self.program))?;
        if !output.status.success() {
            bail!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty() && s != "missing value").then(|| s.to_string())
}

impl ForegroundTracker for OsaScript {
    fn frontmost(&mut self) -> Option<AppHandle> {
        match self.run(&FRONTMOST_SCRIPT) {
            Ok(out) => {
                let mut lines = out.lines();
                let name = lines.next().and_then(non_empty);
                let bundle_id = lines.next().and_then(non_empty);
                if name.is_none() && bundle_id.is_none() {
                    return None;
                }
                Some(AppHandle { name, bundle_id })
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not determine frontmost application");
                None
            }
        }
    }
}

impl InputBackend for OsaScript {
    fn probe(&mut self) -> bool {
        match self.run(&[PROBE_SCRIPT]) {
            Ok(_) => true,
            Err(err) => {
                tracing::info!(error = %err, "synthetic input not permitted");
                false
            }
        }
    }

    fn send(&mut self, stroke: &KeyStroke) -> Result<()> {
        self.run(&[stroke.to_apple_script().as_str()])
            .map(|_| ())
            .with_context(|| format!("deliver {stroke:?}"))
    }

    fn activate(&mut self, app: &AppHandle) -> Result<()> {
        let script = match (&app.bundle_id, &app.name) {
            (Some(id), _) => format!(
                "tell application id \"{}\" to activate",
                escape_script_string(id)
            ),
            (None, Some(name)) => format!(
                "tell application \"{}\" to activate",
                escape_script_string(name)
            ),
            (None, None) => bail!("application has neither bundle id nor name"),
        };
        self.run(&[script.as_str()])
            .map(|_| ())
            .with_context(|| format!("activate {}", app.label()))
    }
}
