use crate::hotkey::{parse_hotkey, Hotkey, Key};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "stagehand_settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Text file holding `[start]`...`[end]` blocks for DemoType. A leading
    /// `~` is expanded to the home directory.
    #[serde(default)]
    pub demo_type_file: Option<String>,
    #[serde(default = "default_draw_hotkey")]
    pub draw_hotkey: String,
    #[serde(default = "default_timer_hotkey")]
    pub timer_hotkey: String,
    #[serde(default = "default_demo_type_hotkey")]
    pub demo_type_hotkey: String,
    #[serde(default = "default_cancel_hotkey")]
    pub cancel_hotkey: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Value pre-filled in the break timer prompt.
    #[serde(default = "default_break_minutes")]
    pub default_break_minutes: f64,
    /// Delay between characters in live typing mode.
    #[serde(default = "default_typing_interval_ms")]
    pub typing_interval_ms: u64,
    #[serde(default = "default_pen_width")]
    pub pen_width: f32,
}

fn default_draw_hotkey() -> String {
    "Ctrl+1".into()
}

fn default_timer_hotkey() -> String {
    "Ctrl+2".into()
}

fn default_demo_type_hotkey() -> String {
    "Ctrl+3".into()
}

fn default_cancel_hotkey() -> String {
    "Escape".into()
}

fn default_break_minutes() -> f64 {
    5.0
}

fn default_typing_interval_ms() -> u64 {
    35
}

fn default_pen_width() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            demo_type_file: None,
            draw_hotkey: default_draw_hotkey(),
            timer_hotkey: default_timer_hotkey(),
            demo_type_hotkey: default_demo_type_hotkey(),
            cancel_hotkey: default_cancel_hotkey(),
            debug_logging: false,
            log_file: None,
            default_break_minutes: default_break_minutes(),
            typing_interval_ms: default_typing_interval_ms(),
            pen_width: default_pen_width(),
        }
    }
}

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

impl Settings {
    /// Loads settings from `path`. A missing or blank file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }

    /// The configured DemoType file, if it is set to something non-blank.
    pub fn demo_type_path(&self) -> Option<&str> {
        self.demo_type_file
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms.max(1))
    }

    pub fn draw_hotkey(&self) -> Hotkey {
        hotkey_or(&self.draw_hotkey, "draw", ctrl_digit(1))
    }

    pub fn timer_hotkey(&self) -> Hotkey {
        hotkey_or(&self.timer_hotkey, "timer", ctrl_digit(2))
    }

    pub fn demo_type_hotkey(&self) -> Hotkey {
        hotkey_or(&self.demo_type_hotkey, "demo type", ctrl_digit(3))
    }

    pub fn cancel_hotkey(&self) -> Hotkey {
        hotkey_or(
            &self.cancel_hotkey,
            "cancel",
            Hotkey {
                key: Key::Escape,
                ctrl: false,
                shift: false,
                alt: false,
                cmd: false,
            },
        )
    }
}

fn ctrl_digit(d: u8) -> Hotkey {
    Hotkey {
        key: Key::Digit(d),
        ctrl: true,
        shift: false,
        alt: false,
        cmd: false,
    }
}

fn hotkey_or(text: &str, name: &str, fallback: Hotkey) -> Hotkey {
    match parse_hotkey(text) {
        Some(hotkey) => hotkey,
        None => {
            tracing::warn!(
                "provided {} hotkey string '{}' is invalid; using default {}",
                name,
                text,
                fallback
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_sits_next_to_executable() {
        let path = settings_path_from_exe_path(Path::new("/opt/stagehand/stagehand")).unwrap();
        assert_eq!(path, Path::new("/opt/stagehand").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn invalid_hotkey_falls_back_to_default() {
        let settings = Settings {
            demo_type_hotkey: "Ctrl+Nope".into(),
            ..Settings::default()
        };
        assert_eq!(settings.demo_type_hotkey(), ctrl_digit(3));
    }

    #[test]
    fn blank_demo_type_path_is_unset() {
        let settings = Settings {
            demo_type_file: Some("   ".into()),
            ..Settings::default()
        };
        assert_eq!(settings.demo_type_path(), None);
    }
}
