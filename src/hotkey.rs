use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Char(char),
    Digit(u8),
    F(u8),
    Space,
    Tab,
    Return,
    Escape,
    Delete,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub cmd: bool,
}

impl KeyModifiers {
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
        cmd: false,
    };

    pub fn is_empty(self) -> bool {
        !(self.ctrl || self.shift || self.alt || self.cmd)
    }
}

/// A key press delivered to an overlay that currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::CTRL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub cmd: bool,
}

impl Hotkey {
    pub fn modifiers(&self) -> KeyModifiers {
        KeyModifiers {
            ctrl: self.ctrl,
            shift: self.shift,
            alt: self.alt,
            cmd: self.cmd,
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.cmd {
            write!(f, "Cmd+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Digit(d) => write!(f, "{d}"),
            Key::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Parse a hotkey string like "Ctrl+Shift+Space" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut cmd = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" | "OPTION" => alt = true,
            "CMD" | "COMMAND" | "SUPER" => cmd = true,
            "" => {}
            _ => {
                let parsed = parse_key(&upper)?;
                if key.replace(parsed).is_some() {
                    return None;
                }
            }
        }
    }

    key.map(|key| Hotkey {
        key,
        ctrl,
        shift,
        alt,
        cmd,
    })
}

fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Return),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "DELETE" => Some(Key::Delete),
        "BACKSPACE" => Some(Key::Backspace),
        "LEFT" | "LEFTARROW" => Some(Key::Left),
        "RIGHT" | "RIGHTARROW" => Some(Key::Right),
        "UP" | "UPARROW" => Some(Key::Up),
        "DOWN" | "DOWNARROW" => Some(Key::Down),
        "PLUS" | "=" => Some(Key::Plus),
        "MINUS" | "-" => Some(Key::Minus),
        _ if upper.len() > 1 && upper.starts_with('F') => match upper[1..].parse::<u8>() {
            Ok(n @ 1..=20) => Some(Key::F(n)),
            _ => None,
        },
        _ => {
            let mut chars = upper.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            if let Some(d) = c.to_digit(10) {
                Some(Key::Digit(d as u8))
            } else if c.is_ascii_alphabetic() {
                Some(Key::Char(c.to_ascii_lowercase()))
            } else {
                None
            }
        }
    }
}

/// What a global hotkey asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleDraw,
    ToggleTimer,
    DemoType,
    Cancel,
}

/// Receiver of OS-level hotkey notifications, independent of focus.
pub trait HotkeyHandler {
    fn hotkey_fired(&self, id: u32);
}

/// Resolves registration ids to [`Command`]s and forwards them to the
/// application loop over a channel.
pub struct HotkeyDispatcher {
    bindings: BTreeMap<u32, (Hotkey, Command)>,
    tx: Sender<Command>,
}

impl HotkeyDispatcher {
    pub fn new(tx: Sender<Command>) -> Self {
        Self {
            bindings: BTreeMap::new(),
            tx,
        }
    }

    /// Registers the four application hotkeys from `settings` under ids
    /// 1 (draw), 2 (timer), 3 (DemoType) and 4 (cancel).
    pub fn from_settings(settings: &crate::settings::Settings, tx: Sender<Command>) -> Self {
        let mut dispatcher = Self::new(tx);
        dispatcher.bind(1, settings.draw_hotkey(), Command::ToggleDraw);
        dispatcher.bind(2, settings.timer_hotkey(), Command::ToggleTimer);
        dispatcher.bind(3, settings.demo_type_hotkey(), Command::DemoType);
        dispatcher.bind(4, settings.cancel_hotkey(), Command::Cancel);
        dispatcher
    }

    pub fn bind(&mut self, id: u32, hotkey: Hotkey, command: Command) {
        if let Some((previous, _)) = self.bindings.insert(id, (hotkey, command)) {
            tracing::debug!(id, %previous, %hotkey, "hotkey binding replaced");
        }
    }

    pub fn unbind(&mut self, id: u32) -> Option<Command> {
        self.bindings.remove(&id).map(|(_, command)| command)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (u32, &Hotkey, Command)> {
        self.bindings
            .iter()
            .map(|(id, (hotkey, command))| (*id, hotkey, *command))
    }

    /// Looks up the registration id for a key combination.
    pub fn resolve(&self, hotkey: &Hotkey) -> Option<u32> {
        self.bindings
            .iter()
            .find(|(_, (bound, _))| bound == hotkey)
            .map(|(id, _)| *id)
    }
}

impl HotkeyHandler for HotkeyDispatcher {
    fn hotkey_fired(&self, id: u32) {
        let Some((hotkey, command)) = self.bindings.get(&id) else {
            tracing::debug!(id, "ignoring unknown hotkey id");
            return;
        };
        tracing::debug!(id, %hotkey, ?command, "hotkey fired");
        if self.tx.send(*command).is_err() {
            tracing::warn!(?command, "application loop is gone; dropping hotkey command");
        }
    }
}
