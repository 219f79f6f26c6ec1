/// A single unit of synthetic keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStroke {
    Return,
    Tab,
    Text(char),
}

const RETURN_KEY_CODE: u16 = 36;
const TAB_KEY_CODE: u16 = 48;

impl KeyStroke {
    /// Line breaks and tabs become dedicated key presses; everything else is
    /// typed as text.
    pub fn from_char(ch: char) -> Self {
        match ch {
            '\n' | '\r' => KeyStroke::Return,
            '\t' => KeyStroke::Tab,
            other => KeyStroke::Text(other),
        }
    }

    /// The System Events command that delivers this stroke.
    pub fn to_apple_script(&self) -> String {
        match self {
            KeyStroke::Return => {
                format!("tell application \"System Events\" to key code {RETURN_KEY_CODE}")
            }
            KeyStroke::Tab => {
                format!("tell application \"System Events\" to key code {TAB_KEY_CODE}")
            }
            KeyStroke::Text(ch) => format!(
                "tell application \"System Events\" to keystroke \"{}\"",
                escape_script_string(&ch.to_string())
            ),
        }
    }
}

/// Escapes `text` for use inside a double-quoted AppleScript string literal.
pub fn escape_script_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Characters of `text` in delivery order, with `\r\n` pairs collapsed so
/// each line break produces a single Return.
pub fn delivery_chars(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        out.push(c);
    }
    out
}
