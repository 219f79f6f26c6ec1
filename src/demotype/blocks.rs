use super::DemoTypeError;
use std::fmt;
use std::path::{Path, PathBuf};

const START_MARKER: &str = "[start]";
const END_MARKER: &str = "[end]";

/// One unit of text delivered per trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock(String);

impl TextBlock {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Single-line preview of at most `max_chars` characters, with an
    /// ellipsis when the block is longer.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut out: String = self
            .0
            .chars()
            .take(max_chars)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        if self.char_count() > max_chars {
            out.push_str("...");
        }
        out
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TextBlock {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits `raw` into the blocks found between `[start]` and `[end]` markers.
///
/// Markers match case-insensitively and do not nest. Each block is trimmed of
/// leading and trailing line breaks; blocks that are blank after trimming are
/// dropped, as is a trailing `[start]` with no `[end]` after it.
pub fn parse_blocks(raw: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(start) = find_marker(raw, START_MARKER, cursor) {
        let body_start = start + START_MARKER.len();
        let Some(end) = find_marker(raw, END_MARKER, body_start) else {
            break;
        };
        let body = raw[body_start..end].trim_matches(is_line_break);
        if !body.trim().is_empty() {
            blocks.push(TextBlock(body.to_string()));
        }
        cursor = end + END_MARKER.len();
    }

    blocks
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

// Markers are ASCII, so a byte match always lands on a char boundary.
fn find_marker(haystack: &str, marker: &str, from: usize) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let needle = marker.as_bytes();
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| pos + from)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs_next::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Reads and parses a block file. An unreadable file and a file without any
/// block are both errors for the caller to report.
pub fn load_blocks(path: &Path) -> Result<Vec<TextBlock>, DemoTypeError> {
    let content = std::fs::read_to_string(path).map_err(|source| DemoTypeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let blocks = parse_blocks(&content);
    if blocks.is_empty() {
        return Err(DemoTypeError::EmptyContent {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), count = blocks.len(), "loaded DemoType blocks");
    Ok(blocks)
}
