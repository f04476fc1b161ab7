//! Name-token location inside raw declaration text.
//!
//! Used to narrow a function definition to the span of its declared name.
//! The scan understands just enough shell lexing to stay out of comments and
//! quoted strings; it is not a tokenizer.

use crate::grammar::ScriptLanguage;
use crate::types::Position;

/// Lexical context of the byte currently being scanned.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// `<# ... #>` block comment (PowerShell only).
    BlockComment,
    /// Ordinary script text.
    Code,
    /// Double-quoted string; the language's escape character applies.
    DoubleQuote,
    /// `#` comment running to end of line.
    LineComment,
    /// Single-quoted string; no escapes.
    SingleQuote,
}

/// Line/column bookkeeping while walking bytes.
struct Cursor {
    /// Current one-based column.
    column: u32,
    /// Current one-based line.
    line: u32,
}

impl Cursor {
    /// Move past one byte.
    fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line = self.line.saturating_add(1);
            self.column = 1;
        } else {
            self.column = self.column.saturating_add(1);
        }
    }
}

/// Characters that continue a shell identifier or command name.
const fn is_name_byte(byte: u8) -> bool {
    return byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-';
}

/// Find the first token-level occurrence of `name` in `text`.
///
/// `origin` is the position of the first byte of `text`. Matching is ASCII
/// case-insensitive, must sit on token boundaries, and ignores anything
/// inside comments or quoted strings. Columns count bytes. Inside double
/// quotes PowerShell escapes with a backtick and Bash with a backslash.
pub fn locate_name(text: &str, name: &str, origin: Position, language: ScriptLanguage) -> Option<Position> {
    let bytes = text.as_bytes();
    let escape = match language {
        ScriptLanguage::Bash => b'\\',
        ScriptLanguage::PowerShell => b'`',
    };
    let needle = name.as_bytes();
    if needle.is_empty() {
        return None;
    }

    let mut cursor = Cursor {
        column: origin.column,
        line: origin.line,
    };
    let mut state = ScanState::Code;
    let mut skip = 0_usize;

    for (index, &byte) in bytes.iter().enumerate() {
        if skip > 0 {
            skip = skip.saturating_sub(1);
            cursor.advance(byte);
            continue;
        }

        let next = bytes.get(index.saturating_add(1)).copied();
        match state {
            ScanState::Code => {
                if language == ScriptLanguage::PowerShell && byte == b'<' && next == Some(b'#') {
                    state = ScanState::BlockComment;
                    skip = 1;
                } else if byte == b'#' && starts_comment(bytes, index) {
                    state = ScanState::LineComment;
                } else if byte == b'\'' {
                    state = ScanState::SingleQuote;
                } else if byte == b'"' {
                    state = ScanState::DoubleQuote;
                } else if token_matches_at(bytes, index, needle) {
                    return Some(Position::new(cursor.line, cursor.column));
                }
            },
            ScanState::BlockComment => {
                if byte == b'#' && next == Some(b'>') {
                    state = ScanState::Code;
                    skip = 1;
                }
            },
            ScanState::DoubleQuote => {
                if byte == escape {
                    skip = 1;
                } else if byte == b'"' {
                    state = ScanState::Code;
                }
            },
            ScanState::LineComment => {
                if byte == b'\n' {
                    state = ScanState::Code;
                }
            },
            ScanState::SingleQuote => {
                if byte == b'\'' {
                    state = ScanState::Code;
                }
            },
        }
        cursor.advance(byte);
    }

    return None;
}

/// A `#` only opens a comment at the start of a word.
fn starts_comment(bytes: &[u8], index: usize) -> bool {
    let Some(prev_index) = index.checked_sub(1) else {
        return true;
    };
    return bytes
        .get(prev_index)
        .is_none_or(|&b| return b.is_ascii_whitespace() || matches!(b, b';' | b'|' | b'&' | b'(' | b'{' | b'}'));
}

/// Whether `needle` occurs at `index` as a whole token.
fn token_matches_at(bytes: &[u8], index: usize, needle: &[u8]) -> bool {
    let Some(end) = index.checked_add(needle.len()) else {
        return false;
    };
    let Some(candidate) = bytes.get(index..end) else {
        return false;
    };
    if !candidate.eq_ignore_ascii_case(needle) {
        return false;
    }

    let starts_token = index
        .checked_sub(1)
        .and_then(|prev| return bytes.get(prev))
        .is_none_or(|&b| return !is_name_byte(b) && b != b'$');
    let ends_token = bytes.get(end).is_none_or(|&b| return !is_name_byte(b));

    return starts_token && ends_token;
}
