//! Core event types shared by the decoder, classifier and application loop.
//!
//! An [`InputEvent`] is one decoded unit of raw terminal input. A [`KeyAction`]
//! is the semantic reading of one event that the application loop acts on.

use smallvec::SmallVec;
use std::fmt;

pub const ESC: u8 = 0x1b;
pub const CR: u8 = 0x0d;
pub const DEL: u8 = 0x7f;

/// Hard cap on the bytes one event may carry (bounds escape-sequence scanning).
pub const MAX_EVENT_BYTES: usize = 16;

/// Byte payload of an escape sequence or literal action.
pub type EventBytes = SmallVec<[u8; MAX_EVENT_BYTES]>;

/// Encoded bytes of a single code point (1..=4).
pub type CodePointBytes = SmallVec<[u8; 4]>;

/// C0 control byte or DEL.
#[inline]
pub fn is_control_byte(b: u8) -> bool {
    b < 0x20 || b == DEL
}

/// One decoded unit of input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A UTF-8 encoded scalar value that is not a control character.
    ///
    /// `value` is `char::REPLACEMENT_CHARACTER` when the bytes were truncated
    /// or otherwise not valid UTF-8; `bytes` always holds what was read.
    CodePoint { value: u32, bytes: CodePointBytes },
    /// A single control byte (ESC alone, CR, DEL, ...).
    Control(u8),
    /// ESC followed by 1..=15 further bytes.
    EscapeSequence(EventBytes),
}

impl InputEvent {
    pub fn code_point(value: char) -> Self {
        let mut buf = [0u8; 4];
        let encoded = value.encode_utf8(&mut buf);
        InputEvent::CodePoint {
            value: value as u32,
            bytes: SmallVec::from_slice(encoded.as_bytes()),
        }
    }

    /// Raw bytes of the event as they arrived.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            InputEvent::CodePoint { bytes, .. } => bytes,
            InputEvent::Control(b) => std::slice::from_ref(b),
            InputEvent::EscapeSequence(bytes) => bytes,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Short name used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InputEvent::CodePoint { .. } => "code_point",
            InputEvent::Control(_) => "control",
            InputEvent::EscapeSequence(_) => "escape_sequence",
        }
    }
}

/// Semantic classification of an [`InputEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum KeyAction {
    /// Nothing to do (no event was available).
    #[default]
    None,
    Escape,
    Enter,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Original bytes of anything outside the control table.
    Literal(EventBytes),
}

impl KeyAction {
    pub fn literal(bytes: &[u8]) -> Self {
        KeyAction::Literal(SmallVec::from_slice(bytes))
    }

    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            KeyAction::MoveUp | KeyAction::MoveDown | KeyAction::MoveLeft | KeyAction::MoveRight
        )
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u8 { const SHIFT=1; const ALT=2; const CTRL=4; }
}

impl ModMask {
    /// Decode an xterm modifier parameter (`1 + bitmask`, e.g. `5` = ctrl).
    pub fn from_param(param: u8) -> Self {
        ModMask::from_bits_truncate(param.saturating_sub(1))
    }
}

/// Keys that have a name in diagnostic labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamedKey::F(n) => return write!(f, "F{n}"),
            NamedKey::Enter => "enter",
            NamedKey::Esc => "esc",
            NamedKey::Backspace => "bksp",
            NamedKey::Tab => "tab",
            NamedKey::Up => "up",
            NamedKey::Down => "down",
            NamedKey::Left => "left",
            NamedKey::Right => "right",
            NamedKey::Home => "home",
            NamedKey::End => "end",
            NamedKey::PageUp => "pgup",
            NamedKey::PageDown => "pgdn",
            NamedKey::Insert => "insert",
            NamedKey::Delete => "delete",
        };
        f.write_str(name)
    }
}
