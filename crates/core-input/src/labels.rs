//! Human-readable key labels for diagnostic display.
//!
//! This table is presentation only; it never feeds back into classification.
//! Modifier variants follow the xterm convention: `CSI 1 ; <m> <final>` for
//! arrows, home/end and F1-F4, `CSI <n> ; <m> ~` for the tilde keys.

use core_events::{ESC, InputEvent, ModMask, NamedKey, is_control_byte};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

/// A named key plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyLabel {
    pub key: NamedKey,
    pub mods: ModMask,
}

impl KeyLabel {
    pub const fn plain(key: NamedKey) -> Self {
        Self {
            key,
            mods: ModMask::empty(),
        }
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('<')?;
        if self.mods.contains(ModMask::SHIFT) {
            f.write_str("shift+")?;
        }
        if self.mods.contains(ModMask::CTRL) {
            f.write_str("ctrl+")?;
        }
        if self.mods.contains(ModMask::ALT) {
            f.write_str("alt+")?;
        }
        write!(f, "{}>", self.key)
    }
}

/// Final bytes of `CSI [1;m] <final>` keys.
const CSI_LETTER_KEYS: &[(u8, NamedKey)] = &[
    (b'A', NamedKey::Up),
    (b'B', NamedKey::Down),
    (b'C', NamedKey::Right),
    (b'D', NamedKey::Left),
    (b'H', NamedKey::Home),
    (b'F', NamedKey::End),
    (b'P', NamedKey::F(1)),
    (b'Q', NamedKey::F(2)),
    (b'R', NamedKey::F(3)),
    (b'S', NamedKey::F(4)),
];

/// Parameters of `CSI <n> [;m] ~` keys.
const CSI_TILDE_KEYS: &[(u8, NamedKey)] = &[
    (2, NamedKey::Insert),
    (3, NamedKey::Delete),
    (5, NamedKey::PageUp),
    (6, NamedKey::PageDown),
    (15, NamedKey::F(5)),
    (17, NamedKey::F(6)),
    (18, NamedKey::F(7)),
    (19, NamedKey::F(8)),
    (20, NamedKey::F(9)),
    (21, NamedKey::F(10)),
    (23, NamedKey::F(11)),
    (24, NamedKey::F(12)),
];

static LABELS: LazyLock<HashMap<Vec<u8>, KeyLabel>> = LazyLock::new(build_label_table);

fn build_label_table() -> HashMap<Vec<u8>, KeyLabel> {
    let mut table = HashMap::new();
    table.insert(vec![ESC], KeyLabel::plain(NamedKey::Esc));
    table.insert(vec![b'\r'], KeyLabel::plain(NamedKey::Enter));
    table.insert(vec![b'\t'], KeyLabel::plain(NamedKey::Tab));
    table.insert(vec![0x7f], KeyLabel::plain(NamedKey::Backspace));

    for &(final_byte, key) in CSI_LETTER_KEYS {
        let plain = KeyLabel::plain(key);
        table.insert(vec![ESC, b'[', final_byte], plain);
        // F1-F4 and home/end also arrive in SS3 form.
        if matches!(key, NamedKey::F(_) | NamedKey::Home | NamedKey::End) {
            table.insert(vec![ESC, b'O', final_byte], plain);
        }
        for param in 2..=8u8 {
            let seq = format!("\x1b[1;{param}{}", final_byte as char);
            table.insert(seq.into_bytes(), KeyLabel {
                key,
                mods: ModMask::from_param(param),
            });
        }
    }

    for &(code, key) in CSI_TILDE_KEYS {
        table.insert(format!("\x1b[{code}~").into_bytes(), KeyLabel::plain(key));
        for param in 2..=8u8 {
            table.insert(format!("\x1b[{code};{param}~").into_bytes(), KeyLabel {
                key,
                mods: ModMask::from_param(param),
            });
        }
    }
    table
}

/// Label for an exact byte sequence, if it is a known key.
pub fn key_label(bytes: &[u8]) -> Option<KeyLabel> {
    LABELS.get(bytes).copied()
}

/// Describe raw key bytes for display.
///
/// Known keys use their label; other single control bytes use caret notation
/// (`^A`); other escape sequences show `<esc>` followed by the remaining bytes
/// with non-printables hex-escaped.
pub fn describe_bytes(bytes: &[u8]) -> String {
    if let Some(label) = key_label(bytes) {
        return label.to_string();
    }
    match bytes {
        [b] if is_control_byte(*b) => format!("^{}", (*b ^ 0x40) as char),
        [ESC, rest @ ..] => {
            let mut out = String::from("<esc>");
            for &b in rest {
                if b.is_ascii_graphic() || b == b' ' {
                    out.push(b as char);
                } else {
                    let _ = write!(out, "\\x{b:02x}");
                }
            }
            out
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Describe a decoded event for display.
pub fn describe(event: &InputEvent) -> String {
    describe_bytes(event.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_byte_labels() {
        assert_eq!(describe_bytes(b"\x1b"), "<esc>");
        assert_eq!(describe_bytes(b"\r"), "<enter>");
        assert_eq!(describe_bytes(b"\x7f"), "<bksp>");
    }

    #[test]
    fn navigation_and_function_keys() {
        assert_eq!(describe_bytes(b"\x1b[A"), "<up>");
        assert_eq!(describe_bytes(b"\x1b[F"), "<end>");
        assert_eq!(describe_bytes(b"\x1bOP"), "<F1>");
        assert_eq!(describe_bytes(b"\x1b[3~"), "<delete>");
        assert_eq!(describe_bytes(b"\x1b[6~"), "<pgdn>");
        assert_eq!(describe_bytes(b"\x1b[24~"), "<F12>");
    }

    #[test]
    fn modified_keys() {
        assert_eq!(describe_bytes(b"\x1b[1;5P"), "<ctrl+F1>");
        assert_eq!(describe_bytes(b"\x1b[1;2S"), "<shift+F4>");
        assert_eq!(describe_bytes(b"\x1b[15;6~"), "<shift+ctrl+F5>");
        assert_eq!(describe_bytes(b"\x1b[23;2~"), "<shift+F11>");
        assert_eq!(describe_bytes(b"\x1b[1;5A"), "<ctrl+up>");
        assert_eq!(describe_bytes(b"\x1b[1;3D"), "<alt+left>");
    }

    #[test]
    fn unlabelled_control_uses_caret_notation() {
        assert_eq!(describe_bytes(&[0x01]), "^A");
        assert_eq!(describe_bytes(&[0x00]), "^@");
    }

    #[test]
    fn unknown_escape_sequence_is_escaped() {
        assert_eq!(describe_bytes(b"\x1b[99z"), "<esc>[99z");
        assert_eq!(describe_bytes(b"\x1b\x01"), "<esc>\\x01");
    }

    #[test]
    fn label_lookup_is_exact() {
        assert!(key_label(b"\x1b[A").is_some());
        assert!(key_label(b"\x1b[A ").is_none());
        assert!(key_label(b"\x1b[").is_none());
    }

    #[test]
    fn describe_event() {
        assert_eq!(describe(&InputEvent::Control(ESC)), "<esc>");
    }
}
