//! Byte stream to [`InputEvent`] decoder.
//!
//! Terminals send a lone ESC keypress as a single byte, while special keys
//! arrive as ESC followed by more bytes in the same burst. The decoder keeps
//! reading after an ESC until the source times out, so "nothing more arrived"
//! means the sequence (or the lone ESC) is complete. A second ESC seen mid-scan
//! is never swallowed: it is carried over and starts the next event.
//!
//! A multi-byte UTF-8 lead only absorbs continuation bytes. Any other byte
//! ends the (truncated) code point and is held back to start the next event.
//! C1 control code points (U+0080..U+009F) are not text and are dropped.

use core_events::{
    CodePointBytes, ESC, EventBytes, InputEvent, MAX_EVENT_BYTES, is_control_byte,
};
use core_terminal::{ByteSource, TermError};
use smallvec::smallvec;
use tracing::trace;

#[derive(Debug, Default)]
pub struct InputDecoder {
    carried_escape: bool,
    held_byte: Option<u8>,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the previous call stopped on a second ESC that has not been
    /// delivered yet.
    pub fn has_carried_escape(&self) -> bool {
        self.carried_escape
    }

    /// True when the previous call stopped on a byte that belongs to the next
    /// event (other than ESC) and has not been delivered yet.
    pub fn has_held_byte(&self) -> bool {
        self.held_byte.is_some()
    }

    /// Decode the next event, or `Ok(None)` if no byte is currently available.
    ///
    /// Only terminal read failures are errors; truncated sequences are
    /// delivered with whatever bytes arrived.
    pub fn decode_next<S: ByteSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<InputEvent>, TermError> {
        let event = loop {
            let Some(first) = self.next_byte(source)? else {
                return Ok(None);
            };
            let event = match utf8_sequence_len(first) {
                Some(len) => self.read_code_point(first, len, source)?,
                None if first == ESC => self.read_escape(source)?,
                None if is_control_byte(first) => InputEvent::Control(first),
                None => single_byte(first),
            };
            if is_c1_control(&event) {
                trace!(target: "input.decode", len = event.byte_len(), "c1_control_dropped");
                continue;
            }
            break event;
        };
        trace!(
            target: "input.decode",
            kind = event.kind(),
            len = event.byte_len(),
            carried_escape = self.carried_escape,
            "event"
        );
        Ok(Some(event))
    }

    /// A byte held back by the previous call, else the next byte from `source`.
    fn next_byte<S: ByteSource>(&mut self, source: &mut S) -> Result<Option<u8>, TermError> {
        if std::mem::take(&mut self.carried_escape) {
            return Ok(Some(ESC));
        }
        if let Some(b) = self.held_byte.take() {
            return Ok(Some(b));
        }
        source.read_byte()
    }

    fn read_code_point<S: ByteSource>(
        &mut self,
        lead: u8,
        len: usize,
        source: &mut S,
    ) -> Result<InputEvent, TermError> {
        let mut bytes: CodePointBytes = smallvec![lead];
        while bytes.len() < len {
            match source.read_byte()? {
                Some(b) if is_continuation_byte(b) => bytes.push(b),
                Some(ESC) => {
                    self.carried_escape = true;
                    break;
                }
                Some(b) => {
                    self.held_byte = Some(b);
                    break;
                }
                None => break,
            }
        }
        let value = std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        if bytes.len() < len {
            trace!(target: "input.decode", expected = len, got = bytes.len(), "truncated_code_point");
        }
        Ok(InputEvent::CodePoint {
            value: value as u32,
            bytes,
        })
    }

    fn read_escape<S: ByteSource>(&mut self, source: &mut S) -> Result<InputEvent, TermError> {
        let mut seq: EventBytes = smallvec![ESC];
        while seq.len() < MAX_EVENT_BYTES {
            match source.read_byte()? {
                Some(ESC) => {
                    self.carried_escape = true;
                    break;
                }
                Some(b) => seq.push(b),
                None => break,
            }
        }
        if seq.len() == 1 {
            Ok(InputEvent::Control(ESC))
        } else {
            Ok(InputEvent::EscapeSequence(seq))
        }
    }
}

/// Total encoded length announced by a multi-byte UTF-8 lead byte.
fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0xc0..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf7 => Some(4),
        _ => None,
    }
}

#[inline]
fn is_continuation_byte(b: u8) -> bool {
    (0x80..=0xbf).contains(&b)
}

fn is_c1_control(event: &InputEvent) -> bool {
    matches!(event, InputEvent::CodePoint { value: 0x80..=0x9f, .. })
}

/// Printable ASCII, or a stray byte that cannot start a UTF-8 sequence.
fn single_byte(b: u8) -> InputEvent {
    let value = if b.is_ascii() {
        u32::from(b)
    } else {
        char::REPLACEMENT_CHARACTER as u32
    };
    InputEvent::CodePoint {
        value,
        bytes: smallvec![b],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::script::ScriptedTerminal;
    use pretty_assertions::assert_eq;

    fn drain(bytes: &[u8]) -> Vec<InputEvent> {
        let mut term = ScriptedTerminal::with_input(bytes);
        let mut decoder = InputDecoder::new();
        let mut out = Vec::new();
        while let Some(ev) = decoder.decode_next(&mut term).unwrap() {
            out.push(ev);
        }
        out
    }

    fn esc_seq(bytes: &[u8]) -> InputEvent {
        InputEvent::EscapeSequence(EventBytes::from_slice(bytes))
    }

    #[test]
    fn empty_source_yields_no_event() {
        assert!(drain(b"").is_empty());
    }

    #[test]
    fn arrow_key_is_one_escape_sequence() {
        assert_eq!(drain(b"\x1b[A"), vec![esc_seq(b"\x1b[A")]);
    }

    #[test]
    fn back_to_back_escapes_stay_separate() {
        assert_eq!(
            drain(b"\x1b\x1b"),
            vec![InputEvent::Control(ESC), InputEvent::Control(ESC)]
        );
    }

    #[test]
    fn second_escape_starts_next_sequence() {
        assert_eq!(
            drain(b"\x1b[A\x1b[B"),
            vec![esc_seq(b"\x1b[A"), esc_seq(b"\x1b[B")]
        );
    }

    #[test]
    fn carried_escape_is_consumed_without_reading() {
        let mut term = ScriptedTerminal::with_input(b"\x1b\x1b");
        let mut decoder = InputDecoder::new();
        decoder.decode_next(&mut term).unwrap();
        assert!(decoder.has_carried_escape());
        assert_eq!(term.unread(), 0);
        let second = decoder.decode_next(&mut term).unwrap();
        assert_eq!(second, Some(InputEvent::Control(ESC)));
        assert!(!decoder.has_carried_escape());
    }

    #[test]
    fn euro_sign_assembles_to_one_code_point() {
        let events = drain(b"\xe2\x82\xac");
        assert_eq!(events.len(), 1);
        match &events[0] {
            InputEvent::CodePoint { value, bytes } => {
                assert_eq!(*value, 0x20ac);
                assert_eq!(bytes.len(), 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn four_byte_code_point() {
        let events = drain("😀a".as_bytes());
        assert_eq!(events, vec![InputEvent::code_point('😀'), InputEvent::code_point('a')]);
    }

    #[test]
    fn truncated_code_point_keeps_gathered_bytes() {
        let events = drain(b"\xe2\x82");
        assert_eq!(
            events,
            vec![InputEvent::CodePoint {
                value: char::REPLACEMENT_CHARACTER as u32,
                bytes: CodePointBytes::from_slice(b"\xe2\x82"),
            }]
        );
    }

    #[test]
    fn control_bytes_and_ascii() {
        assert_eq!(
            drain(b"h\r\x7f"),
            vec![
                InputEvent::code_point('h'),
                InputEvent::Control(0x0d),
                InputEvent::Control(0x7f),
            ]
        );
    }

    #[test]
    fn stray_continuation_byte_degrades_to_replacement() {
        assert_eq!(
            drain(b"\x80"),
            vec![InputEvent::CodePoint {
                value: char::REPLACEMENT_CHARACTER as u32,
                bytes: CodePointBytes::from_slice(b"\x80"),
            }]
        );
    }

    #[test]
    fn escape_scan_is_capped() {
        let mut input = vec![ESC];
        input.extend(std::iter::repeat_n(b'1', 20));
        let events = drain(&input);
        assert_eq!(events[0].byte_len(), MAX_EVENT_BYTES);
        let rest: usize = events[1..].iter().map(InputEvent::byte_len).sum();
        assert_eq!(rest, 21 - MAX_EVENT_BYTES);
    }

    #[test]
    fn truncated_lead_does_not_swallow_following_escape() {
        assert_eq!(
            drain(b"\xc3\x1b[A"),
            vec![
                InputEvent::CodePoint {
                    value: char::REPLACEMENT_CHARACTER as u32,
                    bytes: CodePointBytes::from_slice(b"\xc3"),
                },
                esc_seq(b"\x1b[A"),
            ]
        );
    }

    #[test]
    fn truncated_lead_holds_back_following_byte() {
        let mut term = ScriptedTerminal::with_input(b"\xe2\x82a\r");
        let mut decoder = InputDecoder::new();
        let first = decoder.decode_next(&mut term).unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"\xe2\x82");
        assert!(decoder.has_held_byte());
        assert_eq!(
            decoder.decode_next(&mut term).unwrap(),
            Some(InputEvent::code_point('a'))
        );
        assert!(!decoder.has_held_byte());
        assert_eq!(
            decoder.decode_next(&mut term).unwrap(),
            Some(InputEvent::Control(0x0d))
        );
    }

    #[test]
    fn truncated_lead_before_control_byte() {
        assert_eq!(
            drain(b"\xf0\x9f\x7f"),
            vec![
                InputEvent::CodePoint {
                    value: char::REPLACEMENT_CHARACTER as u32,
                    bytes: CodePointBytes::from_slice(b"\xf0\x9f"),
                },
                InputEvent::Control(0x7f),
            ]
        );
    }

    #[test]
    fn c1_controls_are_not_code_points() {
        assert!(drain("\u{85}".as_bytes()).is_empty());
        assert_eq!(
            drain("a\u{9b}b\u{a0}".as_bytes()),
            vec![
                InputEvent::code_point('a'),
                InputEvent::code_point('b'),
                InputEvent::code_point('\u{a0}'),
            ]
        );
    }

    #[test]
    fn decoders_do_not_share_carried_state() {
        let mut a = InputDecoder::new();
        let b = InputDecoder::new();
        let mut term = ScriptedTerminal::with_input(b"\x1b\x1b");
        a.decode_next(&mut term).unwrap();
        assert!(a.has_carried_escape());
        assert!(!b.has_carried_escape());
    }
}
