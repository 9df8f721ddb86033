//! In-memory terminal for tests.
//!
//! Feeds scripted input bytes, records every write, and answers cursor
//! position queries from a simulated cursor. Glyph widths default to 1 for
//! printable characters and 0 for control characters; individual glyphs can
//! be given other widths with [`ScriptedTerminal::with_width`].

use crate::ansi::ESC;
use crate::{ByteSource, TermError};
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

/// How the scripted terminal answers `ESC [ 6 n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMode {
    /// Report the simulated cursor position.
    #[default]
    Model,
    /// Answer with a report missing the column field.
    Malformed,
    /// Never answer.
    Silent,
}

#[derive(Debug)]
pub struct ScriptedTerminal {
    input: VecDeque<u8>,
    written: Vec<u8>,
    widths: HashMap<char, u16>,
    reply: ReplyMode,
    row: u16,
    column: u16,
    queries: usize,
}

impl Default for ScriptedTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTerminal {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            written: Vec::new(),
            widths: HashMap::new(),
            reply: ReplyMode::Model,
            row: 1,
            column: 1,
            queries: 0,
        }
    }

    /// Terminal whose keyboard will deliver `bytes`, then time out.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut term = Self::new();
        term.push_input(bytes);
        term
    }

    pub fn with_width(mut self, ch: char, width: u16) -> Self {
        self.widths.insert(ch, width);
        self
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn set_reply(&mut self, reply: ReplyMode) {
        self.reply = reply;
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Number of cursor position queries received.
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Bytes still waiting to be read.
    pub fn unread(&self) -> usize {
        self.input.len()
    }

    fn glyph_width(&self, ch: char) -> u16 {
        if let Some(w) = self.widths.get(&ch) {
            return *w;
        }
        if ch.is_control() { 0 } else { 1 }
    }

    fn interpret(&mut self, buf: &[u8]) {
        let mut i = 0;
        while i < buf.len() {
            if buf[i] == ESC {
                let len = control_sequence_len(&buf[i..]);
                self.apply_control(&buf[i..i + len]);
                i += len;
                continue;
            }
            let len = utf8_len(buf[i]).min(buf.len() - i);
            let ch = std::str::from_utf8(&buf[i..i + len])
                .ok()
                .and_then(|s| s.chars().next());
            match ch {
                Some('\r') => self.column = 1,
                Some('\n') => self.row = self.row.saturating_add(1),
                Some(ch) => self.column = self.column.saturating_add(self.glyph_width(ch)),
                None => {}
            }
            i += len;
        }
    }

    fn apply_control(&mut self, seq: &[u8]) {
        match seq {
            b"\x1b[H" => {
                self.row = 1;
                self.column = 1;
            }
            b"\x1b[6n" => {
                self.queries += 1;
                match self.reply {
                    ReplyMode::Model => {
                        let report = format!("\x1b[{};{}R", self.row, self.column);
                        self.input.extend(report.bytes());
                    }
                    ReplyMode::Malformed => {
                        let report = format!("\x1b[{}R", self.row);
                        self.input.extend(report.bytes());
                    }
                    ReplyMode::Silent => {}
                }
            }
            _ => {}
        }
    }
}

/// Length of the CSI sequence at the start of `buf` (or of the bare escape).
fn control_sequence_len(buf: &[u8]) -> usize {
    if buf.len() >= 2 && buf[1] == b'[' {
        buf[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(buf.len(), |p| p + 3)
    } else {
        buf.len().min(2)
    }
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

impl ByteSource for ScriptedTerminal {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        Ok(self.input.pop_front())
    }
}

impl Write for ScriptedTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        self.interpret(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
