//! Application state driven by key actions: the text buffer, the current line
//! (held as an index, never a reference into the buffer), the scroll offset
//! and the quit flag.
//!
//! Action semantics:
//! - `Escape` requests quit.
//! - `Enter` appends an empty line which becomes the current line.
//! - Arrow actions move the scroll offset by one, unbounded in either
//!   direction; clipping is the renderer's job.
//! - `Literal` text is appended to the current line. Literals that start with
//!   a control byte are keys, not text: their diagnostic label is appended
//!   when labels are enabled, otherwise they are dropped.

use core_events::{KeyAction, is_control_byte};
use core_input::describe_bytes;
use core_text::TextBuffer;
use tracing::{debug, trace};

/// Logical buffer coordinate shown at the viewport's top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollOffset {
    pub x: isize,
    pub y: isize,
}

impl ScrollOffset {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }
}

/// What applying one action changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Edited,
    Scrolled,
    Quit,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    buffer: TextBuffer,
    current_line: usize,
    offset: ScrollOffset,
    key_labels: bool,
    quit: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EditorState {
    /// Empty single-line buffer, origin scroll offset.
    pub fn new(key_labels: bool) -> Self {
        Self {
            buffer: TextBuffer::new(),
            current_line: 0,
            offset: ScrollOffset::default(),
            key_labels,
            quit: false,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn offset(&self) -> ScrollOffset {
        self.offset
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn apply(&mut self, action: &KeyAction) -> Outcome {
        let outcome = match action {
            KeyAction::None => Outcome::Ignored,
            KeyAction::Escape => {
                self.quit = true;
                Outcome::Quit
            }
            KeyAction::Enter => {
                self.current_line = self.buffer.push_line();
                Outcome::Edited
            }
            KeyAction::MoveUp => self.scroll(0, -1),
            KeyAction::MoveDown => self.scroll(0, 1),
            KeyAction::MoveLeft => self.scroll(-1, 0),
            KeyAction::MoveRight => self.scroll(1, 0),
            KeyAction::Literal(bytes) => self.insert_literal(bytes),
        };
        trace!(
            target: "state",
            ?outcome,
            line = self.current_line,
            x = self.offset.x,
            y = self.offset.y,
            "applied"
        );
        outcome
    }

    fn scroll(&mut self, dx: isize, dy: isize) -> Outcome {
        self.offset.x = self.offset.x.saturating_add(dx);
        self.offset.y = self.offset.y.saturating_add(dy);
        Outcome::Scrolled
    }

    fn insert_literal(&mut self, bytes: &[u8]) -> Outcome {
        let Some(&first) = bytes.first() else {
            return Outcome::Ignored;
        };
        if !is_control_byte(first) {
            self.buffer.append(self.current_line, bytes);
            return Outcome::Edited;
        }
        if !self.key_labels {
            debug!(target: "state", len = bytes.len(), "control_literal_dropped");
            return Outcome::Ignored;
        }
        let label = describe_bytes(bytes);
        self.buffer.append(self.current_line, label.as_bytes());
        Outcome::Edited
    }
}
