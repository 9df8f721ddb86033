//! Viewport rendering: turns the text buffer plus a scroll offset into the
//! exact bytes of one full repaint, and presents frames to the terminal.
//!
//! Invariants:
//! - A frame holds exactly `rows` rows; rows beyond the buffer are blank.
//! - No row exceeds `columns` display columns, measured with the glyph
//!   width oracle.
//! - Rendering never mutates the buffer; the only side effects are the
//!   oracle's cache fills (and its probes on cold code points).

pub mod renderer;
pub mod viewport;
pub mod writer;

pub use renderer::{ViewportRenderer, render_frame, render_line};
pub use viewport::Viewport;
pub use writer::present;
