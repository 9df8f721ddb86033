//! Frame presentation.
//!
//! A frame is written in one go wrapped in cursor hide/show so the cursor
//! never flickers across the repaint, then flushed once.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    queue,
};
use std::io::Write;
use tracing::trace;

pub fn present<W: Write>(out: &mut W, frame: &[u8]) -> Result<()> {
    queue!(out, Hide)?;
    out.write_all(frame)?;
    queue!(out, Show)?;
    out.flush()?;
    trace!(target: "render", bytes = frame.len(), "frame_presented");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::ansi::{CURSOR_HIDE, CURSOR_SHOW};

    #[test]
    fn wraps_frame_in_cursor_hide_show() {
        let mut out = Vec::new();
        present(&mut out, b"\x1b[2J\x1b[Hhi").unwrap();
        let expected = [CURSOR_HIDE, b"\x1b[2J\x1b[Hhi".as_slice(), CURSOR_SHOW].concat();
        assert_eq!(out, expected);
    }
}
