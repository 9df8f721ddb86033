//! Viewport renderer: text buffer + scroll offset -> one full repaint.
//!
//! Frame layout: clear screen, cursor home, then exactly `rows` rows separated
//! by CR LF (no trailing separator). Row `r` shows buffer line
//! `offset.y + r`, or nothing when that index is outside the buffer.
//!
//! Per row, with `offset.x`:
//! * negative: `-offset.x` blank columns first (clipped to the row budget);
//! * positive: glyphs starting left of `offset.x` are not emitted. A wide
//!   glyph straddling the left edge leaves its visible part blank.
//!
//! Emission stops at the first glyph that would overflow `columns`. Control
//! characters (C0, DEL, C1) are zero width, never measured and never emitted.

use crate::viewport::Viewport;
use anyhow::Result;
use core_state::ScrollOffset;
use core_terminal::ansi::{CLEAR_SCREEN, CRLF, CURSOR_HOME};
use core_text::width::is_control_code_point;
use core_text::{GlyphWidth, TextBuffer, glyphs};
use std::iter::repeat_n;
use tracing::trace;

#[derive(Debug)]
pub struct ViewportRenderer {
    viewport: Viewport,
    frames: u64,
}

impl ViewportRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frames: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render<W: GlyphWidth>(
        &mut self,
        buffer: &TextBuffer,
        offset: ScrollOffset,
        widths: &mut W,
    ) -> Result<Vec<u8>> {
        let frame = render_frame(buffer, self.viewport, offset, widths)?;
        self.frames += 1;
        trace!(
            target: "render",
            frame = self.frames,
            bytes = frame.len(),
            x = offset.x,
            y = offset.y,
            "frame_built"
        );
        Ok(frame)
    }
}

/// Build the display bytes for one full repaint.
pub fn render_frame<W: GlyphWidth>(
    buffer: &TextBuffer,
    viewport: Viewport,
    offset: ScrollOffset,
    widths: &mut W,
) -> Result<Vec<u8>> {
    let row_bytes = usize::from(viewport.columns) + CRLF.len();
    let mut out = Vec::with_capacity(
        CLEAR_SCREEN.len() + CURSOR_HOME.len() + usize::from(viewport.rows) * row_bytes,
    );
    out.extend_from_slice(CLEAR_SCREEN);
    out.extend_from_slice(CURSOR_HOME);
    for row in 0..viewport.rows {
        if row > 0 {
            out.extend_from_slice(CRLF);
        }
        let idx = offset.y.saturating_add(row as isize);
        if let Some(line) = buffer.line_at(idx) {
            render_line(&mut out, line, viewport.columns, offset.x, widths)?;
        }
    }
    Ok(out)
}

/// Append one clipped line to `out`; returns the screen columns used.
pub fn render_line<W: GlyphWidth>(
    out: &mut Vec<u8>,
    line: &[u8],
    columns: u16,
    scroll_x: isize,
    widths: &mut W,
) -> Result<u16> {
    let budget = usize::from(columns);
    let mut used = 0usize;
    if scroll_x < 0 {
        let pad = scroll_x.unsigned_abs().min(budget);
        out.extend(repeat_n(b' ', pad));
        used = pad;
    }
    let hidden = scroll_x.max(0).unsigned_abs();

    let mut pos = 0usize;
    for glyph in glyphs(line) {
        if is_control_code_point(glyph.value) {
            continue;
        }
        let width = usize::from(widths.width_of(glyph.value)?);
        let start = pos;
        pos += width;
        if start < hidden {
            if pos > hidden {
                let partial = (pos - hidden).min(budget - used);
                out.extend(repeat_n(b' ', partial));
                used += partial;
            }
            continue;
        }
        if used + width > budget {
            break;
        }
        out.extend_from_slice(glyph.display_bytes());
        used += width;
    }
    Ok(used as u16)
}
