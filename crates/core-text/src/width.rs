//! Glyph display width oracle.
//!
//! Width precedence:
//! 1. ASCII fast path: printable = 1, control = 0. No terminal I/O. C1
//!    controls (U+0080..U+009F) are likewise 0 without I/O.
//! 2. Width cache hit.
//! 3. Cold code point: measured, then cached. With [`WidthStrategy::Probe`]
//!    the terminal is asked directly (hide cursor, home, cursor report, write
//!    the glyph, cursor report, take the column difference). With
//!    [`WidthStrategy::Table`] the static `unicode-width` table answers.
//!
//! A probe whose cursor report is missing or malformed yields width 0 and
//! leaves the cache untouched, so the code point is probed again on its next
//! occurrence. Terminal device failures propagate.
//!
//! Invariant: once cached, a code point keeps its width for the session.

use ahash::AHashMap;
use anyhow::Result;
use core_terminal::ansi::{CURSOR_HIDE, CURSOR_HOME};
use core_terminal::{CursorPosition, CursorReportError, TermError, TerminalIo, query_cursor_position};
use serde::Deserialize;
use tracing::{debug, warn};

/// Anything that can answer "how many columns does this code point take".
pub trait GlyphWidth {
    fn width_of(&mut self, code_point: u32) -> Result<u16>;
}

/// Where cold code point widths come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthStrategy {
    #[default]
    Probe,
    Table,
}

/// Code point -> measured column width. Grows lazily, never evicts.
#[derive(Debug, Clone, Default)]
pub struct WidthCache {
    widths: AHashMap<u32, u16>,
}

impl WidthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code_point: u32) -> Option<u16> {
        self.widths.get(&code_point).copied()
    }

    pub fn insert(&mut self, code_point: u32, width: u16) {
        self.widths.insert(code_point, width);
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

impl FromIterator<(u32, u16)> for WidthCache {
    fn from_iter<I: IntoIterator<Item = (u32, u16)>>(iter: I) -> Self {
        Self {
            widths: iter.into_iter().collect(),
        }
    }
}

/// Width of an ASCII code point, `None` for anything else.
#[inline]
pub fn ascii_width(code_point: u32) -> Option<u16> {
    if code_point >= 0x80 {
        return None;
    }
    let printable = (0x20..0x7f).contains(&code_point);
    Some(u16::from(printable))
}

/// C0, DEL or C1 control code point.
#[inline]
pub fn is_control_code_point(code_point: u32) -> bool {
    char::from_u32(code_point).is_some_and(char::is_control)
}

#[derive(Debug, Default)]
pub struct GlyphWidthOracle {
    cache: WidthCache,
    strategy: WidthStrategy,
    probes: u64,
}

impl GlyphWidthOracle {
    pub fn new(strategy: WidthStrategy) -> Self {
        Self::with_cache(WidthCache::new(), strategy)
    }

    /// Oracle starting from a pre-seeded cache.
    pub fn with_cache(cache: WidthCache, strategy: WidthStrategy) -> Self {
        Self {
            cache,
            strategy,
            probes: 0,
        }
    }

    pub fn cache(&self) -> &WidthCache {
        &self.cache
    }

    pub fn strategy(&self) -> WidthStrategy {
        self.strategy
    }

    /// Number of terminal probes performed so far.
    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// Pair the oracle with a terminal for one render pass.
    pub fn bind<'a, T: TerminalIo>(&'a mut self, term: &'a mut T) -> BoundOracle<'a, T> {
        BoundOracle { oracle: self, term }
    }

    pub fn width_of<T: TerminalIo>(&mut self, code_point: u32, term: &mut T) -> Result<u16> {
        if let Some(w) = ascii_width(code_point) {
            return Ok(w);
        }
        if is_control_code_point(code_point) {
            return Ok(0);
        }
        if let Some(w) = self.cache.get(code_point) {
            return Ok(w);
        }
        let Some(ch) = char::from_u32(code_point) else {
            return Ok(0);
        };
        let measured = match self.strategy {
            WidthStrategy::Table => Some(table_width(ch)),
            WidthStrategy::Probe => self.probe(ch, term)?,
        };
        match measured {
            Some(w) => {
                self.cache.insert(code_point, w);
                Ok(w)
            }
            None => Ok(0),
        }
    }

    /// Measure `ch` on the terminal. `Ok(None)` on a soft report failure.
    fn probe<T: TerminalIo>(&mut self, ch: char, term: &mut T) -> Result<Option<u16>> {
        self.probes += 1;
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf).as_bytes();

        term.write_all(CURSOR_HIDE)
            .and_then(|_| term.write_all(CURSOR_HOME))
            .map_err(TermError::Write)?;
        let Some(start) = soft_report(query_cursor_position(term), ch)? else {
            return Ok(None);
        };
        term.write_all(encoded).map_err(TermError::Write)?;
        let Some(end) = soft_report(query_cursor_position(term), ch)? else {
            return Ok(None);
        };

        if end.row != start.row || end.column < start.column {
            warn!(
                target: "text.width",
                code_point = ch as u32,
                ?start,
                ?end,
                "probe_cursor_moved_unexpectedly"
            );
            return Ok(None);
        }
        let width = end.column - start.column;
        debug!(target: "text.width", code_point = ch as u32, width, "probed");
        Ok(Some(width))
    }
}

fn soft_report(
    report: Result<CursorPosition, CursorReportError>,
    ch: char,
) -> Result<Option<CursorPosition>> {
    match report {
        Ok(pos) => Ok(Some(pos)),
        Err(e) if e.is_soft() => {
            warn!(target: "text.width", code_point = ch as u32, error = %e, "probe_report_failed");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn table_width(ch: char) -> u16 {
    unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0) as u16
}

/// An oracle borrowed together with the terminal it probes.
pub struct BoundOracle<'a, T> {
    oracle: &'a mut GlyphWidthOracle,
    term: &'a mut T,
}

impl<T: TerminalIo> GlyphWidth for BoundOracle<'_, T> {
    fn width_of(&mut self, code_point: u32) -> Result<u16> {
        self.oracle.width_of(code_point, &mut *self.term)
    }
}
