//! Cursor-position protocol: write `ESC [ 6 n`, read back `ESC [ <row> ; <col> R`.

use crate::ansi::CURSOR_POSITION_QUERY;
use crate::{CursorReportError, TermError, TerminalIo};

/// Longest report we are willing to scan before giving up.
const MAX_REPORT_LEN: usize = 31;

/// 1-based cursor position as reported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: u16,
    pub column: u16,
}

/// Ask the terminal where the cursor is.
///
/// Success and failure are reported explicitly; a response that does not
/// parse completely is a failure even if it contains plausible numbers.
pub fn query_cursor_position<T: TerminalIo>(
    term: &mut T,
) -> Result<CursorPosition, CursorReportError> {
    term.write_all(CURSOR_POSITION_QUERY)
        .and_then(|_| term.flush())
        .map_err(TermError::Write)?;

    let mut report = Vec::with_capacity(MAX_REPORT_LEN);
    while report.len() < MAX_REPORT_LEN {
        match term.read_byte()? {
            Some(b) => {
                report.push(b);
                if b == b'R' {
                    break;
                }
            }
            None => break,
        }
    }
    if report.is_empty() {
        return Err(CursorReportError::Missing);
    }
    parse_cursor_report(&report)
}

/// Parse a complete `ESC [ <row> ; <col> R` report.
pub fn parse_cursor_report(report: &[u8]) -> Result<CursorPosition, CursorReportError> {
    let malformed = || CursorReportError::Malformed(String::from_utf8_lossy(report).into_owned());
    let body = report
        .strip_prefix(b"\x1b[")
        .and_then(|rest| rest.strip_suffix(b"R"))
        .ok_or_else(malformed)?;
    let mut parts = body.splitn(2, |b| *b == b';');
    let row = parts.next().and_then(parse_decimal).ok_or_else(malformed)?;
    let column = parts.next().and_then(parse_decimal).ok_or_else(malformed)?;
    Ok(CursorPosition { row, column })
}

fn parse_decimal(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
