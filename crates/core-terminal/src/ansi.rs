//! Screen control codes written by the renderer and the width probe.

pub const ESC: u8 = 0x1b;

pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";

/// Row separator inside a frame.
pub const CRLF: &[u8] = b"\r\n";
