//! Terminal boundary: raw mode, byte-level stdin, screen control codes and the
//! cursor-position protocol.
//!
//! Everything above this crate talks to the terminal through two seams:
//! * [`ByteSource`]: one byte at a time, `Ok(None)` once the configured
//!   inter-byte timeout elapses without input.
//! * `std::io::Write`: fire-and-forget output.
//!
//! [`TerminalIo`] is the combination of both and is what the width probe needs
//! (it writes a query and reads the answer back from the same device).

use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

pub mod ansi;
pub mod cursor;
mod error;
mod pump;
#[cfg(any(test, feature = "testing"))]
pub mod script;

pub use cursor::{CursorPosition, parse_cursor_report, query_cursor_position};
pub use error::{CursorReportError, TermError};
pub use pump::StdinPump;

/// Source of raw input bytes.
pub trait ByteSource {
    /// Next byte, or `Ok(None)` when nothing arrived within the read timeout.
    fn read_byte(&mut self) -> Result<Option<u8>, TermError>;
}

/// A device that can both be read byte-wise and written to.
pub trait TerminalIo: ByteSource + Write {}

impl<T: ByteSource + Write> TerminalIo for T {}

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<(), TermError>;
    fn leave(&mut self) -> Result<(), TermError>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>, TermError> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<(), TermError> {
        if !self.entered {
            enable_raw_mode().map_err(TermError::Attributes)?;
            execute!(stdout(), EnterAlternateScreen).map_err(TermError::Write)?;
            self.entered = true;
            tracing::debug!(target: "terminal", "raw_mode_entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<(), TermError> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show).map_err(TermError::Write)?;
            disable_raw_mode().map_err(TermError::Attributes)?;
            self.entered = false;
            tracing::debug!(target: "terminal", "raw_mode_left");
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

/// Viewport dimensions as `(columns, rows)`, queried once at startup.
pub fn viewport_size() -> Result<(u16, u16), TermError> {
    crossterm::terminal::size().map_err(TermError::Size)
}

/// The live terminal: stdin through a [`StdinPump`], output straight to stdout.
pub struct Terminal {
    input: StdinPump,
    output: Stdout,
}

impl Terminal {
    /// Start reading stdin. `byte_timeout` is the inter-byte timeout that lets
    /// the decoder tell a lone ESC from the start of a sequence.
    pub fn open(byte_timeout: Duration) -> Self {
        Self {
            input: StdinPump::spawn(byte_timeout),
            output: stdout(),
        }
    }
}

impl ByteSource for Terminal {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        self.input.read_byte()
    }
}

impl Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
