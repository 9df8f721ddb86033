use std::io;
use thiserror::Error;

/// Terminal device failures. All of these are fatal to the session.
#[derive(Debug, Error)]
pub enum TermError {
    #[error("read from terminal failed")]
    Read(#[source] io::Error),
    #[error("write to terminal failed")]
    Write(#[source] io::Error),
    #[error("terminal attribute change failed")]
    Attributes(#[source] io::Error),
    #[error("terminal size query failed")]
    Size(#[source] io::Error),
    #[error("terminal input closed")]
    Disconnected,
}

/// Failure to obtain a cursor position report.
///
/// `Missing` and `Malformed` are soft: the terminal simply did not answer in a
/// usable way. `Terminal` wraps a device failure and stays fatal.
#[derive(Debug, Error)]
pub enum CursorReportError {
    #[error("no cursor position report received")]
    Missing,
    #[error("malformed cursor position report {0:?}")]
    Malformed(String),
    #[error(transparent)]
    Terminal(#[from] TermError),
}

impl CursorReportError {
    pub fn is_soft(&self) -> bool {
        !matches!(self, CursorReportError::Terminal(_))
    }
}
