//! Viewport dimensions.
//!
//! Read once at startup from the terminal; resize is not tracked.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub columns: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }
}

impl From<(u16, u16)> for Viewport {
    fn from((columns, rows): (u16, u16)) -> Self {
        Self::new(columns, rows)
    }
}
