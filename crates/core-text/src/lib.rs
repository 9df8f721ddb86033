//! Text model and glyph metrics: the line buffer, lenient UTF-8 walking and
//! the display width oracle.

pub mod buffer;
pub mod glyph;
pub mod width;

pub use buffer::TextBuffer;
pub use glyph::{Glyph, glyphs};
pub use width::{BoundOracle, GlyphWidth, GlyphWidthOracle, WidthCache, WidthStrategy};
