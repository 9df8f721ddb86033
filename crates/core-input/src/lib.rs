//! Raw terminal input: byte stream decoding, key classification and
//! diagnostic key labels.

mod classify;
mod decoder;
pub mod labels;

pub use classify::{classify, classify_polled};
pub use decoder::InputDecoder;
pub use labels::{KeyLabel, describe, describe_bytes, key_label};
