//! Wire-level decoding.
//!
//! The only codec in this crate is [`RequestLineDecoder`]: exactly one
//! request line is decoded per connection, nothing is ever encoded.

mod line_decoder;

pub use line_decoder::{MAX_LINE_BYTES, MethodPolicy, RequestLineDecoder};
