//! Host record handling for Trailgate.
//!
//! Everything between the host's opaque batch buffer and a normalized,
//! timestamped record lives here:
//!
//! - [`RawValue`]: untyped host values, including raw bytes
//! - [`normalize`]: conversion to a string-keyed JSON map
//! - [`resolve_timestamp`]: native/epoch/fallback time resolution
//! - [`BatchDecoder`] and [`Records`]: lazy iteration over a batch
//! - [`render_record`]: forensic rendering for skip diagnostics

mod decoder;
mod json;
mod render;
mod timestamp;
mod value;

pub use decoder::{BatchDecoder, DecodeStatus, DecodedRecord, MemoryDecoder, Records};
pub use json::JsonBatchDecoder;
pub use render::render_record;
pub use timestamp::{resolve_timestamp, HostTimestamp};
pub use value::{normalize, NormalizeError, NormalizedRecord, RawValue};
