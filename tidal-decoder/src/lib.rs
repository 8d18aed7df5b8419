//! Tidal Log Decoder Library
//!
//! Decodes tidal binary telemetry logs into named, typed, time-indexed streams.
//!
//! # Architecture
//!
//! A log is a flat sequence of marker-prefixed records. Each stream announces
//! its schema once (name plus ordered, typed fields), then any number of
//! timestamped data records follow, interleaved with other streams. Decoding
//! is a single eager pass:
//! - The byte cursor reads markers until a clean end of file
//! - Metadata records build a `Schema` per stream id
//! - Data records are demultiplexed into raw per-stream buffers
//! - At end of file, buffers are materialized into typed `Stream` columns
//!
//! Any malformation aborts the whole pass; there is no partial result.
//!
//! The library does NOT:
//! - Write or modify logs
//! - Decode files that are still being written
//! - Validate the meaning of recorded values
//!
//! # Example Usage
//!
//! ```no_run
//! use tidal_decoder::{DecoderConfig, Parser, WireFormat};
//!
//! let log = Parser::open("/tmp/meh.bin").unwrap();
//!
//! if let Some(stream) = log.get("stuff") {
//!     for record in stream.records() {
//!         for (field, value) in record.values() {
//!             println!("{} {}: {}", record.timestamp(), field, value);
//!         }
//!     }
//! }
//!
//! // Logs from the older producer revision carry names in a separate record
//! let config = DecoderConfig::new().with_wire_format(WireFormat::SplitLabels);
//! let legacy = Parser::open_with_config("/tmp/old.bin", config).unwrap();
//! println!("{} streams", legacy.len());
//! ```

// Public modules
pub mod config;
pub mod formats;
pub mod parser;
pub mod stream;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, WireFormat};
pub use parser::{ParseStats, Parser};
pub use stream::{Column, ColumnData, Record, Scalar, Stream, Value};
pub use types::{
    DecoderError, Field, FieldLayout, FieldShape, Result, ScalarKind, Schema, StreamId,
};

// Internal modules (not exposed in public API)
mod demux;
mod materialize;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
