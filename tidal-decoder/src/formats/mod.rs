//! Wire format readers
//!
//! This module contains the byte-level pieces of the decoder: the cursor that
//! performs all I/O, the field type grammar, and the stream metadata reader.
//! Record markers for both producer revisions are defined here.

use crate::config::WireFormat;

pub mod cursor;
pub mod field_type;
pub mod metadata;

// Re-export reader types
pub use cursor::ByteCursor;
pub use field_type::read_field_shape;
pub use metadata::{read_field_labels, read_stream_metadata};

/// Stream metadata marker (consolidated revision, names inline)
pub const STREAM_METADATA_MARKER: u8 = 0xC3;
/// Data record marker (both revisions)
pub const DATA_MARKER: u8 = 0xA5;
/// Stream metadata marker of the split-labels revision (no field names)
pub const SPLIT_METADATA_MARKER: u8 = 0x81;
/// Labels record marker of the split-labels revision
pub const LABELS_MARKER: u8 = 0xC3;

/// Kind of record announced by a marker byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Stream schema; `named_fields` is false for the split-labels revision
    StreamMetadata { named_fields: bool },
    /// Field names for a previously announced stream
    Labels,
    /// Timestamped payload for a previously announced stream
    Data,
}

impl Marker {
    /// Resolve a marker byte under the given wire revision
    ///
    /// Returns `None` for bytes that are not a marker in that revision.
    pub fn from_byte(byte: u8, format: WireFormat) -> Option<Self> {
        match (format, byte) {
            (_, DATA_MARKER) => Some(Marker::Data),
            (WireFormat::Consolidated, STREAM_METADATA_MARKER) => {
                Some(Marker::StreamMetadata { named_fields: true })
            }
            (WireFormat::SplitLabels, SPLIT_METADATA_MARKER) => {
                Some(Marker::StreamMetadata { named_fields: false })
            }
            (WireFormat::SplitLabels, LABELS_MARKER) => Some(Marker::Labels),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consolidated_markers() {
        let format = WireFormat::Consolidated;
        assert_eq!(
            Marker::from_byte(0xC3, format),
            Some(Marker::StreamMetadata { named_fields: true })
        );
        assert_eq!(Marker::from_byte(0xA5, format), Some(Marker::Data));
        assert_eq!(Marker::from_byte(0x81, format), None);
        assert_eq!(Marker::from_byte(0x00, format), None);
    }

    #[test]
    fn test_split_label_markers() {
        let format = WireFormat::SplitLabels;
        assert_eq!(
            Marker::from_byte(0x81, format),
            Some(Marker::StreamMetadata { named_fields: false })
        );
        assert_eq!(Marker::from_byte(0xC3, format), Some(Marker::Labels));
        assert_eq!(Marker::from_byte(0xA5, format), Some(Marker::Data));
        assert_eq!(Marker::from_byte(0xFF, format), None);
    }

    #[test]
    fn test_every_other_byte_is_rejected() {
        for byte in 0..=u8::MAX {
            let expected = matches!(byte, 0xC3 | 0xA5);
            assert_eq!(
                Marker::from_byte(byte, WireFormat::Consolidated).is_some(),
                expected,
                "byte 0x{:02X}",
                byte
            );
        }
    }
}
