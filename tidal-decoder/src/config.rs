//! Decoder configuration types
//!
//! The decoder needs almost no configuration: the log is self-describing. The
//! one choice a caller has to make is which producer revision wrote the file,
//! because the two revisions are not wire-compatible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Producer-side revision of the wire format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// One metadata record (0xC3) carries types and field names
    #[default]
    Consolidated,
    /// Metadata (0x81) carries types only; a labels record (0xC3) names the fields
    SplitLabels,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Consolidated => write!(f, "consolidated"),
            WireFormat::SplitLabels => write!(f, "split_labels"),
        }
    }
}

/// Configuration for the decoder library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Wire revision the log was written with
    #[serde(default)]
    pub wire_format: WireFormat,
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: select the wire revision
    pub fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_consolidated() {
        let config = DecoderConfig::new();
        assert_eq!(config.wire_format, WireFormat::Consolidated);
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::new().with_wire_format(WireFormat::SplitLabels);
        assert_eq!(config.wire_format, WireFormat::SplitLabels);
        assert_eq!(config.wire_format.to_string(), "split_labels");
    }
}
