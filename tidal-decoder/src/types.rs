//! Core types for the tidal log decoder library
//!
//! This module defines the schema model that streams announce in a log file
//! (scalar kinds, field shapes, fields and schemas) together with the error type
//! shared by every stage of the decoder.

use serde::Serialize;
use std::fmt;

/// Producer-assigned identifier of one stream within a log file
pub type StreamId = u32;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Width in bytes of the timestamp carried by every data record
pub const TIMESTAMP_WIDTH: usize = 8;

/// Errors that can occur during decoding
///
/// Every variant is fatal: the decode pass stops at the first error and no
/// streams are produced.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Unexpected end of stream at byte {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEndOfStream {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("Unterminated string starting at byte {offset}")]
    UnterminatedString { offset: u64 },

    #[error("Invalid UTF-8 in string starting at byte {offset}: {source}")]
    InvalidUtf8 {
        offset: u64,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Unsupported data type tag {tag} at byte {offset}")]
    UnsupportedDataType { tag: u8, offset: u64 },

    #[error("Invalid marker 0x{marker:02X} at byte {offset}")]
    InvalidMarker { marker: u8, offset: u64 },

    #[error("Data for unknown stream id {stream_id} at byte {offset}")]
    UnknownStreamId { stream_id: StreamId, offset: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Primitive element types a field can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Bool,
}

impl ScalarKind {
    /// All scalar kinds in wire tag order (tag 0 through 10)
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::U8,
        ScalarKind::I8,
        ScalarKind::U16,
        ScalarKind::I16,
        ScalarKind::U32,
        ScalarKind::I32,
        ScalarKind::U64,
        ScalarKind::I64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Bool,
    ];

    /// Resolve a wire type tag to a scalar kind, if the tag names one
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Wire type tag of this scalar kind
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Size of one element in bytes
    pub fn width(self) -> usize {
        match self {
            ScalarKind::U8 | ScalarKind::I8 | ScalarKind::Bool => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::U64 | ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::U8 => "u8",
            ScalarKind::I8 => "i8",
            ScalarKind::U16 => "u16",
            ScalarKind::I16 => "i16",
            ScalarKind::U32 => "u32",
            ScalarKind::I32 => "i32",
            ScalarKind::U64 => "u64",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Shape of one field: a single scalar, a fixed-length vector or a fixed-extent matrix
///
/// Composite shapes always hold scalars; they never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum FieldShape {
    Scalar { kind: ScalarKind },
    Vector { kind: ScalarKind, size: u32 },
    Matrix { kind: ScalarKind, rows: u32, cols: u32 },
}

impl FieldShape {
    /// Scalar kind of every element in this shape
    pub fn kind(&self) -> ScalarKind {
        match *self {
            FieldShape::Scalar { kind }
            | FieldShape::Vector { kind, .. }
            | FieldShape::Matrix { kind, .. } => kind,
        }
    }

    /// Number of scalar elements one record holds for this shape
    pub fn element_count(&self) -> usize {
        match *self {
            FieldShape::Scalar { .. } => 1,
            FieldShape::Vector { size, .. } => size as usize,
            FieldShape::Matrix { rows, cols, .. } => (rows as usize).saturating_mul(cols as usize),
        }
    }

    /// Size in bytes of this field inside one data record
    ///
    /// Saturates instead of overflowing; an absurd extent then surfaces as a
    /// truncated record rather than a panic.
    pub fn byte_width(&self) -> usize {
        self.kind().width().saturating_mul(self.element_count())
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldShape::Scalar { kind } => write!(f, "{}", kind),
            FieldShape::Vector { kind, size } => write!(f, "{}[{}]", kind, size),
            FieldShape::Matrix { kind, rows, cols } => write!(f, "{}[{}x{}]", kind, rows, cols),
        }
    }
}

/// A named field of a stream schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name as declared by the producer
    pub name: String,
    /// Element type and extents
    pub shape: FieldShape,
}

impl Field {
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// Byte range one field occupies inside a data record payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub offset: usize,
    pub width: usize,
}

/// Schema announced by a stream metadata record
///
/// Field order is both the logical column order and the physical byte layout of
/// one record. The offset table is computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Stream name
    pub name: String,
    fields: Vec<Field>,
    #[serde(skip)]
    layout: Vec<FieldLayout>,
    #[serde(skip)]
    byte_width: usize,
}

impl Schema {
    /// Build a schema and its per-field offset table
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let mut offset = 0;
        let layout = fields
            .iter()
            .map(|field| {
                let width = field.shape.byte_width();
                let entry = FieldLayout { offset, width };
                offset = offset.saturating_add(width);
                entry
            })
            .collect();

        Self {
            name: name.into(),
            fields,
            layout,
            byte_width: offset,
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Byte range of each field, parallel to `fields()`
    pub fn layout(&self) -> &[FieldLayout] {
        &self.layout
    }

    /// Size in bytes of one data record payload
    pub fn byte_width(&self) -> usize {
        self.byte_width
    }

    /// Rename fields in declaration order, leaving the layout untouched
    pub(crate) fn rename_fields(&mut self, names: Vec<String>) {
        for (field, name) in self.fields.iter_mut().zip(names) {
            field.name = name;
        }
    }
}
