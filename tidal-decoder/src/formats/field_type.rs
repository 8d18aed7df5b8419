//! Field type grammar
//!
//! A field descriptor starts with a one-byte type tag:
//! - tags 0-10 are scalar kinds and carry no further bytes
//! - tag 11 (vector) is followed by a scalar tag and a `u32` size
//! - tag 12 (matrix) is followed by a scalar tag, `u32` rows and `u32` cols
//!
//! Composite shapes hold scalars only; a vector or matrix tag in the nested
//! position is rejected like any other unknown tag.

use super::cursor::ByteCursor;
use crate::types::{DecoderError, FieldShape, Result, ScalarKind};
use std::io::BufRead;

/// Type tag introducing a fixed-length vector
pub const VECTOR_TAG: u8 = 11;
/// Type tag introducing a fixed-extent matrix
pub const MATRIX_TAG: u8 = 12;

/// Read a type tag and the extents that follow it
pub fn read_field_shape<R: BufRead>(cursor: &mut ByteCursor<R>) -> Result<FieldShape> {
    let tag_offset = cursor.offset();
    let tag = cursor.read_u8()?;
    decode_field_shape(tag, tag_offset, cursor)
}

/// Resolve an already-read type tag into a field shape
///
/// `tag_offset` is where the tag was read and is only used for diagnostics.
pub fn decode_field_shape<R: BufRead>(
    tag: u8,
    tag_offset: u64,
    cursor: &mut ByteCursor<R>,
) -> Result<FieldShape> {
    match tag {
        VECTOR_TAG => {
            let kind = read_scalar_kind(cursor)?;
            let size = cursor.read_u32()?;
            Ok(FieldShape::Vector { kind, size })
        }
        MATRIX_TAG => {
            let kind = read_scalar_kind(cursor)?;
            let rows = cursor.read_u32()?;
            let cols = cursor.read_u32()?;
            Ok(FieldShape::Matrix { kind, rows, cols })
        }
        _ => ScalarKind::from_tag(tag)
            .map(|kind| FieldShape::Scalar { kind })
            .ok_or(DecoderError::UnsupportedDataType {
                tag,
                offset: tag_offset,
            }),
    }
}

fn read_scalar_kind<R: BufRead>(cursor: &mut ByteCursor<R>) -> Result<ScalarKind> {
    let offset = cursor.offset();
    let tag = cursor.read_u8()?;
    ScalarKind::from_tag(tag).ok_or(DecoderError::UnsupportedDataType { tag, offset })
}
