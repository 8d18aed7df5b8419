//! Stream metadata records
//!
//! Body layout (after the marker):
//! `stream_id:u32`, `name:cstring`, `field_count:u32`, then one descriptor per
//! field. In the consolidated revision each descriptor is a type followed by the
//! field name; in the split-labels revision it is the type alone, and names
//! arrive later in a labels record.

use super::cursor::ByteCursor;
use super::field_type::read_field_shape;
use crate::types::{Field, Result, Schema, StreamId};
use std::io::BufRead;

/// Read one stream metadata record body
///
/// With `named_fields == false` the fields get placeholder names `f0`, `f1`, ...
pub fn read_stream_metadata<R: BufRead>(
    cursor: &mut ByteCursor<R>,
    named_fields: bool,
) -> Result<(StreamId, Schema)> {
    let stream_id = cursor.read_u32()?;
    let name = cursor.read_cstring()?;
    let field_count = cursor.read_u32()?;

    // field_count comes from the file; let the vector grow with real descriptors
    let mut fields = Vec::new();
    for index in 0..field_count {
        let shape = read_field_shape(cursor)?;
        let field_name = if named_fields {
            cursor.read_cstring()?
        } else {
            format!("f{}", index)
        };
        fields.push(Field::new(field_name, shape));
    }

    Ok((stream_id, Schema::new(name, fields)))
}

/// Read `count` field names of a labels record (after its stream id)
pub fn read_field_labels<R: BufRead>(
    cursor: &mut ByteCursor<R>,
    count: usize,
) -> Result<Vec<String>> {
    (0..count).map(|_| cursor.read_cstring()).collect()
}
