//! Materialization of accumulated bytes into typed streams
//!
//! Runs once, after the dispatch loop has reached a clean end of file. Each
//! payload row is cut into per-field byte ranges using the schema's offset
//! table; each range is decoded into that field's typed column.

use crate::demux::{PendingStream, StreamTable};
use crate::stream::{Column, ColumnData, Stream};
use crate::types::TIMESTAMP_WIDTH;
use byteorder::{ByteOrder, LittleEndian};
use std::collections::HashMap;

/// Convert every pending stream into a [`Stream`]
///
/// Streams come out in the order their ids were first declared. If two ids
/// share a name, the later-declared one replaces the earlier one's value but
/// keeps its position.
pub(crate) fn materialize(streams: StreamTable) -> Vec<Stream> {
    let mut output: Vec<Stream> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (stream_id, pending) in streams {
        let stream = materialize_stream(pending);
        log::debug!(
            "Materialized stream {} '{}' with {} records",
            stream_id,
            stream.name(),
            stream.len()
        );

        match by_name.get(stream.name()).copied() {
            Some(position) => {
                log::warn!(
                    "Stream name '{}' is declared more than once; stream id {} replaces the earlier one",
                    stream.name(),
                    stream_id
                );
                output[position] = stream;
            }
            None => {
                by_name.insert(stream.name().to_string(), output.len());
                output.push(stream);
            }
        }
    }

    output
}

fn materialize_stream(pending: PendingStream) -> Stream {
    let PendingStream {
        schema,
        accumulator,
    } = pending;
    let rows = accumulator.records;

    let timestamps: Vec<u64> = accumulator
        .timestamps
        .chunks_exact(TIMESTAMP_WIDTH)
        .map(LittleEndian::read_u64)
        .collect();

    let mut data: Vec<ColumnData> = schema
        .fields()
        .iter()
        .map(|f| ColumnData::with_capacity(f.shape.kind(), rows * f.shape.element_count()))
        .collect();

    let width = schema.byte_width();
    if width > 0 {
        for row in accumulator.payload.chunks_exact(width) {
            for (column, layout) in data.iter_mut().zip(schema.layout()) {
                column.extend_from_le_bytes(&row[layout.offset..layout.offset + layout.width]);
            }
        }
    }

    let columns = schema
        .fields()
        .iter()
        .cloned()
        .zip(data)
        .map(|(field, data)| Column::new(field, rows, data))
        .collect();

    Stream::new(schema.name, timestamps, columns)
}
