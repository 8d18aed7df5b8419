//! Data record demultiplexing
//!
//! Data records for different streams are interleaved in the file. The
//! demultiplexer copies each record's timestamp and payload bytes, untouched,
//! into the accumulator of the stream it belongs to. Interpretation happens
//! later, once, in the materializer.

use crate::formats::ByteCursor;
use crate::types::{DecoderError, Result, Schema, StreamId, TIMESTAMP_WIDTH};
use std::collections::HashMap;
use std::io::BufRead;

/// Raw bytes collected for one stream during the decode pass
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    pub timestamps: Vec<u8>,
    pub payload: Vec<u8>,
    pub records: usize,
}

/// A stream whose schema is known but whose data is still raw
#[derive(Debug)]
pub(crate) struct PendingStream {
    pub schema: Schema,
    pub accumulator: Accumulator,
}

impl PendingStream {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            accumulator: Accumulator::default(),
        }
    }
}

/// Schema table and accumulators keyed by stream id
///
/// Iterates in the order stream ids were first declared. Replacing the schema
/// of a known id keeps that id's position.
#[derive(Debug, Default)]
pub(crate) struct StreamTable {
    entries: Vec<(StreamId, PendingStream)>,
    index: HashMap<StreamId, usize>,
}

impl StreamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `pending` for `stream_id`, returning the stream it replaced
    pub fn insert(&mut self, stream_id: StreamId, pending: PendingStream) -> Option<PendingStream> {
        match self.index.get(&stream_id).copied() {
            Some(position) => Some(std::mem::replace(&mut self.entries[position].1, pending)),
            None => {
                self.index.insert(stream_id, self.entries.len());
                self.entries.push((stream_id, pending));
                None
            }
        }
    }

    pub fn get_mut(&mut self, stream_id: StreamId) -> Option<&mut PendingStream> {
        let position = *self.index.get(&stream_id)?;
        Some(&mut self.entries[position].1)
    }
}

impl IntoIterator for StreamTable {
    type Item = (StreamId, PendingStream);
    type IntoIter = std::vec::IntoIter<(StreamId, PendingStream)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Read one data record body and append it to its stream's accumulator
///
/// Returns the stream id the record belonged to.
pub(crate) fn read_data_record<R: BufRead>(
    cursor: &mut ByteCursor<R>,
    streams: &mut StreamTable,
) -> Result<StreamId> {
    let id_offset = cursor.offset();
    let stream_id = cursor.read_u32()?;

    let pending = streams
        .get_mut(stream_id)
        .ok_or(DecoderError::UnknownStreamId {
            stream_id,
            offset: id_offset,
        })?;

    let width = pending.schema.byte_width();
    let accumulator = &mut pending.accumulator;
    cursor.read_exact_into(TIMESTAMP_WIDTH, &mut accumulator.timestamps)?;
    if let Err(e) = cursor.read_exact_into(width, &mut accumulator.payload) {
        // keep both buffers a whole number of records long
        let len = accumulator.timestamps.len() - TIMESTAMP_WIDTH;
        accumulator.timestamps.truncate(len);
        return Err(e);
    }
    accumulator.records += 1;

    log::trace!(
        "Data record for stream {} ({} payload bytes)",
        stream_id,
        width
    );
    Ok(stream_id)
}
