//! Main parser API
//!
//! This module provides the primary interface for the decoder library.
//! A [`Parser`] decodes a whole log eagerly on construction and then serves
//! read-only lookups of the resulting streams by name.

use crate::config::{DecoderConfig, WireFormat};
use crate::demux::{self, PendingStream, StreamTable};
use crate::formats::{self, ByteCursor, Marker};
use crate::materialize::materialize;
use crate::stream::Stream;
use crate::types::{DecoderError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Counters collected during one decode pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub metadata_records: usize,
    pub label_records: usize,
    pub data_records: usize,
    /// Metadata records that replaced an existing schema
    pub schema_replacements: usize,
    pub bytes_read: u64,
    pub num_streams: usize,
}

/// A fully decoded log file
///
/// # Example
/// ```no_run
/// use tidal_decoder::Parser;
///
/// let log = Parser::open("/tmp/meh.bin").unwrap();
/// for (name, stream) in log.iter() {
///     println!("{}: {} records", name, stream.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    /// Decoded streams in declaration order
    streams: Vec<Stream>,
    by_name: HashMap<String, usize>,
    stats: ParseStats,
}

impl Parser {
    /// Open and decode a log file using the default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, DecoderConfig::default())
    }

    /// Open and decode a log file
    ///
    /// # Arguments
    /// * `path` - Path to the log file
    /// * `config` - Decoder configuration (wire revision)
    ///
    /// # Returns
    /// * `Result<Parser>` - every stream in the file, or the first decode error
    pub fn open_with_config(path: impl AsRef<Path>, config: DecoderConfig) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening log file: {:?}", path);

        let file = File::open(path)?;
        Self::decode(BufReader::new(file), config)
    }

    /// Decode a log from an already-open byte source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_config(reader, DecoderConfig::default())
    }

    /// Decode a log from an already-open byte source
    pub fn from_reader_with_config<R: Read>(reader: R, config: DecoderConfig) -> Result<Self> {
        Self::decode(BufReader::new(reader), config)
    }

    fn decode<R: BufRead>(reader: R, config: DecoderConfig) -> Result<Self> {
        log::debug!("Decoding with {} wire format", config.wire_format);

        let mut pass = DecodePass::new(reader, config.wire_format);
        pass.run()?;
        let (streams, stats) = pass.finish();

        log::info!(
            "Decoded {} streams from {} data records ({} bytes)",
            stats.num_streams,
            stats.data_records,
            stats.bytes_read
        );
        let by_name = streams
            .iter()
            .enumerate()
            .map(|(position, stream)| (stream.name().to_string(), position))
            .collect();
        Ok(Self {
            streams,
            by_name,
            stats,
        })
    }

    /// Look up a stream by its declared name
    pub fn get(&self, name: &str) -> Option<&Stream> {
        self.by_name.get(name).map(|&position| &self.streams[position])
    }

    /// Stream names in the order streams were first declared
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(Stream::name)
    }

    /// (name, stream) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stream)> {
        self.streams.iter().map(|stream| (stream.name(), stream))
    }

    /// Streams in declaration order
    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Counters from the decode pass
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Take ownership of the decoded streams, in declaration order
    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }
}

impl std::ops::Index<&str> for Parser {
    type Output = Stream;

    /// Panics if no stream has this name; use [`Parser::get`] otherwise
    fn index(&self, name: &str) -> &Stream {
        match self.get(name) {
            Some(stream) => stream,
            None => panic!("no stream named '{}'", name),
        }
    }
}

impl<'a> IntoIterator for &'a Parser {
    type Item = &'a Stream;
    type IntoIter = std::slice::Iter<'a, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.iter()
    }
}

/// State of one scan over a byte source
///
/// Whole records are consumed per loop iteration, so between iterations the
/// pass is always at a record boundary.
struct DecodePass<R: BufRead> {
    cursor: ByteCursor<R>,
    format: WireFormat,
    streams: StreamTable,
    stats: ParseStats,
}

impl<R: BufRead> DecodePass<R> {
    fn new(reader: R, format: WireFormat) -> Self {
        Self {
            cursor: ByteCursor::new(reader),
            format,
            streams: StreamTable::new(),
            stats: ParseStats::default(),
        }
    }

    /// Dispatch records until a clean end of file
    fn run(&mut self) -> Result<()> {
        loop {
            let marker_offset = self.cursor.offset();
            let Some(byte) = self.cursor.read_marker()? else {
                return Ok(());
            };

            match Marker::from_byte(byte, self.format) {
                Some(Marker::StreamMetadata { named_fields }) => self.read_metadata(named_fields)?,
                Some(Marker::Labels) => self.read_labels()?,
                Some(Marker::Data) => {
                    demux::read_data_record(&mut self.cursor, &mut self.streams)?;
                    self.stats.data_records += 1;
                }
                None => {
                    return Err(DecoderError::InvalidMarker {
                        marker: byte,
                        offset: marker_offset,
                    })
                }
            }
        }
    }

    fn read_metadata(&mut self, named_fields: bool) -> Result<()> {
        let (stream_id, schema) = formats::read_stream_metadata(&mut self.cursor, named_fields)?;
        log::debug!(
            "Stream {} '{}': {} fields, {} bytes per record",
            stream_id,
            schema.name,
            schema.fields().len(),
            schema.byte_width()
        );

        if let Some(previous) = self.streams.insert(stream_id, PendingStream::new(schema)) {
            log::debug!(
                "Stream {} schema replaced; discarding {} buffered records",
                stream_id,
                previous.accumulator.records
            );
            self.stats.schema_replacements += 1;
        }
        self.stats.metadata_records += 1;
        Ok(())
    }

    fn read_labels(&mut self) -> Result<()> {
        let id_offset = self.cursor.offset();
        let stream_id = self.cursor.read_u32()?;
        let pending = self
            .streams
            .get_mut(stream_id)
            .ok_or(DecoderError::UnknownStreamId {
                stream_id,
                offset: id_offset,
            })?;

        let names = formats::read_field_labels(&mut self.cursor, pending.schema.fields().len())?;
        log::debug!("Stream {} labels: {:?}", stream_id, names);
        pending.schema.rename_fields(names);

        self.stats.label_records += 1;
        Ok(())
    }

    fn finish(self) -> (Vec<Stream>, ParseStats) {
        let mut stats = self.stats;
        stats.bytes_read = self.cursor.offset();

        let streams = materialize(self.streams);
        stats.num_streams = streams.len();
        (streams, stats)
    }
}
