//! Test-only log writer
//!
//! Encodes records in the same layout a producer would, so integration tests
//! can build logs byte by byte.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;
use tidal_decoder::{FieldShape, ScalarKind};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn scalar(kind: ScalarKind) -> FieldShape {
    FieldShape::Scalar { kind }
}

pub fn vector(kind: ScalarKind, size: u32) -> FieldShape {
    FieldShape::Vector { kind, size }
}

pub fn matrix(kind: ScalarKind, rows: u32, cols: u32) -> FieldShape {
    FieldShape::Matrix { kind, rows, cols }
}

#[derive(Debug, Default)]
pub struct LogWriter {
    bytes: Vec<u8>,
}

impl LogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consolidated metadata record (types and names inline)
    pub fn stream(&mut self, stream_id: u32, name: &str, fields: &[(FieldShape, &str)]) -> &mut Self {
        self.bytes.push(0xC3);
        self.header(stream_id, name, fields.len());
        for (shape, field_name) in fields {
            self.shape(shape);
            self.cstring(field_name);
        }
        self
    }

    /// Split-labels metadata record (types only)
    pub fn split_stream(&mut self, stream_id: u32, name: &str, shapes: &[FieldShape]) -> &mut Self {
        self.bytes.push(0x81);
        self.header(stream_id, name, shapes.len());
        for shape in shapes {
            self.shape(shape);
        }
        self
    }

    /// Split-labels field names record
    pub fn labels(&mut self, stream_id: u32, names: &[&str]) -> &mut Self {
        self.bytes.push(0xC3);
        self.bytes.extend_from_slice(&stream_id.to_le_bytes());
        for name in names {
            self.cstring(name);
        }
        self
    }

    pub fn record(&mut self, stream_id: u32, timestamp: u64, payload: &[u8]) -> &mut Self {
        self.bytes.push(0xA5);
        self.bytes.extend_from_slice(&stream_id.to_le_bytes());
        self.bytes.extend_from_slice(&timestamp.to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_temp_file(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn header(&mut self, stream_id: u32, name: &str, field_count: usize) {
        self.bytes.extend_from_slice(&stream_id.to_le_bytes());
        self.cstring(name);
        self.bytes.extend_from_slice(&(field_count as u32).to_le_bytes());
    }

    fn shape(&mut self, shape: &FieldShape) {
        match *shape {
            FieldShape::Scalar { kind } => self.bytes.push(kind.tag()),
            FieldShape::Vector { kind, size } => {
                self.bytes.extend_from_slice(&[11, kind.tag()]);
                self.bytes.extend_from_slice(&size.to_le_bytes());
            }
            FieldShape::Matrix { kind, rows, cols } => {
                self.bytes.extend_from_slice(&[12, kind.tag()]);
                self.bytes.extend_from_slice(&rows.to_le_bytes());
                self.bytes.extend_from_slice(&cols.to_le_bytes());
            }
        }
    }

    fn cstring(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
    }
}

/// Little-endian payload builder
#[derive(Debug, Default)]
pub struct Payload(Vec<u8>);

macro_rules! payload_push {
    ($($method:ident: $ty:ty),*) => {
        $(
            pub fn $method(mut self, value: $ty) -> Self {
                self.0.extend_from_slice(&value.to_le_bytes());
                self
            }
        )*
    };
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    payload_push!(u8: u8, i8: i8, u16: u16, i16: i16, u32: u32, i32: i32, u64: u64, i64: i64, f32: f32, f64: f64);

    pub fn bool(mut self, value: bool) -> Self {
        self.0.push(value as u8);
        self
    }

    pub fn f64s(self, values: &[f64]) -> Self {
        values.iter().fold(self, |p, v| p.f64(*v))
    }

    pub fn f32s(self, values: &[f32]) -> Self {
        values.iter().fold(self, |p, v| p.f32(*v))
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}
