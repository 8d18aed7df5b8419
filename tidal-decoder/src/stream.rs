//! Decoded stream model
//!
//! A [`Stream`] is the public result of decoding: a timestamp sequence plus one
//! typed [`Column`] per schema field. Column storage is contiguous and flat;
//! record `i` of a field with `k` elements per record occupies elements
//! `i * k .. (i + 1) * k`. Matrix elements are stored row-major.
//!
//! Row-oriented access goes through [`Record`], a borrowed view that yields
//! each field by name with its shape preserved as a [`Value`].

use crate::types::{Field, FieldShape, ScalarKind};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::fmt;

/// A single element value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::U8(v) => write!(f, "{}", v),
            Scalar::I8(v) => write!(f, "{}", v),
            Scalar::U16(v) => write!(f, "{}", v),
            Scalar::I16(v) => write!(f, "{}", v),
            Scalar::U32(v) => write!(f, "{}", v),
            Scalar::I32(v) => write!(f, "{}", v),
            Scalar::U64(v) => write!(f, "{}", v),
            Scalar::I64(v) => write!(f, "{}", v),
            Scalar::F32(v) => write!(f, "{}", v),
            Scalar::F64(v) => write!(f, "{}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// The value of one field in one record, shaped like its field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Vector(Vec<Scalar>),
    /// Outer vector holds rows
    Matrix(Vec<Vec<Scalar>>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_list(f: &mut fmt::Formatter<'_>, items: &[Scalar]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, "]")
        }

        match self {
            Value::Scalar(v) => write!(f, "{}", v),
            Value::Vector(items) => write_list(f, items),
            Value::Matrix(rows) => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_list(f, row)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Contiguous typed storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
}

macro_rules! typed_slice_accessors {
    ($($method:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Elements as `&[", stringify!($ty), "]` if this column holds that type")]
            pub fn $method(&self) -> Option<&[$ty]> {
                match self {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }
        )*
    };
}

impl ColumnData {
    /// Empty storage for `kind` with room for `capacity` elements
    pub(crate) fn with_capacity(kind: ScalarKind, capacity: usize) -> Self {
        match kind {
            ScalarKind::U8 => ColumnData::U8(Vec::with_capacity(capacity)),
            ScalarKind::I8 => ColumnData::I8(Vec::with_capacity(capacity)),
            ScalarKind::U16 => ColumnData::U16(Vec::with_capacity(capacity)),
            ScalarKind::I16 => ColumnData::I16(Vec::with_capacity(capacity)),
            ScalarKind::U32 => ColumnData::U32(Vec::with_capacity(capacity)),
            ScalarKind::I32 => ColumnData::I32(Vec::with_capacity(capacity)),
            ScalarKind::U64 => ColumnData::U64(Vec::with_capacity(capacity)),
            ScalarKind::I64 => ColumnData::I64(Vec::with_capacity(capacity)),
            ScalarKind::F32 => ColumnData::F32(Vec::with_capacity(capacity)),
            ScalarKind::F64 => ColumnData::F64(Vec::with_capacity(capacity)),
            ScalarKind::Bool => ColumnData::Bool(Vec::with_capacity(capacity)),
        }
    }

    /// Decode little-endian elements from `bytes` and append them
    ///
    /// `bytes.len()` must be a multiple of the element width.
    pub(crate) fn extend_from_le_bytes(&mut self, bytes: &[u8]) {
        match self {
            ColumnData::U8(v) => v.extend_from_slice(bytes),
            ColumnData::I8(v) => v.extend(bytes.iter().map(|&b| b as i8)),
            ColumnData::U16(v) => v.extend(bytes.chunks_exact(2).map(LittleEndian::read_u16)),
            ColumnData::I16(v) => v.extend(bytes.chunks_exact(2).map(LittleEndian::read_i16)),
            ColumnData::U32(v) => v.extend(bytes.chunks_exact(4).map(LittleEndian::read_u32)),
            ColumnData::I32(v) => v.extend(bytes.chunks_exact(4).map(LittleEndian::read_i32)),
            ColumnData::U64(v) => v.extend(bytes.chunks_exact(8).map(LittleEndian::read_u64)),
            ColumnData::I64(v) => v.extend(bytes.chunks_exact(8).map(LittleEndian::read_i64)),
            ColumnData::F32(v) => v.extend(bytes.chunks_exact(4).map(LittleEndian::read_f32)),
            ColumnData::F64(v) => v.extend(bytes.chunks_exact(8).map(LittleEndian::read_f64)),
            ColumnData::Bool(v) => v.extend(bytes.iter().map(|&b| b != 0)),
        }
    }

    /// Total number of elements (records × elements per record)
    pub fn len(&self) -> usize {
        match self {
            ColumnData::U8(v) => v.len(),
            ColumnData::I8(v) => v.len(),
            ColumnData::U16(v) => v.len(),
            ColumnData::I16(v) => v.len(),
            ColumnData::U32(v) => v.len(),
            ColumnData::I32(v) => v.len(),
            ColumnData::U64(v) => v.len(),
            ColumnData::I64(v) => v.len(),
            ColumnData::F32(v) => v.len(),
            ColumnData::F64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at flat index `index`
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            ColumnData::U8(v) => v.get(index).copied().map(Scalar::U8),
            ColumnData::I8(v) => v.get(index).copied().map(Scalar::I8),
            ColumnData::U16(v) => v.get(index).copied().map(Scalar::U16),
            ColumnData::I16(v) => v.get(index).copied().map(Scalar::I16),
            ColumnData::U32(v) => v.get(index).copied().map(Scalar::U32),
            ColumnData::I32(v) => v.get(index).copied().map(Scalar::I32),
            ColumnData::U64(v) => v.get(index).copied().map(Scalar::U64),
            ColumnData::I64(v) => v.get(index).copied().map(Scalar::I64),
            ColumnData::F32(v) => v.get(index).copied().map(Scalar::F32),
            ColumnData::F64(v) => v.get(index).copied().map(Scalar::F64),
            ColumnData::Bool(v) => v.get(index).copied().map(Scalar::Bool),
        }
    }

    typed_slice_accessors! {
        as_u8 => U8: u8,
        as_i8 => I8: i8,
        as_u16 => U16: u16,
        as_i16 => I16: i16,
        as_u32 => U32: u32,
        as_i32 => I32: i32,
        as_u64 => U64: u64,
        as_i64 => I64: i64,
        as_f32 => F32: f32,
        as_f64 => F64: f64,
        as_bool => Bool: bool,
    }
}

/// All values of one field across a stream
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    field: Field,
    rows: usize,
    data: ColumnData,
}

impl Column {
    pub(crate) fn new(field: Field, rows: usize, data: ColumnData) -> Self {
        Self { field, rows, data }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn shape(&self) -> FieldShape {
        self.field.shape
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Flat element storage
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Number of records in this column
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of record `row`, shaped like the field
    ///
    /// Zero-extent vectors and matrices yield empty values for every row.
    pub fn value(&self, row: usize) -> Option<Value> {
        if row >= self.rows {
            return None;
        }
        let per_row = self.field.shape.element_count();
        let start = row * per_row;
        let elements = |from: usize, count: usize| -> Option<Vec<Scalar>> {
            (from..from + count).map(|i| self.data.get(i)).collect()
        };

        match self.field.shape {
            FieldShape::Scalar { .. } => self.data.get(start).map(Value::Scalar),
            FieldShape::Vector { size, .. } => elements(start, size as usize).map(Value::Vector),
            FieldShape::Matrix { .. } if per_row == 0 => Some(Value::Matrix(Vec::new())),
            FieldShape::Matrix { rows, cols, .. } => {
                let cols = cols as usize;
                (0..rows as usize)
                    .map(|r| elements(start + r * cols, cols))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Matrix)
            }
        }
    }
}

/// A decoded stream: timestamps plus one column per field
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    name: String,
    timestamps: Vec<u64>,
    columns: Vec<Column>,
}

impl Stream {
    pub(crate) fn new(name: String, timestamps: Vec<u64>, columns: Vec<Column>) -> Self {
        Self {
            name,
            timestamps,
            columns,
        }
    }

    /// Stream name as declared in its metadata record
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Record timestamps in file order
    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    /// Field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Field descriptors in schema order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.columns.iter().map(Column::field)
    }

    /// Columns in schema order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column of the field called `name`
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Row view of record `index`
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        (index < self.len()).then_some(Record {
            stream: self,
            index,
        })
    }

    /// Row views of all records in file order
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.len()).map(move |index| Record {
            stream: self,
            index,
        })
    }
}

/// Borrowed view of one record of a stream
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    stream: &'a Stream,
    index: usize,
}

impl<'a> Record<'a> {
    pub fn timestamp(&self) -> u64 {
        self.stream.timestamps[self.index]
    }

    /// Value of the field called `name`
    pub fn get(&self, name: &str) -> Option<Value> {
        self.stream.column(name)?.value(self.index)
    }

    /// (field name, value) pairs in schema order
    pub fn values(&self) -> impl Iterator<Item = (&'a str, Value)> + 'a {
        let (stream, index) = (self.stream, self.index);
        stream
            .columns
            .iter()
            .filter_map(move |c| c.value(index).map(|v| (c.name(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_column() -> Column {
        let field = Field::new(
            "m",
            FieldShape::Matrix {
                kind: ScalarKind::I16,
                rows: 2,
                cols: 3,
            },
        );
        let mut data = ColumnData::with_capacity(ScalarKind::I16, 12);
        let bytes: Vec<u8> = (1i16..=12).flat_map(|v| v.to_le_bytes()).collect();
        data.extend_from_le_bytes(&bytes);
        Column::new(field, 2, data)
    }

    #[test]
    fn test_extend_from_le_bytes() {
        let mut data = ColumnData::with_capacity(ScalarKind::F32, 2);
        let bytes: Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        data.extend_from_le_bytes(&bytes);
        assert_eq!(data.as_f32(), Some(&[1.5f32, -2.0][..]));
        assert_eq!(data.as_f64(), None);

        let mut flags = ColumnData::with_capacity(ScalarKind::Bool, 3);
        flags.extend_from_le_bytes(&[0, 1, 2]);
        assert_eq!(flags.as_bool(), Some(&[false, true, true][..]));
    }

    #[test]
    fn test_matrix_values_are_row_major() {
        let column = matrix_column();
        assert_eq!(column.len(), 2);

        let expected = Value::Matrix(vec![
            vec![Scalar::I16(7), Scalar::I16(8), Scalar::I16(9)],
            vec![Scalar::I16(10), Scalar::I16(11), Scalar::I16(12)],
        ]);
        assert_eq!(column.value(1), Some(expected));
        assert_eq!(column.value(2), None);
    }

    #[test]
    fn test_value_display() {
        let column = matrix_column();
        assert_eq!(
            column.value(0).unwrap().to_string(),
            "[[1, 2, 3], [4, 5, 6]]"
        );
        assert_eq!(Value::Vector(vec![Scalar::U8(1), Scalar::U8(2)]).to_string(), "[1, 2]");
        assert_eq!(Value::Scalar(Scalar::Bool(true)).to_string(), "true");
    }

    #[test]
    fn test_record_view() {
        let mut ints = ColumnData::with_capacity(ScalarKind::I32, 2);
        ints.extend_from_le_bytes(&[42, 0, 0, 0, 12, 0, 0, 0]);
        let stream = Stream::new(
            "stuff".to_string(),
            vec![4000, 4001],
            vec![Column::new(
                Field::new("my_ints", FieldShape::Scalar { kind: ScalarKind::I32 }),
                2,
                ints,
            )],
        );

        let record = stream.record(1).unwrap();
        assert_eq!(record.timestamp(), 4001);
        assert_eq!(record.get("my_ints"), Some(Value::Scalar(Scalar::I32(12))));
        assert_eq!(record.get("missing"), None);
        assert!(stream.record(2).is_none());

        let values: Vec<_> = stream
            .records()
            .flat_map(|r| r.values().collect::<Vec<_>>())
            .collect();
        assert_eq!(
            values,
            vec![
                ("my_ints", Value::Scalar(Scalar::I32(42))),
                ("my_ints", Value::Scalar(Scalar::I32(12))),
            ]
        );
    }

    #[test]
    fn test_zero_extent_vector_has_empty_values() {
        let field = Field::new("none", FieldShape::Vector { kind: ScalarKind::U8, size: 0 });
        let column = Column::new(field, 3, ColumnData::with_capacity(ScalarKind::U8, 0));
        assert_eq!(column.len(), 3);
        assert_eq!(column.value(2), Some(Value::Vector(Vec::new())));
        assert_eq!(column.value(3), None);
    }

    #[test]
    fn test_zero_column_matrix_is_empty() {
        let field = Field::new(
            "wide",
            FieldShape::Matrix {
                kind: ScalarKind::F64,
                rows: u32::MAX,
                cols: 0,
            },
        );
        let column = Column::new(field, 2, ColumnData::with_capacity(ScalarKind::F64, 0));
        assert_eq!(column.value(1), Some(Value::Matrix(Vec::new())));
        assert_eq!(column.value(2), None);
    }
}
