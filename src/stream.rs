//! Streaming support for packed records.
//!
//! Records are written back to back with no framing: the descriptor list alone
//! decides how many bytes each record occupies.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use binstruc::stream::{StreamReader, StreamWriter};
//! use binstruc::{Field, Fields, Result, Type, Value};
//!
//! fn main() -> Result<()> {
//!     let fields = Fields::new(vec![Field::new("id", Type::Uint16)])?;
//!
//!     let mut buffer = Vec::new();
//!     {
//!         let mut stream = StreamWriter::new(&mut buffer);
//!         stream.write_record(&fields, &Value::Struct(vec![Value::U16(1)]))?;
//!         stream.write_record(&fields, &Value::Struct(vec![Value::U16(2)]))?;
//!         stream.flush()?;
//!     }
//!
//!     let mut stream = StreamReader::new(Cursor::new(&buffer));
//!     let mut record = fields.zero_value();
//!     let mut ids = Vec::new();
//!     while stream.try_read_record(&fields, &mut record)? {
//!         ids.push(record.member(0).cloned());
//!     }
//!     assert_eq!(ids, vec![Some(Value::U16(1)), Some(Value::U16(2))]);
//!     Ok(())
//! }
//! ```

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::value::Value;

/// Default buffer capacity for stream readers/writers.
const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// StreamWriter packs records onto a byte stream.
pub struct StreamWriter<W: Write> {
    inner: BufWriter<W>,
    scratch: Vec<u8>,
}

impl<W: Write> StreamWriter<W> {
    /// Creates a new StreamWriter wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, writer)
    }

    /// Creates a new StreamWriter with the specified buffer capacity.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, writer),
            scratch: Vec::new(),
        }
    }

    /// Packs `value` with `fields` and writes the bytes.
    pub fn write_record(&mut self, fields: &Fields, value: &Value) -> Result<()> {
        self.scratch.clear();
        self.scratch.resize(fields.sizeof(value), 0);
        let written = fields.pack(&mut self.scratch, value)?;
        self.inner
            .write_all(&self.scratch[..written])
            .map_err(Error::from)
    }

    /// Flushes the underlying buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::from)
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Consumes this StreamWriter, returning the underlying writer.
    ///
    /// Buffered data is flushed first; a flush failure is returned as an error.
    pub fn into_inner(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::from(e.into_error()))
    }
}

/// StreamReader unpacks consecutive records from a byte stream.
pub struct StreamReader<R: Read> {
    inner: BufReader<R>,
}

impl<R: Read> StreamReader<R> {
    /// Creates a new StreamReader wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, reader)
    }

    /// Creates a new StreamReader with the specified buffer capacity.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, reader),
        }
    }

    /// Unpacks the next record into `value`.
    ///
    /// Returns an error if the stream ends before the record is complete.
    pub fn read_record(&mut self, fields: &Fields, value: &mut Value) -> Result<()> {
        fields.unpack(&mut self.inner, value)
    }

    /// Unpacks the next record, returning `false` if the stream is already at EOF.
    ///
    /// A stream that ends partway through a record is still an error.
    pub fn try_read_record(&mut self, fields: &Fields, value: &mut Value) -> Result<bool> {
        if self.inner.fill_buf().map_err(Error::from)?.is_empty() {
            return Ok(false);
        }
        self.read_record(fields, value)?;
        Ok(true)
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }
}
