//! Field descriptors and the primitive codec for a single record member.

use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::types::{Endianness, Type};
use crate::value::Value;

/// Path from a record root to one of its members, by member index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// A member of the record itself.
    Direct(usize),
    /// A member reached through the nested record at the given index.
    Nested(usize, Box<FieldRef>),
}

impl FieldRef {
    /// Builds a reference from a non-empty index path.
    pub fn path(indices: &[usize]) -> Option<Self> {
        let (&last, parents) = indices.split_last()?;
        Some(
            parents
                .iter()
                .rev()
                .fold(FieldRef::Direct(last), |inner, &index| {
                    FieldRef::Nested(index, Box::new(inner))
                }),
        )
    }

    /// Index of the first hop, within the record the reference is relative to.
    pub fn head(&self) -> usize {
        match self {
            FieldRef::Direct(index) | FieldRef::Nested(index, _) => *index,
        }
    }

    /// The full index path.
    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                FieldRef::Direct(index) => {
                    out.push(*index);
                    return out;
                }
                FieldRef::Nested(index, inner) => {
                    out.push(*index);
                    cur = inner;
                }
            }
        }
    }

    /// Walks `root` along the path, following present references.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        match self {
            FieldRef::Direct(index) => root.member(*index),
            FieldRef::Nested(index, inner) => inner.resolve(root.member(*index)?),
        }
    }

    /// Walks the descriptor tree along the path.
    pub fn resolve_field<'a>(&self, fields: &'a Fields) -> Option<&'a Field> {
        match self {
            FieldRef::Direct(index) => fields.get(*index),
            FieldRef::Nested(index, inner) => {
                inner.resolve_field(fields.get(*index)?.nested.as_ref()?)
            }
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.indices())
    }
}

/// Metadata for one record member.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Member name, used in diagnostics.
    pub name: String,
    /// Element type, or [`Type::Struct`] for a nested record.
    pub ty: Type,
    /// Byte order of the primitive encoding.
    pub order: Endianness,
    /// Declared element count. Zero means none was declared.
    pub len: usize,
    /// Variable-length container sized from its live value.
    pub slice: bool,
    /// Fixed-length container of `len` elements.
    pub array: bool,
    /// The member is an optional reference.
    pub ptr: bool,
    /// Another member whose integer value is this member's element count.
    pub size_from: Option<FieldRef>,
    /// Another member whose length this member encodes.
    pub size_of: Option<FieldRef>,
    /// False for members that are skipped entirely.
    pub writable: bool,
    /// Descriptors for a nested record.
    pub nested: Option<Fields>,
}

impl Field {
    /// Creates a scalar field. `String` fields start as variable containers.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        let string = ty == Type::String;
        Self {
            name: name.into(),
            ty,
            order: Endianness::default(),
            len: if string { 0 } else { 1 },
            slice: string,
            array: false,
            ptr: false,
            size_from: None,
            size_of: None,
            writable: true,
            nested: None,
        }
    }

    /// Creates a nested-record field described by `fields`.
    pub fn record(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            nested: Some(fields),
            ..Self::new(name, Type::Struct)
        }
    }

    /// Sets the byte order.
    pub fn order(mut self, order: Endianness) -> Self {
        self.order = order;
        self
    }

    /// Makes this a fixed-length container of `len` elements.
    pub fn array(mut self, len: usize) -> Self {
        self.array = true;
        self.slice = false;
        self.len = len;
        self
    }

    /// Makes this a variable-length container.
    pub fn slice(mut self) -> Self {
        self.slice = true;
        self.array = false;
        self.len = 0;
        self
    }

    /// Marks the member as an optional reference.
    pub fn pointer(mut self) -> Self {
        self.ptr = true;
        self
    }

    /// Takes the element count from another member.
    pub fn size_from(mut self, target: FieldRef) -> Self {
        self.size_from = Some(target);
        self
    }

    /// Encodes the length of another member instead of this member's value.
    pub fn size_of(mut self, target: FieldRef) -> Self {
        self.size_of = Some(target);
        self
    }

    /// Excludes the member from sizing, packing and unpacking.
    pub fn skip(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Returns true if the value is a sequence of elements.
    pub fn is_container(&self) -> bool {
        self.slice || self.array
    }

    /// Byte length this field occupies for `value`.
    pub fn size(&self, value: &Value) -> usize {
        let value = value.deref();
        let length = if self.slice && self.len == 0 {
            value.element_count().unwrap_or(0)
        } else {
            self.len.max(1)
        };
        match (&self.nested, self.ty) {
            (Some(nested), Type::Struct) => {
                if value.is_absent() {
                    length * nested.sizeof(&nested.zero_value())
                } else {
                    length * nested.sizeof(value)
                }
            }
            _ => length * self.ty.size(),
        }
    }

    /// Writes `length` elements of `value` into `buf`, returning the bytes written.
    ///
    /// Scalars ignore `length` and write one element. Fixed containers always
    /// write `length` elements, zero-filling missing ones; variable containers
    /// write their live elements, at most `length` of them.
    pub fn pack(&self, buf: &mut [u8], value: &Value, length: usize) -> Result<usize> {
        let width = self.ty.size();
        match self.ty {
            Type::Struct => return Err(Error::unsupported_type(&self.name, self.ty)),
            Type::Pad => {
                let dst = self.window(buf, length)?;
                dst.fill(0);
                return Ok(length);
            }
            _ => {}
        }

        let value = value.deref();
        if !self.is_container() {
            let dst = self.window(buf, width)?;
            self.encode_element(value, dst)?;
            return Ok(width);
        }

        match value {
            Value::Bytes(_) | Value::Str(_) if width == 1 && self.ty != Type::Bool => {
                let src: &[u8] = match value {
                    Value::Bytes(b) => b,
                    Value::Str(s) => s.as_bytes(),
                    _ => &[],
                };
                let count = self.count(length, src.len());
                let dst = self.window(buf, count)?;
                let copied = count.min(src.len());
                dst[..copied].copy_from_slice(&src[..copied]);
                dst[copied..].fill(0);
                Ok(count)
            }
            Value::Array(items) => {
                let count = self.count(length, items.len());
                let dst = self.window(buf, count * width)?;
                for (i, chunk) in dst.chunks_exact_mut(width).enumerate() {
                    match items.get(i) {
                        Some(item) => self.encode_element(item, chunk)?,
                        None => chunk.fill(0),
                    }
                }
                Ok(count * width)
            }
            Value::Ptr(None) => {
                let count = self.count(length, 0);
                let dst = self.window(buf, count * width)?;
                dst.fill(0);
                Ok(count * width)
            }
            _ => Err(Error::type_mismatch(&self.name, format!("[]{}", self.ty))),
        }
    }

    /// Decodes `length` elements from `buf` into `value`.
    pub fn unpack(&self, buf: &[u8], value: &mut Value, length: usize) -> Result<()> {
        let width = self.ty.size();
        match self.ty {
            Type::Struct => return Err(Error::unsupported_type(&self.name, self.ty)),
            Type::Pad => return Ok(()),
            _ => {}
        }

        let slot = value.deref_mut();
        if !self.is_container() {
            if buf.len() < width {
                return Err(Error::short_read(width));
            }
            *slot = self.decode_element(&buf[..width]);
            return Ok(());
        }

        let needed = length
            .checked_mul(width)
            .ok_or_else(|| Error::custom(format!("field {}: {} elements overflow", self.name, length)))?;
        if buf.len() < needed {
            return Err(Error::short_read(needed));
        }
        let src = &buf[..needed];
        *slot = match self.ty {
            Type::String => {
                Value::Str(String::from_utf8(src.to_vec()).map_err(|_| Error::InvalidUtf8)?)
            }
            Type::Uint8 => Value::Bytes(src.to_vec()),
            _ => Value::Array(
                src.chunks_exact(width)
                    .map(|chunk| self.decode_element(chunk))
                    .collect(),
            ),
        };
        Ok(())
    }

    /// The zero value of this member, as a freshly derived record would hold it.
    pub fn zero_value(&self) -> Value {
        if self.ptr {
            Value::Ptr(None)
        } else {
            self.zero_target()
        }
    }

    /// The zero value of the referenced type, for materializing an absent reference.
    pub fn zero_target(&self) -> Value {
        let fixed = if self.array { self.len } else { 0 };
        match self.ty {
            Type::Struct => match &self.nested {
                Some(nested) => nested.zero_value(),
                None => Value::Struct(Vec::new()),
            },
            Type::Pad => Value::Bytes(vec![0; self.len]),
            Type::String => Value::Str("\0".repeat(fixed)),
            Type::Uint8 if self.is_container() => Value::Bytes(vec![0; fixed]),
            _ if self.is_container() => Value::Array(vec![zero_scalar(self.ty); fixed]),
            _ => zero_scalar(self.ty),
        }
    }

    fn count(&self, length: usize, live: usize) -> usize {
        if self.array {
            length
        } else {
            length.min(live)
        }
    }

    fn window<'b>(&self, buf: &'b mut [u8], needed: usize) -> Result<&'b mut [u8]> {
        let available = buf.len();
        buf.get_mut(..needed)
            .ok_or_else(|| Error::buffer_too_short(needed, available))
    }

    fn encode_element(&self, value: &Value, dst: &mut [u8]) -> Result<()> {
        let encoded = match self.order {
            Endianness::Big => encode_scalar::<BigEndian>(self.ty, value, dst),
            Endianness::Little => encode_scalar::<LittleEndian>(self.ty, value, dst),
        };
        encoded.ok_or_else(|| Error::type_mismatch(&self.name, self.ty))
    }

    fn decode_element(&self, src: &[u8]) -> Value {
        match self.order {
            Endianness::Big => decode_scalar::<BigEndian>(self.ty, src),
            Endianness::Little => decode_scalar::<LittleEndian>(self.ty, src),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        if !self.writable {
            return f.write_str("-");
        }
        if self.ptr {
            f.write_str("*")?;
        }
        if self.array {
            write!(f, "[{}]", self.len)?;
        } else if self.slice && self.ty != Type::String {
            f.write_str("[]")?;
        }
        match &self.nested {
            Some(nested) => write!(f, "{}", nested)?,
            None => write!(f, "{}", self.ty)?,
        }
        if self.order == Endianness::Little {
            f.write_str(" little")?;
        }
        if let Some(target) = &self.size_from {
            write!(f, " sizefrom={}", target)?;
        }
        if let Some(target) = &self.size_of {
            write!(f, " sizeof={}", target)?;
        }
        Ok(())
    }
}

fn zero_scalar(ty: Type) -> Value {
    match ty {
        Type::Bool => Value::Bool(false),
        Type::Int8 => Value::I8(0),
        Type::Uint8 => Value::U8(0),
        Type::Int16 => Value::I16(0),
        Type::Uint16 => Value::U16(0),
        Type::Int32 => Value::I32(0),
        Type::Uint32 => Value::U32(0),
        Type::Int64 => Value::I64(0),
        Type::Uint64 => Value::U64(0),
        Type::Float32 => Value::F32(0.0),
        Type::Float64 => Value::F64(0.0),
        Type::Pad | Type::String => Value::Bytes(Vec::new()),
        Type::Struct => Value::Struct(Vec::new()),
    }
}

/// Encodes one element of `ty` into `dst`, which is exactly `ty.size()` long.
/// Returns `None` when `value` cannot represent `ty`.
fn encode_scalar<B: ByteOrder>(ty: Type, value: &Value, dst: &mut [u8]) -> Option<()> {
    match ty {
        Type::Bool => dst[0] = value.as_bool()? as u8,
        Type::Int8 => dst[0] = value.as_i64()? as i8 as u8,
        Type::Uint8 | Type::String => dst[0] = value.as_i64()? as u8,
        Type::Int16 => B::write_i16(dst, value.as_i64()? as i16),
        Type::Uint16 => B::write_u16(dst, value.as_i64()? as u16),
        Type::Int32 => B::write_i32(dst, value.as_i64()? as i32),
        Type::Uint32 => B::write_u32(dst, value.as_i64()? as u32),
        Type::Int64 => B::write_i64(dst, value.as_i64()?),
        Type::Uint64 => B::write_u64(dst, value.as_i64()? as u64),
        Type::Float32 => B::write_f32(dst, value.as_f64()? as f32),
        Type::Float64 => B::write_f64(dst, value.as_f64()?),
        Type::Pad => dst.fill(0),
        Type::Struct => return None,
    }
    Some(())
}

/// Decodes one element of `ty` from `src`, which is exactly `ty.size()` long.
fn decode_scalar<B: ByteOrder>(ty: Type, src: &[u8]) -> Value {
    match ty {
        Type::Bool => Value::Bool(src[0] != 0),
        Type::Int8 => Value::I8(src[0] as i8),
        Type::Uint8 | Type::String => Value::U8(src[0]),
        Type::Int16 => Value::I16(B::read_i16(src)),
        Type::Uint16 => Value::U16(B::read_u16(src)),
        Type::Int32 => Value::I32(B::read_i32(src)),
        Type::Uint32 => Value::U32(B::read_u32(src)),
        Type::Int64 => Value::I64(B::read_i64(src)),
        Type::Uint64 => Value::U64(B::read_u64(src)),
        Type::Float32 => Value::F32(B::read_f32(src)),
        Type::Float64 => Value::F64(B::read_f64(src)),
        Type::Pad => Value::Bytes(src.to_vec()),
        Type::Struct => Value::Struct(Vec::new()),
    }
}
