//! Dynamic record values.
//!
//! A record is a [`Value::Struct`] whose members are index-aligned with the
//! [`crate::Fields`] describing it. Descriptors, not values, decide the wire
//! layout; a value only has to carry data the descriptor can encode.

/// A live record member.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Byte slice or byte array.
    Bytes(Vec<u8>),
    /// Text string.
    Str(String),
    /// Sequence of scalar elements.
    Array(Vec<Value>),
    /// Nested record.
    Struct(Vec<Value>),
    /// Optional reference; `None` is absent.
    Ptr(Option<Box<Value>>),
}

impl Value {
    /// Follows present references down to the concrete value.
    pub fn deref(&self) -> &Value {
        let mut val = self;
        while let Value::Ptr(Some(inner)) = val {
            val = inner;
        }
        val
    }

    /// Mutable counterpart of [`Value::deref`].
    pub fn deref_mut(&mut self) -> &mut Value {
        let mut val = self;
        while let Value::Ptr(Some(inner)) = val {
            val = inner;
        }
        val
    }

    /// Returns true for an absent reference.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Ptr(None))
    }

    /// Returns the member at `index` of a record.
    pub fn member(&self, index: usize) -> Option<&Value> {
        match self.deref() {
            Value::Struct(members) => members.get(index),
            _ => None,
        }
    }

    /// Returns the mutable member at `index` of a record.
    pub fn member_mut(&mut self, index: usize) -> Option<&mut Value> {
        match self.deref_mut() {
            Value::Struct(members) => members.get_mut(index),
            _ => None,
        }
    }

    /// Returns the integer content as i64, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match *self.deref() {
            Value::I8(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Returns the numeric content as f64, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match *self.deref() {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            Value::U64(v) => Some(v as f64),
            ref other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Returns the boolean content; integers count as true when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self.deref() {
            Value::Bool(v) => Some(*v),
            other => other.as_i64().map(|v| v != 0),
        }
    }

    /// Returns the value as an element count: a non-negative integer.
    pub fn as_count(&self) -> Option<usize> {
        match *self.deref() {
            Value::U64(v) => usize::try_from(v).ok(),
            ref other => other.as_i64().and_then(|v| usize::try_from(v).ok()),
        }
    }

    /// Number of live elements of a container, or `None` for scalars and records.
    pub fn element_count(&self) -> Option<usize> {
        match self.deref() {
            Value::Bytes(b) => Some(b.len()),
            Value::Str(s) => Some(s.len()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Type-dispatched length.
    ///
    /// Containers report their element count (bytes for strings), records the
    /// sum over their members, and scalars their byte width. This is what a
    /// `size_of` field encodes for its target.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self.deref() {
            Value::Bytes(b) => b.len(),
            Value::Str(s) => s.len(),
            Value::Array(items) => items.len(),
            Value::Struct(members) => members.iter().map(Value::len).sum(),
            Value::Ptr(_) => 0,
            Value::Bool(_) | Value::I8(_) | Value::U8(_) => 1,
            Value::I16(_) | Value::U16(_) => 2,
            Value::I32(_) | Value::U32(_) | Value::F32(_) => 4,
            Value::I64(_) | Value::U64(_) | Value::F64(_) => 8,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Vec<u8> => Bytes,
    String => Str,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
