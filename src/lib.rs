//! Binstruc - descriptor-driven binary packing for structured records.
//!
//! A record is described once by an ordered list of [`Field`] descriptors.
//! The [`Fields`] engine then sizes, packs and unpacks live [`Value`]s with
//! that layout, resolving length fields and nested records along the way.
//!
//! # Example
//!
//! ```rust
//! use binstruc::{Endianness, Field, FieldRef, Fields, Options, Result, Type, Value};
//!
//! fn main() -> Result<()> {
//!     let fields = Fields::new(vec![
//!         Field::new("a", Type::Int32),
//!         Field::new("n", Type::Int32).size_of(FieldRef::Direct(2)),
//!         Field::new("b", Type::Int16).slice(),
//!     ])?;
//!     let options = Options::new().order(Endianness::Little);
//!
//!     let record = Value::Struct(vec![
//!         Value::I32(7),
//!         Value::I32(0),
//!         Value::Array(vec![Value::I16(1), Value::I16(2), Value::I16(3)]),
//!     ]);
//!     let data = binstruc::pack_with_options(&fields, &record, &options)?;
//!     assert_eq!(data, [7, 0, 0, 0, 3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
//!
//!     let mut decoded = fields.zero_value();
//!     binstruc::unpack_with_options(&mut &data[..], &fields, &mut decoded, &options)?;
//!     assert_eq!(decoded.member(1), Some(&Value::I32(3)));
//!     assert_eq!(decoded.member(2), record.member(2));
//!     Ok(())
//! }
//! ```

mod error;
mod field;
mod fields;
pub mod stream;
mod types;
mod value;

use std::borrow::Cow;
use std::io::Read;

pub use error::{Error, Result};
pub use field::{Field, FieldRef};
pub use fields::Fields;
pub use stream::{StreamReader, StreamWriter};
pub use types::{Endianness, Type};
pub use value::Value;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings applied on top of a descriptor list for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Byte order forced onto every field, if set.
    pub order: Option<Endianness>,
}

impl Options {
    /// Creates options that leave the descriptors untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a byte order.
    pub fn order(mut self, order: Endianness) -> Self {
        self.order = Some(order);
        self
    }

    fn apply<'a>(&self, fields: &'a Fields) -> Cow<'a, Fields> {
        match self.order {
            Some(order) => {
                let mut owned = fields.clone();
                owned.set_byte_order(order);
                Cow::Owned(owned)
            }
            None => Cow::Borrowed(fields),
        }
    }
}

/// Byte length `value` packs to.
pub fn sizeof(fields: &Fields, value: &Value) -> usize {
    fields.sizeof(value)
}

/// Packs `value` into a freshly sized buffer.
pub fn pack(fields: &Fields, value: &Value) -> Result<Vec<u8>> {
    pack_with_options(fields, value, &Options::default())
}

/// Packs `value` into a freshly sized buffer using `options`.
pub fn pack_with_options(fields: &Fields, value: &Value, options: &Options) -> Result<Vec<u8>> {
    let fields = options.apply(fields);
    let mut buf = vec![0u8; fields.sizeof(value)];
    let written = fields.pack(&mut buf, value)?;
    buf.truncate(written);
    Ok(buf)
}

/// Unpacks one record from `r` into `value`.
pub fn unpack<R: Read + ?Sized>(r: &mut R, fields: &Fields, value: &mut Value) -> Result<()> {
    unpack_with_options(r, fields, value, &Options::default())
}

/// Unpacks one record from `r` into `value` using `options`.
pub fn unpack_with_options<R: Read + ?Sized>(
    r: &mut R,
    fields: &Fields,
    value: &mut Value,
    options: &Options,
) -> Result<()> {
    options.apply(fields).unpack(r, value)
}
