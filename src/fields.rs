//! Field-list engine: sizing, packing and unpacking whole records.

use std::fmt;
use std::io::Read;

use crate::error::{Error, Result};
use crate::field::{Field, FieldRef};
use crate::types::{Endianness, Type};
use crate::value::Value;

/// Reads below this many bytes use a stack scratch buffer.
const SCRATCH_SIZE: usize = 8;

/// Ordered field descriptors, index-aligned with the members of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    fields: Vec<Field>,
}

impl Fields {
    /// Validates the descriptors and links derived counts to their targets.
    ///
    /// A `size_from` reference must point at an earlier, writable, integer
    /// member. When a member declares `size_of` for a later container that has
    /// no `size_from` of its own, the container reads its count from it.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut list = Self { fields };
        for (index, field) in list.fields.iter().enumerate() {
            if let Err(err) = list.validate(index, field) {
                log::debug!("[Fields::new] rejected field {}: {}", field.name, err);
                return Err(err);
            }
        }

        for index in 0..list.fields.len() {
            let Some(FieldRef::Direct(target)) = list.fields[index].size_of.clone() else {
                continue;
            };
            if !list.fields[index].writable {
                continue;
            }
            let linked = &mut list.fields[target];
            if target > index && linked.is_container() && linked.size_from.is_none() {
                linked.size_from = Some(FieldRef::Direct(index));
            }
        }
        Ok(list)
    }

    fn validate(&self, index: usize, field: &Field) -> Result<()> {
        if field.size_from.is_some() && field.size_of.is_some() {
            return Err(Error::invalid_reference(
                &field.name,
                "sizefrom and sizeof are mutually exclusive",
            ));
        }
        if field.ty == Type::Struct && field.nested.is_none() {
            return Err(Error::unsupported_type(&field.name, field.ty));
        }

        if let Some(target) = &field.size_from {
            if target.head() >= index {
                return Err(Error::invalid_reference(
                    &field.name,
                    format!("sizefrom {} must precede the field", target),
                ));
            }
            let resolved = self.resolve_writable(field, target)?;
            if !resolved.ty.is_integer() || resolved.is_container() {
                return Err(Error::invalid_reference(
                    &field.name,
                    format!("sizefrom {} is not an integer field", target),
                ));
            }
        }
        if let Some(target) = &field.size_of {
            self.resolve_writable(field, target)?;
        }
        Ok(())
    }

    fn resolve_writable(&self, field: &Field, target: &FieldRef) -> Result<&Field> {
        match target.resolve_field(self) {
            Some(resolved) if resolved.writable => Ok(resolved),
            Some(_) => Err(Error::invalid_reference(
                &field.name,
                format!("{} refers to a skipped field", target),
            )),
            None => Err(Error::invalid_reference(
                &field.name,
                format!("{} does not resolve", target),
            )),
        }
    }

    /// Returns the descriptor at `index`.
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Iterates over the descriptors in member order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Number of descriptors, including skipped ones.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no descriptors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sets the byte order of every field, nested records included.
    pub fn set_byte_order(&mut self, order: Endianness) {
        for field in &mut self.fields {
            field.order = order;
            if let Some(nested) = &mut field.nested {
                nested.set_byte_order(order);
            }
        }
    }

    /// A record of zero values shaped like this list.
    pub fn zero_value(&self) -> Value {
        Value::Struct(self.fields.iter().map(Field::zero_value).collect())
    }

    /// Byte length [`Fields::pack`] produces for `value`.
    pub fn sizeof(&self, value: &Value) -> usize {
        let record = value.deref();
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.writable)
            .map(|(index, field)| match record.member(index) {
                Some(member) if !member.is_absent() => field.size(member),
                _ => field.size(&field.zero_target()),
            })
            .sum()
    }

    /// Packs `value` into `buf`, returning the number of bytes consumed.
    ///
    /// `buf` must hold at least [`Fields::sizeof`] bytes. On failure the bytes
    /// already written are left in place.
    pub fn pack(&self, buf: &mut [u8], value: &Value) -> Result<usize> {
        let record = value.deref();
        let mut pos = 0;
        for (index, field) in self.fields.iter().enumerate() {
            if !field.writable {
                continue;
            }
            let zero;
            let member = match record.member(index) {
                Some(member) if member.is_absent() => {
                    zero = field.zero_target();
                    &zero
                }
                Some(member) => member,
                None => return Err(Error::type_mismatch(&field.name, "record member")),
            };

            let mut length = field.len;
            if let Some(target) = &field.size_from {
                length = self.resolve_count(record, field, target)?;
            }
            if length == 0 && field.slice {
                // Byte size stands in for the element count here.
                length = field.size(member);
            }
            let computed;
            let mut encoded = member;
            if let Some(target) = &field.size_of {
                length = target
                    .resolve(record)
                    .map(Value::len)
                    .ok_or_else(|| Error::invalid_reference(&field.name, "sizeof target missing"))?;
                computed = Value::U64(length as u64);
                encoded = &computed;
            }

            log::trace!("[Fields::pack] {} len={} pos={}", field.name, length, pos);
            let dst = buf.get_mut(pos..).unwrap_or_default();
            if field.ty == Type::Struct {
                let nested = field
                    .nested
                    .as_ref()
                    .ok_or_else(|| Error::unsupported_type(&field.name, field.ty))?;
                nested.pack(dst, encoded)?;
            } else {
                field.pack(dst, encoded, length)?;
            }
            pos += field.size(encoded);
        }
        Ok(pos)
    }

    /// Count for a `size_from` reference while packing. A member that is itself
    /// a `size_of` field reports the live length of its target, not its stored value.
    fn resolve_count(&self, record: &Value, field: &Field, target: &FieldRef) -> Result<usize> {
        if let FieldRef::Direct(index) = target {
            if let Some(derived) = self.fields.get(*index).and_then(|f| f.size_of.as_ref()) {
                return derived.resolve(record).map(Value::len).ok_or_else(|| {
                    Error::invalid_reference(&field.name, format!("sizeof {} missing", derived))
                });
            }
        }
        read_count(record, field, target)
    }

    /// Unpacks a record from `r` into `value`, reading exactly
    /// [`Fields::sizeof`] bytes of the decoded record.
    pub fn unpack<R: Read + ?Sized>(&self, r: &mut R, value: &mut Value) -> Result<()> {
        if value.is_absent() {
            *value = Value::Ptr(Some(Box::new(self.zero_value())));
        }
        let record = value.deref_mut();
        let mut scratch = [0u8; SCRATCH_SIZE];
        for (index, field) in self.fields.iter().enumerate() {
            if !field.writable {
                continue;
            }
            let mut length = field.len;
            if let Some(target) = &field.size_from {
                length = read_count(record, field, target)?;
            }

            let member = record
                .member_mut(index)
                .ok_or_else(|| Error::type_mismatch(&field.name, "record member"))?;
            if member.is_absent() {
                *member = Value::Ptr(Some(Box::new(field.zero_target())));
            }

            if field.ty == Type::Struct {
                let nested = field
                    .nested
                    .as_ref()
                    .ok_or_else(|| Error::unsupported_type(&field.name, field.ty))?;
                log::trace!("[Fields::unpack] {} nested", field.name);
                nested.unpack(r, member)?;
                continue;
            }

            let size = length.checked_mul(field.ty.size()).ok_or_else(|| {
                Error::custom(format!("field {}: {} elements overflow", field.name, length))
            })?;
            log::trace!("[Fields::unpack] {} len={} size={}", field.name, length, size);
            if size < SCRATCH_SIZE {
                let buf = &mut scratch[..size];
                r.read_exact(buf).map_err(|e| Error::from_read(e, size))?;
                field.unpack(buf, member, length)?;
            } else {
                // Grow with the bytes that actually arrive; the count is untrusted.
                let mut heap = Vec::new();
                Read::take(&mut *r, size as u64).read_to_end(&mut heap)?;
                if heap.len() < size {
                    return Err(Error::short_read(size));
                }
                field.unpack(&heap, member, length)?;
            }
        }
        Ok(())
    }
}

fn read_count(record: &Value, field: &Field, target: &FieldRef) -> Result<usize> {
    target.resolve(record).and_then(Value::as_count).ok_or_else(|| {
        Error::invalid_reference(&field.name, format!("{} does not hold a count", target))
    })
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        f.write_str("}")
    }
}
