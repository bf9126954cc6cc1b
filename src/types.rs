//! Primitive type tags and byte order.

use std::fmt;

/// Element types a field descriptor can carry.
///
/// `Struct` is the sentinel for nested records: it has no primitive codec and
/// its size is always delegated to the nested descriptor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Zero-filled padding, skipped on decode.
    Pad,
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    /// Raw byte string.
    String,
    /// Nested record.
    Struct,
}

impl Type {
    /// Returns the byte width of one element of this type.
    pub fn size(self) -> usize {
        match self {
            Type::Pad | Type::Bool | Type::Int8 | Type::Uint8 | Type::String => 1,
            Type::Int16 | Type::Uint16 => 2,
            Type::Int32 | Type::Uint32 | Type::Float32 => 4,
            Type::Int64 | Type::Uint64 | Type::Float64 => 8,
            Type::Struct => 0,
        }
    }

    /// Returns true for the integer kinds that can carry a size.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Type::Int8
                | Type::Uint8
                | Type::Int16
                | Type::Uint16
                | Type::Int32
                | Type::Uint32
                | Type::Int64
                | Type::Uint64
        )
    }

    /// Parses a lowercase type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pad" => Some(Type::Pad),
            "bool" => Some(Type::Bool),
            "int8" => Some(Type::Int8),
            "uint8" | "byte" => Some(Type::Uint8),
            "int16" => Some(Type::Int16),
            "uint16" => Some(Type::Uint16),
            "int32" => Some(Type::Int32),
            "uint32" => Some(Type::Uint32),
            "int64" => Some(Type::Int64),
            "uint64" => Some(Type::Uint64),
            "float32" => Some(Type::Float32),
            "float64" => Some(Type::Float64),
            "string" => Some(Type::String),
            "struct" => Some(Type::Struct),
            _ => None,
        }
    }

    /// Returns the lowercase name of this type.
    pub fn name(self) -> &'static str {
        match self {
            Type::Pad => "pad",
            Type::Bool => "bool",
            Type::Int8 => "int8",
            Type::Uint8 => "uint8",
            Type::Int16 => "int16",
            Type::Uint16 => "uint16",
            Type::Int32 => "int32",
            Type::Uint32 => "uint32",
            Type::Int64 => "int64",
            Type::Uint64 => "uint64",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::String => "string",
            Type::Struct => "struct",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order used for a field's primitive encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    /// Most significant byte first (network order).
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl Endianness {
    /// The byte order of the target architecture.
    pub const fn native() -> Self {
        #[cfg(target_endian = "big")]
        let order = Self::Big;

        #[cfg(target_endian = "little")]
        let order = Self::Little;

        order
    }
}
