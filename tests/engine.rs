//! End-to-end tests for packing and unpacking whole records.
//!
//! Wire vectors are written as hex so they can be compared against captures
//! from other implementations of the same layouts.

use std::io::Cursor;

use binstruc::{Endianness, Error, Field, FieldRef, Fields, Options, Result, Type, Value};

// {A int32; N int32 sizeof=B; B []int16}
fn counted_fields() -> Fields {
    Fields::new(vec![
        Field::new("a", Type::Int32),
        Field::new("n", Type::Int32).size_of(FieldRef::Direct(2)),
        Field::new("b", Type::Int16).slice(),
    ])
    .unwrap()
}

fn counted_record() -> Value {
    Value::Struct(vec![
        Value::I32(7),
        Value::I32(0),
        Value::Array(vec![Value::I16(1), Value::I16(2), Value::I16(3)]),
    ])
}

fn scalar_fields() -> Fields {
    Fields::new(vec![
        Field::new("flag", Type::Bool),
        Field::new("i8", Type::Int8),
        Field::new("u8", Type::Uint8),
        Field::new("i16", Type::Int16),
        Field::new("u16", Type::Uint16),
        Field::new("i32", Type::Int32),
        Field::new("u32", Type::Uint32),
        Field::new("i64", Type::Int64),
        Field::new("u64", Type::Uint64),
        Field::new("f32", Type::Float32),
        Field::new("f64", Type::Float64),
        Field::new("pad", Type::Pad).array(2),
        Field::new("tag", Type::String).array(4),
        Field::new("raw", Type::Uint8).array(3),
        Field::new("words", Type::Uint16).array(2),
    ])
    .unwrap()
}

fn scalar_record() -> Value {
    Value::Struct(vec![
        Value::Bool(true),
        Value::I8(-42),
        Value::U8(255),
        Value::I16(i16::MIN),
        Value::U16(u16::MAX),
        Value::I32(-123_456),
        Value::U32(u32::MAX),
        Value::I64(i64::MIN),
        Value::U64(u64::MAX),
        Value::F32(3.5),
        Value::F64(-2.25),
        Value::Bytes(vec![0, 0]),
        Value::from("abcd"),
        Value::Bytes(vec![0xde, 0xad, 0xbe]),
        Value::Array(vec![Value::U16(1), Value::U16(2)]),
    ])
}

fn roundtrip(fields: &Fields, record: &Value) -> Result<Value> {
    let data = binstruc::pack(fields, record)?;
    let mut decoded = fields.zero_value();
    binstruc::unpack(&mut Cursor::new(data), fields, &mut decoded)?;
    Ok(decoded)
}

#[test]
fn test_counted_little_endian_vector() {
    let mut fields = counted_fields();
    fields.set_byte_order(Endianness::Little);

    let data = binstruc::pack(&fields, &counted_record()).unwrap();
    assert_eq!(hex::encode(&data), "0700000003000000010002000300");
    assert_eq!(data.len(), 14);

    let mut decoded = fields.zero_value();
    binstruc::unpack(&mut &data[..], &fields, &mut decoded).unwrap();
    assert_eq!(
        decoded,
        Value::Struct(vec![
            Value::I32(7),
            Value::I32(3),
            Value::Array(vec![Value::I16(1), Value::I16(2), Value::I16(3)]),
        ])
    );
}

#[test]
fn test_counted_big_endian_is_default() {
    let data = binstruc::pack(&counted_fields(), &counted_record()).unwrap();
    assert_eq!(hex::encode(data), "0000000700000003000100020003");
}

#[test]
fn test_options_override_order() {
    let options = Options::new().order(Endianness::Little);
    let data = binstruc::pack_with_options(&counted_fields(), &counted_record(), &options).unwrap();
    assert_eq!(hex::encode(&data), "0700000003000000010002000300");

    let mut decoded = counted_fields().zero_value();
    binstruc::unpack_with_options(&mut &data[..], &counted_fields(), &mut decoded, &options)
        .unwrap();
    assert_eq!(decoded.member(0), Some(&Value::I32(7)));
}

#[test]
fn test_size_of_count_decodes_as_scalar() {
    let fields = counted_fields();
    let record = counted_record();
    let data = binstruc::pack(&fields, &record).unwrap();

    let count = Field::new("n", Type::Int32);
    let mut decoded = Value::I32(0);
    count.unpack(&data[4..8], &mut decoded, 1).unwrap();
    assert_eq!(decoded.as_count(), Some(record.member(2).unwrap().len()));
}

#[test]
fn test_count_drives_bytes_consumed() {
    let fields = counted_fields();
    let data = hex::decode("000000010000000500010002000300040005ffff").unwrap();
    let mut cursor = Cursor::new(&data);
    let mut decoded = fields.zero_value();
    fields.unpack(&mut cursor, &mut decoded).unwrap();
    assert_eq!(cursor.position(), 4 + 4 + 5 * 2);
    assert_eq!(decoded.member(2).map(Value::len), Some(5));
}

#[test]
fn test_exact_buffer_succeeds_and_shorter_fails() {
    let fields = scalar_fields();
    let record = scalar_record();
    let size = fields.sizeof(&record);
    assert_eq!(size, 1 + 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 4 + 8 + 2 + 4 + 3 + 4);

    let mut exact = vec![0u8; size];
    assert_eq!(fields.pack(&mut exact, &record).unwrap(), size);

    let mut short = vec![0u8; size - 1];
    let err = fields.pack(&mut short, &record).unwrap_err();
    assert!(matches!(err, Error::BufferTooShort { .. }));
}

#[test]
fn test_scalar_roundtrip() {
    let fields = scalar_fields();
    let record = scalar_record();
    assert_eq!(roundtrip(&fields, &record).unwrap(), record);
}

#[test]
fn test_nested_record() {
    let point = Fields::new(vec![
        Field::new("x", Type::Int16),
        Field::new("y", Type::Int16),
    ])
    .unwrap();
    let fields = Fields::new(vec![
        Field::new("id", Type::Uint32),
        Field::record("origin", point.clone()),
        Field::new("name_len", Type::Uint8).size_of(FieldRef::Direct(3)),
        Field::new("name", Type::String),
    ])
    .unwrap();

    let origin = Value::Struct(vec![Value::I16(-5), Value::I16(10)]);
    let record = Value::Struct(vec![
        Value::U32(0xcafe),
        origin.clone(),
        Value::U8(0),
        Value::from("tile"),
    ]);

    assert_eq!(
        fields.sizeof(&record),
        4 + point.sizeof(&origin) + 1 + 4
    );

    let data = binstruc::pack(&fields, &record).unwrap();
    assert_eq!(hex::encode(&data), "0000cafefffb000a0474696c65");

    let decoded = roundtrip(&fields, &record).unwrap();
    assert_eq!(decoded.member(1), Some(&origin));
    assert_eq!(decoded.member(2), Some(&Value::U8(4)));
    assert_eq!(decoded.member(3), Some(&Value::from("tile")));
}

#[test]
fn test_optional_nested_record_is_instantiated() {
    let inner = Fields::new(vec![Field::new("v", Type::Uint32)]).unwrap();
    let fields = Fields::new(vec![
        Field::new("kind", Type::Uint8),
        Field::record("payload", inner).pointer(),
    ])
    .unwrap();

    let mut decoded = fields.zero_value();
    assert!(decoded.member(1).unwrap().is_absent());
    binstruc::unpack(&mut &hex::decode("0100000102").unwrap()[..], &fields, &mut decoded).unwrap();
    assert_eq!(
        decoded,
        Value::Struct(vec![
            Value::U8(1),
            Value::Ptr(Some(Box::new(Value::Struct(vec![Value::U32(0x0102)])))),
        ])
    );
}

#[test]
fn test_skipped_member_leaves_stream_alone() {
    let fields = Fields::new(vec![
        Field::new("a", Type::Uint16),
        Field::new("cache", Type::Uint64).skip(),
        Field::new("b", Type::Uint16),
    ])
    .unwrap();
    let record = Value::Struct(vec![Value::U16(1), Value::U64(77), Value::U16(2)]);
    let data = binstruc::pack(&fields, &record).unwrap();
    assert_eq!(hex::encode(&data), "00010002");

    let mut cursor = Cursor::new(&data);
    let mut decoded = fields.zero_value();
    fields.unpack(&mut cursor, &mut decoded).unwrap();
    assert_eq!(cursor.position(), 4);
    assert_eq!(decoded.member(1), Some(&Value::U64(0)));
}

#[test]
fn test_forward_size_from_is_rejected() {
    let err = Fields::new(vec![
        Field::new("data", Type::Uint8)
            .slice()
            .size_from(FieldRef::Direct(1)),
        Field::new("len", Type::Uint8),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::InvalidReference { .. }));
}

#[test]
fn test_truncated_stream_is_short_read() {
    let fields = scalar_fields();
    let data = binstruc::pack(&fields, &scalar_record()).unwrap();
    let mut decoded = fields.zero_value();
    let err = binstruc::unpack(&mut &data[..data.len() - 1], &fields, &mut decoded).unwrap_err();
    assert!(matches!(err, Error::ShortRead { .. }));
}

#[test]
fn test_display_lists_layout() {
    let fields = Fields::new(vec![
        Field::new("len", Type::Uint8).size_of(FieldRef::Direct(1)),
        Field::new("body", Type::Uint8).slice(),
        Field::new("hidden", Type::Int8).skip(),
    ])
    .unwrap();
    assert_eq!(
        fields.to_string(),
        "{len uint8 sizeof=[1], body []uint8 sizefrom=[0], hidden -}"
    );
}

#[test]
fn test_hostile_counts_are_errors() {
    let wide = Fields::new(vec![
        Field::new("n", Type::Uint64),
        Field::new("items", Type::Int64).slice().size_from(FieldRef::Direct(0)),
    ])
    .unwrap();
    let mut decoded = wide.zero_value();
    let err = binstruc::unpack(&mut &hex::decode("4000000000000000").unwrap()[..], &wide, &mut decoded)
        .unwrap_err();
    assert!(matches!(err, Error::Custom(_)));

    let bytes = Fields::new(vec![
        Field::new("n", Type::Uint64),
        Field::new("items", Type::Uint8).slice().size_from(FieldRef::Direct(0)),
    ])
    .unwrap();
    let mut decoded = bytes.zero_value();
    let err = binstruc::unpack(&mut &hex::decode("000010000000000001").unwrap()[..], &bytes, &mut decoded)
        .unwrap_err();
    assert!(matches!(err, Error::ShortRead { .. }));
}

#[test]
fn test_skipped_length_field_does_not_drive_decoding() {
    let fields = Fields::new(vec![
        Field::new("n", Type::Uint8).size_of(FieldRef::Direct(1)).skip(),
        Field::new("b", Type::Uint8).array(3),
    ])
    .unwrap();
    let record = Value::Struct(vec![Value::U8(0), Value::Bytes(vec![1, 2, 3])]);
    let decoded = roundtrip(&fields, &record).unwrap();
    assert_eq!(decoded.member(1), Some(&Value::Bytes(vec![1, 2, 3])));
}
