use crate::plist::{Dedup, EncodeOptions, ErrorKind, IntWidth, Trailer, Value, encode_binary, encode_binary_with};

/// Encoded bytes of the first object, which sits right after the magic.
fn first_object(value: &Value) -> Vec<u8> {
	let bytes = encode_binary(value).expect("value encodes");
	let trailer = Trailer::parse(&bytes).expect("trailer parses");
	let offsets = trailer.read_offsets(&bytes).expect("offsets read");
	let end = offsets.get(1).copied().unwrap_or(trailer.offset_table_offset as usize);
	bytes[8..end].to_vec()
}

#[test]
fn lone_null_matches_hand_built_file() {
	let bytes = encode_binary(&Value::Null).expect("null encodes");
	assert_eq!(bytes, plistkit_testkit::null_plist());
}

#[test]
fn integers_use_twos_complement_width() {
	assert_eq!(first_object(&Value::int(0)), vec![0x10, 0x00]);
	assert_eq!(first_object(&Value::int(-1)), vec![0x10, 0xff]);
	assert_eq!(first_object(&Value::int(200)), vec![0x11, 0x00, 0xc8]);
	assert_eq!(first_object(&Value::int(-129)), vec![0x11, 0xff, 0x7f]);
	assert_eq!(first_object(&Value::int(65536)), vec![0x12, 0x00, 0x01, 0x00, 0x00]);
	assert_eq!(first_object(&Value::int(i64::MIN)), vec![0x13, 0x80, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn explicit_width_is_honoured() {
	let value = Value::int_with_width(5, IntWidth::W4).expect("wide enough");
	assert_eq!(first_object(&value), vec![0x12, 0, 0, 0, 5]);
}

#[test]
fn narrower_than_required_width_is_refused() {
	let value = Value::Int {
		value: 1000,
		width: IntWidth::W1,
	};
	let err = encode_binary(&value).expect_err("width too narrow");
	assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
}

#[test]
fn reals_and_dates_use_fixed_markers() {
	assert_eq!(first_object(&Value::Real32(1.0)), vec![0x22, 0x3f, 0x80, 0x00, 0x00]);
	assert_eq!(first_object(&Value::Real64(1.0)), vec![0x23, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
	assert_eq!(first_object(&Value::Date(1.0)), vec![0x33, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn booleans_and_uids() {
	assert_eq!(first_object(&Value::Bool(false)), vec![0x08]);
	assert_eq!(first_object(&Value::Bool(true)), vec![0x09]);
	assert_eq!(first_object(&Value::Uid(42)), vec![0x80, 42]);
	assert_eq!(first_object(&Value::Uid(256)), vec![0x81, 0x01, 0x00]);
	assert_eq!(first_object(&Value::Uid(1 << 32)), vec![0x87, 0, 0, 0, 1, 0, 0, 0, 0]);
}

#[test]
fn lengths_past_fourteen_use_inline_integer() {
	let data14 = first_object(&Value::Data(vec![7; 14]));
	assert_eq!(data14[0], 0x4e);
	assert_eq!(data14.len(), 15);

	let data15 = first_object(&Value::Data(vec![7; 15]));
	assert_eq!(&data15[..3], &[0x4f, 0x10, 0x0f]);
	assert_eq!(data15.len(), 18);

	let data200 = first_object(&Value::Data(vec![7; 200]));
	assert_eq!(&data200[..4], &[0x4f, 0x11, 0x00, 0xc8]);

	let text = first_object(&Value::UnicodeString(vec![0x263a; 16]));
	assert_eq!(&text[..3], &[0x6f, 0x10, 0x10]);
	assert_eq!(text.len(), 3 + 32);
}

#[test]
fn array_of_fifteen_spills_count() {
	let array = Value::Array(vec![Value::Null; 15]);
	let object = first_object(&array);
	assert_eq!(&object[..3], &[0xaf, 0x10, 0x0f]);
	assert_eq!(&object[3..], &(1..=15).collect::<Vec<u8>>());
}

#[test]
fn dictionary_writes_key_refs_then_value_refs() {
	let dict = Value::Dictionary(vec![(Value::string("a"), Value::int(1)), (Value::string("b"), Value::int(2))]);
	let bytes = encode_binary(&dict).expect("dict encodes");
	assert_eq!(&bytes[8..13], &[0xd2, 1, 2, 3, 4]);
	assert_eq!(&bytes[13..15], &[0x51, b'a']);
	assert_eq!(&bytes[15..17], &[0x51, b'b']);
	assert_eq!(&bytes[17..19], &[0x10, 1]);
}

#[test]
fn repeats_are_not_shared_by_default() {
	let array = Value::Array(vec![Value::string("same"), Value::string("same")]);
	let bytes = encode_binary(&array).expect("encodes");
	let trailer = Trailer::parse(&bytes).expect("trailer parses");
	assert_eq!(trailer.num_objects, 3);
	assert_eq!(&bytes[8..11], &[0xa2, 1, 2]);
}

#[test]
fn scalar_dedup_shares_identical_objects() {
	let opt = EncodeOptions {
		dedup: Dedup::Scalars,
		..EncodeOptions::default()
	};
	let array = Value::Array(vec![Value::string("same"), Value::string("same"), Value::Array(vec![]), Value::Array(vec![])]);
	let bytes = encode_binary_with(&array, &opt).expect("encodes");
	let trailer = Trailer::parse(&bytes).expect("trailer parses");
	assert_eq!(trailer.num_objects, 4);
	assert_eq!(&bytes[8..13], &[0xa4, 1, 1, 2, 3]);
}

#[test]
fn strict_profile_refuses_sets() {
	let set = Value::Set(vec![Value::int(1)]);
	assert!(encode_binary(&set).is_ok());
	let err = encode_binary_with(&set, &EncodeOptions::strict()).expect_err("sets are an extension");
	assert_eq!(err.kind(), ErrorKind::UnsupportedValue);

	let nested = Value::Array(vec![Value::Set(vec![])]);
	assert!(encode_binary_with(&nested, &EncodeOptions::strict()).is_err());
}

#[test]
fn non_ascii_byte_in_ascii_string_is_refused() {
	let err = encode_binary(&Value::AsciiString(vec![b'a', 0xe9])).expect_err("0xe9 is not ascii");
	assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
}

#[test]
fn ref_width_tracks_highest_object_index() {
	let narrow = encode_binary(&Value::Array(vec![Value::Null; 255])).expect("encodes");
	assert_eq!(Trailer::parse(&narrow).expect("trailer").object_ref_size, 1);

	let wide = encode_binary(&Value::Array(vec![Value::Null; 256])).expect("encodes");
	let trailer = Trailer::parse(&wide).expect("trailer");
	assert_eq!(trailer.num_objects, 257);
	assert_eq!(trailer.object_ref_size, 2);
}

#[test]
fn offset_width_tracks_largest_offset() {
	let value = Value::Array(vec![Value::Data(vec![0; 300]), Value::Null]);
	let bytes = encode_binary(&value).expect("encodes");
	let trailer = Trailer::parse(&bytes).expect("trailer");
	assert_eq!(trailer.offset_int_size, 2);
	assert_eq!(trailer.read_offsets(&bytes).expect("offsets"), vec![8, 11, 315]);
}

#[test]
fn offset_width_covers_offset_table_position() {
	// Every object starts below 256 but the table itself lands past it.
	let bytes = encode_binary(&Value::Data(vec![0; 250])).expect("encodes");
	let trailer = Trailer::parse(&bytes).expect("trailer");
	assert_eq!(trailer.offset_table_offset, 261);
	assert_eq!(trailer.offset_int_size, 2);
	assert_eq!(trailer.read_offsets(&bytes).expect("offsets"), vec![8]);
}
