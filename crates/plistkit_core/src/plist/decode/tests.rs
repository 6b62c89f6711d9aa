use plistkit_testkit::{assemble, null_plist};

use crate::plist::{DecodeOptions, ErrorKind, IntWidth, MalformedReason, PlistError, Value, decode_binary, decode_binary_with, encode_binary};

fn malformed_reason(err: PlistError) -> MalformedReason {
	match err {
		PlistError::MalformedFile { reason, .. } => reason,
		other => panic!("expected malformed file, got {other}"),
	}
}

#[test]
fn decodes_lone_null() {
	assert_eq!(decode_binary(&null_plist()).expect("decodes"), Value::Null);
}

#[test]
fn truncating_last_byte_is_malformed() {
	let mut bytes = null_plist();
	bytes.pop();
	let err = decode_binary(&bytes).expect_err("truncated");
	assert_eq!(err.kind(), ErrorKind::MalformedFile);

	let tree = Value::Dictionary(vec![(Value::string("items"), Value::Array(vec![Value::int(1), Value::Real64(2.5)]))]);
	let mut bytes = encode_binary(&tree).expect("encodes");
	bytes.pop();
	let err = decode_binary(&bytes).expect_err("truncated");
	assert_eq!(err.kind(), ErrorKind::MalformedFile);
}

#[test]
fn unknown_marker_is_malformed() {
	let bytes = assemble(&[&[0x70]], 0);
	assert_eq!(
		malformed_reason(decode_binary(&bytes).expect_err("0x70 is unassigned")),
		MalformedReason::UnknownMarker { marker: 0x70 }
	);
}

#[test]
fn self_referencing_array_is_cyclic() {
	let bytes = assemble(&[&[0xa1, 0]], 0);
	let err = decode_binary(&bytes).expect_err("array contains itself");
	assert!(matches!(err, PlistError::CyclicReference { index: 0, at: 8 }));
}

#[test]
fn indirect_cycle_is_detected() {
	let bytes = assemble(&[&[0xa1, 1], &[0xd1, 2, 0], &[0x00]], 0);
	let err = decode_binary(&bytes).expect_err("dict value points back at root");
	assert_eq!(err.kind(), ErrorKind::CyclicReference);
}

#[test]
fn shared_objects_are_not_cycles() {
	let bytes = assemble(&[&[0xa2, 1, 1], &[0x10, 5]], 0);
	assert_eq!(decode_binary(&bytes).expect("decodes"), Value::Array(vec![Value::int(5), Value::int(5)]));
}

#[test]
fn ref_past_object_count_is_malformed() {
	let bytes = assemble(&[&[0xa1, 5]], 0);
	assert_eq!(
		malformed_reason(decode_binary(&bytes).expect_err("ref 5 of 1")),
		MalformedReason::RefOutOfRange { index: 5 }
	);
}

#[test]
fn extended_length_accepts_non_minimal_integer() {
	let bytes = assemble(&[&[0x4f, 0x12, 0, 0, 0, 2, b'a', b'b']], 0);
	assert_eq!(decode_binary(&bytes).expect("decodes"), Value::Data(b"ab".to_vec()));
}

#[test]
fn extended_length_must_be_an_integer_object() {
	let bytes = assemble(&[&[0x5f, 0x22, 0, 0, 0, 0]], 0);
	assert_eq!(malformed_reason(decode_binary(&bytes).expect_err("real length")), MalformedReason::BadLength);

	let bytes = assemble(&[&[0x5f, 0x10, 0xff]], 0);
	assert_eq!(malformed_reason(decode_binary(&bytes).expect_err("negative length")), MalformedReason::BadLength);
}

#[test]
fn payload_past_object_table_is_malformed() {
	let bytes = assemble(&[&[0x53, b'a']], 0);
	assert!(matches!(
		malformed_reason(decode_binary(&bytes).expect_err("claims three bytes")),
		MalformedReason::PayloadOutOfRange { need: 3, rem: 1 }
	));
}

#[test]
fn integers_are_sign_extended() {
	let bytes = assemble(&[&[0x10, 0xff]], 0);
	assert_eq!(
		decode_binary(&bytes).expect("decodes"),
		Value::Int {
			value: -1,
			width: IntWidth::W1
		}
	);
}

#[test]
fn sixteen_byte_integers_must_fit_in_64_bits() {
	let mut small = vec![0x14];
	small.extend_from_slice(&[0; 15]);
	small.push(42);
	let bytes = assemble(&[&small], 0);
	assert_eq!(
		decode_binary(&bytes).expect("decodes"),
		Value::Int {
			value: 42,
			width: IntWidth::W8
		}
	);

	let mut big = vec![0x14, 1];
	big.extend_from_slice(&[0; 15]);
	let bytes = assemble(&[&big], 0);
	let err = decode_binary(&bytes).expect_err("needs more than 64 bits");
	assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
}

#[test]
fn non_ascii_byte_in_ascii_string_is_malformed() {
	let bytes = assemble(&[&[0x51, 0xc3]], 0);
	assert_eq!(
		malformed_reason(decode_binary(&bytes).expect_err("0xc3 in ascii string")),
		MalformedReason::NonAsciiString
	);
}

#[test]
fn set_marker_is_accepted() {
	let bytes = assemble(&[&[0xc2, 1, 2], &[0x09], &[0x51, b'x']], 0);
	assert_eq!(
		decode_binary(&bytes).expect("decodes"),
		Value::Set(vec![Value::Bool(true), Value::string("x")])
	);
}

#[test]
fn depth_limit_is_enforced() {
	let bytes = assemble(&[&[0xa1, 1], &[0xa1, 2], &[0xa0]], 0);
	let opt = DecodeOptions {
		max_depth: 1,
		..DecodeOptions::default()
	};
	let err = decode_binary_with(&bytes, &opt).expect_err("three levels deep");
	assert!(matches!(err, PlistError::DepthExceeded { max_depth: 1 }));
	assert!(decode_binary(&bytes).is_ok());
}

#[test]
fn node_budget_stops_shared_fan_out() {
	let bytes = assemble(&[&[0xa2, 1, 1], &[0xa2, 2, 2], &[0xa2, 3, 3], &[0xa2, 4, 4], &[0x00]], 0);
	let opt = DecodeOptions {
		max_nodes: 16,
		..DecodeOptions::default()
	};
	let err = decode_binary_with(&bytes, &opt).expect_err("31 nodes materialize");
	assert_eq!(err.kind(), ErrorKind::LimitExceeded);
	assert_eq!(decode_binary(&bytes).expect("decodes").node_count(), 31);
}

#[test]
fn dictionary_and_unicode_string_payloads_decode() {
	let bytes = assemble(&[&[0xd1, 1, 2], &[0x61, 0x00, 0xe9], &[0x00]], 0);
	assert_eq!(
		decode_binary(&bytes).expect("decodes"),
		Value::Dictionary(vec![(Value::UnicodeString(vec![0xe9]), Value::Null)])
	);
}
