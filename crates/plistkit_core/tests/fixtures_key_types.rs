use plistkit::plist::{IntWidth, Value, decode_binary, encode_binary};
use plistkit_testkit::{KEY_TYPES, key_type_plist};

fn key_value(name: &str) -> Value {
	match name {
		"null" => Value::Null,
		"false" => Value::Bool(false),
		"true" => Value::Bool(true),
		"int" => Value::Int {
			value: 123,
			width: IntWidth::W1,
		},
		"float" => Value::Real32(3.5),
		"double" => Value::Real64(3.5),
		"date" => Value::Date(3.5),
		"data" => Value::Data(b"K".to_vec()),
		"string-ascii" => Value::string("KEY"),
		"string-unicode" => Value::string("\u{263a}"),
		"uid" => Value::Uid(42),
		"array" => Value::Array(Vec::new()),
		"set" => Value::Set(Vec::new()),
		"dict" => Value::Dictionary(Vec::new()),
		other => panic!("unknown key type {other}"),
	}
}

fn fixture_value(name: &str) -> Value {
	Value::Dictionary(vec![(key_value(name), Value::string("value"))])
}

#[test]
fn encoder_matches_hand_built_fixtures() {
	for name in KEY_TYPES {
		let expected = key_type_plist(name).expect("known key type");
		let encoded = encode_binary(&fixture_value(name)).unwrap_or_else(|err| panic!("{name}: {err}"));
		assert_eq!(encoded, expected, "key type {name}");
	}
}

#[test]
fn decoder_reads_hand_built_fixtures() {
	for name in KEY_TYPES {
		let bytes = key_type_plist(name).expect("known key type");
		let decoded = decode_binary(&bytes).unwrap_or_else(|err| panic!("{name}: {err}"));
		assert_eq!(decoded, fixture_value(name), "key type {name}");
	}
}

#[test]
fn truncated_fixtures_are_malformed() {
	for name in KEY_TYPES {
		let bytes = key_type_plist(name).expect("known key type");
		for cut in [0, 8, bytes.len() - 33, bytes.len() - 1] {
			let err = decode_binary(&bytes[..cut]).expect_err("truncated input");
			assert_eq!(err.kind(), plistkit::plist::ErrorKind::MalformedFile, "{name} cut at {cut}");
		}
	}
}
