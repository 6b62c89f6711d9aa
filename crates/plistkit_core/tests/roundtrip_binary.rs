use plistkit::plist::{Dedup, EncodeOptions, IntWidth, Trailer, Value, decode_binary, encode_binary, encode_binary_with};

const SIZES: [usize; 5] = [14, 15, 16, 65535, 65536];

fn sized_values(len: usize) -> Vec<Value> {
	let ascii: Vec<u8> = (0..len).map(|idx| b'a' + (idx % 26) as u8).collect();
	let unicode: Vec<u16> = (0..len).map(|idx| 0x400 + (idx % 64) as u16).collect();
	let items: Vec<Value> = (0..len).map(|idx| Value::int(idx as i64)).collect();
	let pairs: Vec<(Value, Value)> = (0..len).map(|idx| (Value::string(&format!("k{idx}")), Value::Bool(idx % 2 == 0))).collect();
	vec![
		Value::Data((0..len).map(|idx| idx as u8).collect()),
		Value::AsciiString(ascii),
		Value::UnicodeString(unicode),
		Value::Array(items.clone()),
		Value::Set(items),
		Value::Dictionary(pairs),
	]
}

#[test]
fn sized_containers_survive() {
	for len in SIZES {
		for value in sized_values(len) {
			let bytes = encode_binary(&value).expect("encode");
			let back = decode_binary(&bytes).expect("decode");
			assert_eq!(back, value, "{} of {len}", value.kind_name());
		}
	}
}

#[test]
fn every_scalar_variant_survives() {
	let mut values = vec![
		Value::Null,
		Value::Bool(true),
		Value::Bool(false),
		Value::Real32(-0.25),
		Value::Real64(1.0e300),
		Value::Date(-978_307_200.0),
		Value::Uid(0),
		Value::Uid(u64::MAX),
		Value::string(""),
		Value::string("\u{1f600}"),
	];
	for width in IntWidth::ALL {
		for value in [0, -1, i64::MIN, i64::MAX, 127, -128, 255, 32767] {
			if let Ok(int) = Value::int_with_width(value, width) {
				values.push(int);
			}
		}
	}

	for value in values {
		let bytes = encode_binary(&value).expect("encode");
		assert_eq!(decode_binary(&bytes).expect("decode"), value, "{value:?}");
	}
}

#[test]
fn nested_trees_survive_with_either_dedup_policy() {
	let leaf = Value::Dictionary(vec![(Value::string("n"), Value::int(1)), (Value::string("s"), Value::string("shared"))]);
	let value = Value::Array(vec![
		leaf.clone(),
		leaf.clone(),
		Value::Set(vec![leaf, Value::string("shared")]),
		Value::Dictionary(vec![(Value::Array(Vec::new()), Value::Null)]),
	]);

	let plain = encode_binary(&value).expect("encode");
	let shared = encode_binary_with(
		&value,
		&EncodeOptions {
			dedup: Dedup::Scalars,
			..EncodeOptions::default()
		},
	)
	.expect("encode with dedup");

	assert!(shared.len() < plain.len());
	assert_eq!(decode_binary(&plain).expect("decode"), value);
	assert_eq!(decode_binary(&shared).expect("decode"), value);

	let plain_count = Trailer::parse(&plain).expect("trailer").num_objects;
	assert_eq!(plain_count, value.node_count() as u64);
}

#[test]
fn non_finite_and_signed_zero_reals_survive() {
	let value = Value::Array(vec![
		Value::Real64(f64::NAN),
		Value::Real32(f32::NAN),
		Value::Date(f64::NAN),
		Value::Real64(f64::NEG_INFINITY),
		Value::Dictionary(vec![(Value::Real64(0.0), Value::int(1)), (Value::Real64(-0.0), Value::int(2))]),
	]);
	let bytes = encode_binary(&value).expect("encode");
	assert_eq!(decode_binary(&bytes).expect("decode"), value);
}
