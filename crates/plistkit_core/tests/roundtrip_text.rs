use plistkit::plist::{EscapeConfig, EscapePreset, Quote, TextDecodeOptions, TextEncodeOptions, TextVariant, Value, decode_text, encode_text};

fn options(variant: TextVariant, preset: EscapePreset, quote: Quote) -> (TextEncodeOptions, TextDecodeOptions) {
	let mut encode = match variant {
		TextVariant::Dictionary => TextEncodeOptions::openstep(),
		TextVariant::Strings => TextEncodeOptions::strings(),
	};
	encode.escape.preset = preset;
	encode.escape.quote = quote;
	let decode = TextDecodeOptions {
		allow_lone_surrogates: true,
		..match variant {
			TextVariant::Dictionary => TextDecodeOptions::openstep(),
			TextVariant::Strings => TextDecodeOptions::strings(),
		}
	};
	(encode, decode)
}

/// One pair per BMP code unit, keyed by its decimal value.
fn code_unit_pairs() -> Vec<(Value, Value)> {
	(0..=0xffff_u16)
		.map(|unit| (Value::string(&unit.to_string()), Value::from_utf16(vec![unit])))
		.collect()
}

#[test]
fn every_code_unit_survives_each_variant() {
	let pairs = code_unit_pairs();
	for variant in [TextVariant::Dictionary, TextVariant::Strings] {
		for preset in [EscapePreset::Named, EscapePreset::LowOctal, EscapePreset::Octal] {
			for quote in [Quote::Double, Quote::Single] {
				let (encode, decode) = options(variant, preset, quote);
				let text = encode_text(&pairs, &encode).expect("encode");
				let back = decode_text(&text, &decode).expect("decode");
				assert_eq!(back, pairs, "{variant:?} {preset:?} {quote:?}");
			}
		}
	}
}

#[test]
fn supplementary_characters_survive_as_pairs() {
	let pairs: Vec<(Value, Value)> = ["\u{1f600}", "a\u{10000}b", "\u{10ffff}"]
		.iter()
		.map(|text| (Value::string("k"), Value::string(text)))
		.collect();
	let text = encode_text(&pairs, &TextEncodeOptions::strings()).expect("encode");
	assert_eq!(decode_text(&text, &TextDecodeOptions::strings()).expect("decode"), pairs);
}

#[test]
fn nested_structures_survive() {
	let pairs = vec![
		(
			Value::string("nested"),
			Value::Dictionary(vec![(
				Value::string("list"),
				Value::Array(vec![Value::Data(vec![1, 2, 3, 4, 5]), Value::Array(Vec::new()), Value::string("x y")]),
			)]),
		),
		(Value::string("empty"), Value::Dictionary(Vec::new())),
		(Value::string("dup"), Value::string("1")),
		(Value::string("dup"), Value::string("2")),
	];
	for (encode, decode) in [
		(TextEncodeOptions::openstep(), TextDecodeOptions::openstep()),
		(TextEncodeOptions::strings(), TextDecodeOptions::strings()),
	] {
		let text = encode_text(&pairs, &encode).expect("encode");
		assert_eq!(decode_text(&text, &decode).expect("decode"), pairs);
	}
}

#[test]
fn shortcut_output_reads_back_as_equal_pairs() {
	let pairs = vec![(Value::string("same"), Value::string("same"))];
	let encode = TextEncodeOptions {
		shortcut: true,
		escape: EscapeConfig::strings_file(),
		..TextEncodeOptions::openstep()
	};
	let text = encode_text(&pairs, &encode).expect("encode");
	assert_eq!(text, b"{\n\tsame;\n}\n");
	assert_eq!(decode_text(&text, &TextDecodeOptions::openstep()).expect("decode"), pairs);
}
