use crate::plist::{EscapeConfig, EscapePreset, Escaped, Quote, UnescapedSet, unescape_sequence};

/// Reverse a rendered single token using only the escape table.
fn read_token(token: &str, quote: Quote) -> Vec<u16> {
	let bytes = token.as_bytes();
	let inner = match bytes {
		[open, inner @ .., close] if *open == quote.byte() && *close == quote.byte() => inner,
		_ => bytes,
	};
	let mut out = Vec::new();
	let mut idx = 0;
	while idx < inner.len() {
		if inner[idx] == b'\\' {
			let (unit, used) = unescape_sequence(&inner[idx + 1..]).expect("escape decodes");
			out.push(unit);
			idx += 1 + used;
		} else {
			out.push(u16::from(inner[idx]));
			idx += 1;
		}
	}
	out
}

#[test]
fn plain_identifier_concrete_cases() {
	let config = EscapeConfig::plain_identifier();
	assert_eq!(config.render_token(&[65]), "A");
	assert_eq!(config.render_token(&[32]), "\" \"");
	assert_eq!(config.render_token(&[10]), "\"\\n\"");
	assert_eq!(config.render_token(&[0x263a]), "\"\\U263a\"");
	assert_eq!(config.render_token(&[]), "\"\"");
	assert_eq!(config.render_str("a.b"), "\"a.b\"");
}

#[test]
fn strings_file_set_keeps_path_punctuation_bare() {
	let config = EscapeConfig::strings_file();
	assert_eq!(config.render_str("net/foo.bar:1-2_$x"), "net/foo.bar:1-2_$x");
	assert_eq!(config.render_str("a b"), "\"a b\"");
}

#[test]
fn named_table_applies_under_every_preset() {
	for preset in [EscapePreset::Named, EscapePreset::LowOctal, EscapePreset::Octal] {
		let config = EscapeConfig {
			preset,
			..EscapeConfig::plain_identifier()
		};
		let letters: Vec<Escaped> = [7, 8, 9, 10, 11, 12, 13, 34, 92].into_iter().map(|unit| config.escape_unit(unit)).collect();
		assert_eq!(
			letters,
			[b'a', b'b', b't', b'n', b'v', b'f', b'r', b'"', b'\\'].map(Escaped::Named).to_vec()
		);
	}
}

#[test]
fn presets_differ_on_unnamed_controls() {
	let named = EscapeConfig {
		preset: EscapePreset::Named,
		..EscapeConfig::plain_identifier()
	};
	let low = EscapeConfig::plain_identifier();
	let full = EscapeConfig::strings_file();

	assert_eq!(named.escape_unit(3), Escaped::Quoted(3));
	assert_eq!(low.escape_unit(3), Escaped::Octal(3));
	assert_eq!(full.escape_unit(3), Escaped::Octal(3));

	assert_eq!(low.escape_unit(20), Escaped::Quoted(20));
	assert_eq!(full.escape_unit(20), Escaped::Octal(20));

	assert_eq!(low.escape_unit(127), Escaped::Quoted(127));
	assert_eq!(full.escape_unit(127), Escaped::Octal(127));
}

#[test]
fn octal_escapes_pad_before_octal_digits() {
	let config = EscapeConfig::strings_file();
	assert_eq!(config.render_token(&[1]), "\"\\1\"");
	assert_eq!(config.render_token(&[1, u16::from(b'2')]), "\"\\0012\"");
	assert_eq!(config.render_token(&[1, u16::from(b'8')]), "\"\\18\"");
	assert_eq!(config.render_token(&[14, u16::from(b'a')]), "\"\\16a\"");
	assert_eq!(config.render_token(&[14, u16::from(b'3')]), "\"\\0163\"");
	assert_eq!(config.render_token(&[127]), "\"\\177\"");
}

#[test]
fn single_quote_swaps_the_escaped_delimiter() {
	let config = EscapeConfig {
		quote: Quote::Single,
		..EscapeConfig::plain_identifier()
	};
	assert_eq!(config.escape_unit(39), Escaped::Named(b'\''));
	assert_eq!(config.escape_unit(34), Escaped::Quoted(b'"'));
	assert_eq!(config.render_str("it's"), "'it\\'s'");
}

#[test]
fn supplementary_plane_becomes_surrogate_pair() {
	let config = EscapeConfig::plain_identifier();
	let robot = config.escape_char('\u{1f916}');
	assert_eq!(robot, Escaped::Pair(0xd83e, 0xdd16));
	assert_eq!(config.render_str("\u{1f916}"), "\"\\Ud83e\\Udd16\"");
	assert_eq!(config.escape_char('z'), Escaped::Bare(b'z'));
}

#[test]
fn unescape_sequences() {
	assert_eq!(unescape_sequence(b"n"), Some((10, 1)));
	assert_eq!(unescape_sequence(b"\\"), Some((92, 1)));
	assert_eq!(unescape_sequence(b"'"), Some((39, 1)));
	assert_eq!(unescape_sequence(b"101"), Some((65, 3)));
	assert_eq!(unescape_sequence(b"1012"), Some((65, 3)));
	assert_eq!(unescape_sequence(b"18"), Some((1, 1)));
	assert_eq!(unescape_sequence(b"U263a"), Some((0x263a, 5)));
	assert_eq!(unescape_sequence(b"u41;"), Some((0x41, 3)));
	assert_eq!(unescape_sequence(b"200"), Some((0xa0, 3)));
	assert_eq!(unescape_sequence(b"400"), None);
	assert_eq!(unescape_sequence(b"q"), None);
	assert_eq!(unescape_sequence(b"U"), None);
	assert_eq!(unescape_sequence(b""), None);
}

#[test]
fn every_bmp_unit_survives_both_presets() {
	for config in [EscapeConfig::plain_identifier(), EscapeConfig::strings_file()] {
		for unit in 0..=u16::MAX {
			let token = config.render_token(&[unit]);
			assert!(token.is_ascii(), "unit 0x{unit:04x} rendered non-ascii {token:?}");
			assert_eq!(read_token(&token, config.quote), vec![unit], "unit 0x{unit:04x} via {token:?}");
		}
	}
}

#[test]
fn custom_sets_ignore_high_bytes() {
	let set = UnescapedSet::from_bytes(&[b'a', 0xff]);
	assert!(set.contains(u32::from(b'a')));
	assert!(!set.contains(0xff));
	assert!(!set.contains(u32::from(b'b')));
}
