use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use chrono::NaiveDate;
use log::debug;

use crate::plist::xml_encode::UNIX_TO_REFERENCE;
use crate::plist::{PlistError, Result, SyntaxReason, Value};

/// XML decoder limits.
#[derive(Debug, Clone, Copy)]
pub struct XmlDecodeOptions {
	/// Deepest container nesting accepted, counting `<plist>` itself.
	pub max_depth: usize,
}

impl Default for XmlDecodeOptions {
	fn default() -> Self {
		Self { max_depth: 512 }
	}
}

/// Decode an XML property list into its root value.
///
/// The `<plist>` wrapper is optional. A dictionary holding only a non-negative
/// `CF$UID` integer decodes as [`Value::Uid`]. Strings narrow to
/// [`Value::AsciiString`] when every unit is below 0x80, integers take their
/// minimal width and reals always come back as [`Value::Real64`].
pub fn decode_xml(bytes: &[u8], opt: &XmlDecodeOptions) -> Result<Value> {
	let mut parser = XmlParser::new(bytes, *opt);
	parser.prolog()?;
	let value = parser.element()?.value;
	parser.epilog()?;
	debug!("decoded {} xml nodes from {} bytes", value.node_count(), bytes.len());
	Ok(value)
}

struct Element {
	is_key: bool,
	value: Value,
}

struct XmlParser<'a> {
	bytes: &'a [u8],
	pos: usize,
	depth: usize,
	opt: XmlDecodeOptions,
}

fn is_space(byte: u8) -> bool {
	matches!(byte, b'\t' | b'\n' | b'\r' | b' ')
}

impl<'a> XmlParser<'a> {
	fn new(bytes: &'a [u8], opt: XmlDecodeOptions) -> Self {
		let pos = if bytes.starts_with(b"\xef\xbb\xbf") { 3 } else { 0 };
		Self { bytes, pos, depth: 0, opt }
	}

	fn error_at(&self, pos: usize, reason: SyntaxReason) -> PlistError {
		PlistError::syntax_at(self.bytes, pos, reason)
	}

	fn unexpected(&self) -> PlistError {
		PlistError::unexpected_at(self.bytes, self.pos)
	}

	fn starts(&self, literal: &[u8]) -> bool {
		self.bytes[self.pos..].starts_with(literal)
	}

	fn skip_space(&mut self) {
		while self.bytes.get(self.pos).copied().is_some_and(is_space) {
			self.pos += 1;
		}
	}

	/// Move past the next `end`, failing with `reason` if it never appears.
	fn skip_past(&mut self, end: &[u8], reason: SyntaxReason) -> Result<()> {
		let start = self.pos;
		match self.bytes[self.pos..].windows(end.len()).position(|window| window == end) {
			Some(idx) => {
				self.pos += idx + end.len();
				Ok(())
			}
			None => Err(self.error_at(start, reason)),
		}
	}

	/// Skip whitespace, comments and processing instructions.
	fn skip_misc(&mut self) -> Result<()> {
		loop {
			self.skip_space();
			if self.starts(b"<!--") {
				self.pos += 4;
				self.skip_past(b"-->", SyntaxReason::UnterminatedComment)?;
			} else if self.starts(b"<?") {
				self.pos += 2;
				self.skip_past(b"?>", SyntaxReason::UnexpectedEof)?;
			} else {
				return Ok(());
			}
		}
	}

	fn prolog(&mut self) -> Result<()> {
		loop {
			self.skip_misc()?;
			if !self.starts(b"<!DOCTYPE") {
				return Ok(());
			}
			self.pos += 9;
			self.doctype()?;
		}
	}

	fn doctype(&mut self) -> Result<()> {
		let mut quote = None;
		while let Some(&byte) = self.bytes.get(self.pos) {
			self.pos += 1;
			match (quote, byte) {
				(Some(open), _) if byte == open => quote = None,
				(Some(_), _) => {}
				(None, b'"' | b'\'') => quote = Some(byte),
				(None, b'[') => return Err(self.error_at(self.pos - 1, SyntaxReason::InternalSubset)),
				(None, b'>') => return Ok(()),
				(None, _) => {}
			}
		}
		Err(self.error_at(self.pos, SyntaxReason::UnexpectedEof))
	}

	fn epilog(&mut self) -> Result<()> {
		self.skip_misc()?;
		if self.pos < self.bytes.len() {
			return Err(self.error_at(self.pos, SyntaxReason::TrailingContent));
		}
		Ok(())
	}

	/// Read `<name attrs>` or `<name attrs/>`, returning the name and whether it self-closes.
	fn open_tag(&mut self) -> Result<(&'a str, bool)> {
		if self.pos >= self.bytes.len() {
			return Err(self.error_at(self.pos, SyntaxReason::UnexpectedEof));
		}
		if !self.starts(b"<") {
			return Err(self.unexpected());
		}
		self.pos += 1;
		let start = self.pos;
		while let Some(&byte) = self.bytes.get(self.pos) {
			if is_space(byte) || byte == b'/' || byte == b'>' {
				break;
			}
			self.pos += 1;
		}
		if self.pos == start {
			return Err(self.unexpected());
		}
		let bytes = self.bytes;
		let name = std::str::from_utf8(&bytes[start..self.pos]).map_err(|_| self.error_at(start, SyntaxReason::InvalidUtf8))?;

		let mut quote = None;
		let mut last = 0;
		while let Some(&byte) = self.bytes.get(self.pos) {
			self.pos += 1;
			match (quote, byte) {
				(Some(open), _) if byte == open => quote = None,
				(Some(_), _) => {}
				(None, b'"' | b'\'') => quote = Some(byte),
				(None, b'>') => return Ok((name, last == b'/')),
				(None, _) => {}
			}
			if !is_space(byte) {
				last = byte;
			}
		}
		Err(self.error_at(self.pos, SyntaxReason::UnexpectedEof))
	}

	/// Consume `</name>` at the current position.
	fn close_tag(&mut self, name: &str) -> Result<()> {
		let start = self.pos;
		if !self.starts(b"</") || !self.bytes[self.pos + 2..].starts_with(name.as_bytes()) {
			return Err(self.error_at(start, SyntaxReason::MismatchedTag));
		}
		self.pos += 2 + name.len();
		self.skip_space();
		if !self.starts(b">") {
			return Err(self.error_at(start, SyntaxReason::MismatchedTag));
		}
		self.pos += 1;
		Ok(())
	}

	fn element(&mut self) -> Result<Element> {
		let start = self.pos;
		let (name, empty) = self.open_tag()?;

		let value = match name {
			"plist" if self.depth == 0 && !empty => {
				let mut items = self.children(name)?;
				if items.len() != 1 {
					return Err(self.error_at(start, SyntaxReason::PlistArity));
				}
				items.remove(0)
			}
			"plist" if self.depth == 0 => return Err(self.error_at(start, SyntaxReason::PlistArity)),
			"array" if empty => Value::Array(Vec::new()),
			"array" => Value::Array(self.children(name)?),
			"dict" if empty => Value::Dictionary(Vec::new()),
			"dict" => self.dict()?,
			"true" | "false" => {
				if !empty {
					self.close_tag(name)?;
				}
				Value::Bool(name == "true")
			}
			"key" | "string" => {
				let text = if empty { String::new() } else { self.text(name)?.1 };
				Value::from_utf16(text.encode_utf16().collect())
			}
			"integer" if !empty => {
				let (at, text) = self.text(name)?;
				self.integer(at, &text)?
			}
			"real" if !empty => {
				let (at, text) = self.text(name)?;
				Value::Real64(parse_real(&text).ok_or_else(|| self.error_at(at, SyntaxReason::InvalidNumber))?)
			}
			"date" if !empty => {
				let (at, text) = self.text(name)?;
				Value::Date(parse_date(&text).ok_or_else(|| self.error_at(at, SyntaxReason::InvalidDate))?)
			}
			"data" if !empty => {
				let (at, text) = self.text(name)?;
				let packed: String = text.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
				Value::Data(BASE64_STANDARD.decode(packed).map_err(|_| self.error_at(at, SyntaxReason::InvalidData))?)
			}
			_ => return Err(self.error_at(start, SyntaxReason::UnexpectedTag { name: name.to_owned() })),
		};
		Ok(Element {
			is_key: name == "key",
			value,
		})
	}

	fn enter(&mut self) -> Result<()> {
		if self.depth >= self.opt.max_depth {
			return Err(PlistError::DepthExceeded { max_depth: self.opt.max_depth });
		}
		self.depth += 1;
		Ok(())
	}

	/// Read child elements up to `</name>`.
	fn children(&mut self, name: &str) -> Result<Vec<Value>> {
		self.enter()?;
		let mut items = Vec::new();
		loop {
			self.skip_misc()?;
			if self.starts(b"</") {
				break;
			}
			if !self.starts(b"<") {
				return Err(self.unexpected());
			}
			items.push(self.element()?.value);
		}
		self.close_tag(name)?;
		self.depth -= 1;
		Ok(items)
	}

	fn dict(&mut self) -> Result<Value> {
		self.enter()?;
		let mut pairs: Vec<(Value, Value)> = Vec::new();
		let mut pending: Option<Value> = None;
		loop {
			self.skip_misc()?;
			if self.starts(b"</") {
				break;
			}
			if !self.starts(b"<") {
				return Err(self.unexpected());
			}
			let at = self.pos;
			let element = self.element()?;
			match pending.take() {
				Some(key) => match pairs.iter_mut().find(|(seen, _)| *seen == key) {
					Some(slot) => slot.1 = element.value,
					None => pairs.push((key, element.value)),
				},
				None if element.is_key => pending = Some(element.value),
				None => return Err(self.error_at(at, SyntaxReason::MisplacedKey)),
			}
		}
		if pending.is_some() {
			return Err(self.error_at(self.pos, SyntaxReason::MisplacedKey));
		}
		self.close_tag("dict")?;
		self.depth -= 1;

		if let [(key, Value::Int { value, .. })] = pairs.as_slice() {
			if *value >= 0 && key.to_string_lossy().as_deref() == Some("CF$UID") {
				return Ok(Value::Uid(*value as u64));
			}
		}
		Ok(Value::Dictionary(pairs))
	}

	/// Character data up to `</name>`, with entities and CDATA sections resolved.
	fn text(&mut self, name: &str) -> Result<(usize, String)> {
		let start = self.pos;
		let mut raw = Vec::new();
		loop {
			let Some(&byte) = self.bytes.get(self.pos) else {
				return Err(self.error_at(self.pos, SyntaxReason::UnexpectedEof));
			};
			match byte {
				b'<' if self.starts(b"</") => break,
				b'<' if self.starts(b"<![CDATA[") => {
					self.pos += 9;
					let body = self.pos;
					self.skip_past(b"]]>", SyntaxReason::UnexpectedEof)?;
					raw.extend_from_slice(&self.bytes[body..self.pos - 3]);
				}
				b'<' if self.starts(b"<!--") => {
					self.pos += 4;
					self.skip_past(b"-->", SyntaxReason::UnterminatedComment)?;
				}
				b'<' => return Err(self.unexpected()),
				b'&' => {
					let ch = self.entity()?;
					raw.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
				}
				_ => {
					raw.push(byte);
					self.pos += 1;
				}
			}
		}
		self.close_tag(name)?;
		let text = String::from_utf8(raw).map_err(|_| self.error_at(start, SyntaxReason::InvalidUtf8))?;
		Ok((start, text))
	}

	/// Decimal or `0x` hex integer with an optional sign, which may be followed by whitespace.
	fn integer(&self, at: usize, text: &str) -> Result<Value> {
		let text = trim_space(text);
		let (negative, rest) = match text.as_bytes().first() {
			Some(b'-') => (true, trim_space(&text[1..])),
			Some(b'+') => (false, trim_space(&text[1..])),
			_ => (false, text),
		};
		let (radix, digits) = match rest.get(..2) {
			Some("0x" | "0X") => (16, &rest[2..]),
			_ => (10, rest),
		};
		if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
			return Err(self.error_at(at, SyntaxReason::InvalidNumber));
		}
		let too_wide = || PlistError::UnsupportedValue {
			kind: "int",
			reason: "integer does not fit in 64 bits",
		};
		let magnitude = u64::from_str_radix(digits, radix).map_err(|_| too_wide())?;
		let signed = if negative { -i128::from(magnitude) } else { i128::from(magnitude) };
		Ok(Value::int(i64::try_from(signed).map_err(|_| too_wide())?))
	}

	/// Resolve `&name;`, `&#N;` or `&#xH;` at the current position.
	fn entity(&mut self) -> Result<char> {
		let start = self.pos;
		let bytes = self.bytes;
		let invalid = || PlistError::syntax_at(bytes, start, SyntaxReason::InvalidEntity);
		let rest = &bytes[start + 1..];
		let Some(len) = rest.iter().take(12).position(|byte| *byte == b';') else {
			return Err(invalid());
		};
		let body = &rest[..len];
		let ch = match body {
			b"amp" => '&',
			b"lt" => '<',
			b"gt" => '>',
			b"quot" => '"',
			b"apos" => '\'',
			[b'#', b'x' | b'X', digits @ ..] => code_point(digits, 16).ok_or_else(invalid)?,
			[b'#', digits @ ..] => code_point(digits, 10).ok_or_else(invalid)?,
			_ => return Err(invalid()),
		};
		self.pos = start + len + 2;
		Ok(ch)
	}
}

fn code_point(digits: &[u8], radix: u32) -> Option<char> {
	if digits.is_empty() || !digits.iter().all(|byte| char::from(*byte).is_digit(radix)) {
		return None;
	}
	let text = std::str::from_utf8(digits).ok()?;
	char::from_u32(u32::from_str_radix(text, radix).ok()?)
}

fn trim_space(text: &str) -> &str {
	text.trim_matches(|ch: char| ch.is_ascii() && is_space(ch as u8))
}

fn parse_real(text: &str) -> Option<f64> {
	let text = trim_space(text);
	match text.to_ascii_lowercase().as_str() {
		"nan" => return Some(f64::NAN),
		"inf" | "+inf" | "infinity" | "+infinity" => return Some(f64::INFINITY),
		"-inf" | "-infinity" => return Some(f64::NEG_INFINITY),
		_ => {}
	}
	if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-')) {
		return None;
	}
	text.parse().ok()
}

/// `[-]Y...-MM-DDTHH:MM:SSZ` to seconds since 2001-01-01T00:00:00Z.
fn parse_date(text: &str) -> Option<f64> {
	let text = trim_space(text);
	let (negative, rest) = match text.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, text),
	};
	let year_len = rest.bytes().take_while(u8::is_ascii_digit).count();
	if year_len == 0 {
		return None;
	}
	let year: i32 = rest[..year_len].parse().ok()?;
	let year = if negative { -year } else { year };

	let tail = rest[year_len..].as_bytes();
	if tail.len() != 16 || tail[0] != b'-' || tail[3] != b'-' || tail[6] != b'T' || tail[9] != b':' || tail[12] != b':' || tail[15] != b'Z' {
		return None;
	}
	let field = |at: usize| -> Option<u32> {
		let pair = &tail[at..at + 2];
		pair.iter().all(u8::is_ascii_digit).then(|| u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0'))
	};
	let stamp = NaiveDate::from_ymd_opt(year, field(1)?, field(4)?)?.and_hms_opt(field(7)?, field(10)?, field(13)?)?;
	Some((stamp.and_utc().timestamp() - UNIX_TO_REFERENCE) as f64)
}
