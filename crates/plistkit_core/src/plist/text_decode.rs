use log::debug;

use crate::plist::{PlistError, Result, SyntaxReason, TextVariant, UnescapedSet, Value, unescape_sequence};

/// Text decoder configuration.
#[derive(Debug, Clone, Copy)]
pub struct TextDecodeOptions {
	/// Expected container form.
	pub variant: TextVariant,
	/// Characters accepted in bare tokens.
	pub unescaped: UnescapedSet,
	/// Accept escaped surrogate halves that have no partner.
	pub allow_lone_surrogates: bool,
	/// Maximum nesting depth of arrays and dictionaries.
	pub max_depth: usize,
}

impl Default for TextDecodeOptions {
	fn default() -> Self {
		Self::openstep()
	}
}

impl TextDecodeOptions {
	/// Expect a top-level `{ ... }` dictionary.
	pub fn openstep() -> Self {
		Self {
			variant: TextVariant::Dictionary,
			unescaped: UnescapedSet::STRINGS_FILE,
			allow_lone_surrogates: false,
			max_depth: 512,
		}
	}

	/// Expect bare `key = value;` lines.
	pub fn strings() -> Self {
		Self {
			variant: TextVariant::Strings,
			..Self::openstep()
		}
	}
}

/// Decode OpenStep or `.strings` text into ordered key/value pairs.
///
/// Every decoded string whose units are all below 0x80 comes back as
/// [`Value::AsciiString`], whatever variant it was encoded from. Text carries
/// no storage tag, so a [`Value::UnicodeString`] of ASCII units does not
/// survive a text round trip unchanged.
pub fn decode_text(bytes: &[u8], opt: &TextDecodeOptions) -> Result<Vec<(Value, Value)>> {
	let mut parser = Parser::new(bytes, *opt);
	let pairs = match opt.variant {
		TextVariant::Dictionary => {
			match parser.peek()? {
				Some(b'{') => parser.pos += 1,
				Some(_) => return Err(parser.unexpected()),
				None => return Err(parser.error(SyntaxReason::UnexpectedEof)),
			}
			let pairs = parser.pairs(Some(b'}'))?;
			if parser.peek()?.is_some() {
				return Err(parser.error(SyntaxReason::TrailingContent));
			}
			pairs
		}
		TextVariant::Strings => parser.pairs(None)?,
	};
	debug!("decoded {} text pairs from {} bytes", pairs.len(), bytes.len());
	Ok(pairs)
}

/// First significant byte after whitespace, comments and a UTF-8 byte order mark.
pub(crate) fn first_token_byte(bytes: &[u8]) -> Option<u8> {
	Parser::new(bytes, TextDecodeOptions::default()).peek().ok().flatten()
}

struct Parser<'a> {
	bytes: &'a [u8],
	pos: usize,
	depth: usize,
	opt: TextDecodeOptions,
}

impl<'a> Parser<'a> {
	fn new(bytes: &'a [u8], opt: TextDecodeOptions) -> Self {
		let pos = if bytes.starts_with(b"\xef\xbb\xbf") { 3 } else { 0 };
		Self { bytes, pos, depth: 0, opt }
	}

	fn error_at(&self, pos: usize, reason: SyntaxReason) -> PlistError {
		PlistError::syntax_at(self.bytes, pos, reason)
	}

	fn error(&self, reason: SyntaxReason) -> PlistError {
		self.error_at(self.pos, reason)
	}

	fn unexpected(&self) -> PlistError {
		PlistError::unexpected_at(self.bytes, self.pos)
	}

	fn is_line_separator(&self, pos: usize) -> bool {
		self.bytes.get(pos..pos + 3).is_some_and(|raw| raw[0] == 0xe2 && raw[1] == 0x80 && (raw[2] == 0xa8 || raw[2] == 0xa9))
	}

	/// Skip whitespace and comments, then return the next byte without consuming it.
	fn peek(&mut self) -> Result<Option<u8>> {
		loop {
			let Some(&byte) = self.bytes.get(self.pos) else {
				return Ok(None);
			};
			match byte {
				b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ' => self.pos += 1,
				0xe2 if self.is_line_separator(self.pos) => self.pos += 3,
				b'/' if self.bytes.get(self.pos + 1) == Some(&b'/') => {
					self.pos += 2;
					while let Some(&byte) = self.bytes.get(self.pos) {
						if byte == b'\n' || byte == b'\r' || self.is_line_separator(self.pos) {
							break;
						}
						self.pos += 1;
					}
				}
				b'/' if self.bytes.get(self.pos + 1) == Some(&b'*') => {
					let start = self.pos;
					let body = &self.bytes[self.pos + 2..];
					let Some(end) = body.windows(2).position(|pair| pair == b"*/") else {
						return Err(self.error_at(start, SyntaxReason::UnterminatedComment));
					};
					self.pos += 2 + end + 2;
				}
				_ => return Ok(Some(byte)),
			}
		}
	}

	/// Parse `key = value;` entries until `closing` (consumed) or end of input.
	fn pairs(&mut self, closing: Option<u8>) -> Result<Vec<(Value, Value)>> {
		let mut out = Vec::new();
		loop {
			match self.peek()? {
				None if closing.is_some() => return Err(self.error(SyntaxReason::UnbalancedBraces)),
				None => return Ok(out),
				Some(byte) if Some(byte) == closing => {
					self.pos += 1;
					return Ok(out);
				}
				Some(b'}' | b')') => return Err(self.error(SyntaxReason::UnbalancedBraces)),
				Some(_) => {}
			}

			let key = self.string_token()?;
			let value = match self.peek()? {
				Some(b';') => key.clone(),
				Some(b'=') => {
					self.pos += 1;
					let value = self.value()?;
					if self.peek()? != Some(b';') {
						return Err(self.error(SyntaxReason::MissingSemicolon));
					}
					value
				}
				Some(_) => return Err(self.error(SyntaxReason::MissingEquals)),
				None => return Err(self.error(SyntaxReason::UnexpectedEof)),
			};
			self.pos += 1;
			out.push((key, value));
		}
	}

	fn value(&mut self) -> Result<Value> {
		match self.peek()? {
			Some(b'{') => {
				self.enter()?;
				self.pos += 1;
				let pairs = self.pairs(Some(b'}'))?;
				self.depth -= 1;
				Ok(Value::Dictionary(pairs))
			}
			Some(b'(') => {
				self.enter()?;
				self.pos += 1;
				let items = self.array_items()?;
				self.depth -= 1;
				Ok(Value::Array(items))
			}
			Some(b'<') => self.data(),
			Some(_) => self.string_token(),
			None => Err(self.error(SyntaxReason::UnexpectedEof)),
		}
	}

	fn enter(&mut self) -> Result<()> {
		if self.depth >= self.opt.max_depth {
			return Err(PlistError::DepthExceeded { max_depth: self.opt.max_depth });
		}
		self.depth += 1;
		Ok(())
	}

	fn array_items(&mut self) -> Result<Vec<Value>> {
		let mut items = Vec::new();
		loop {
			match self.peek()? {
				Some(b')') => {
					self.pos += 1;
					return Ok(items);
				}
				None => return Err(self.error(SyntaxReason::UnbalancedBraces)),
				Some(_) => items.push(self.value()?),
			}
			match self.peek()? {
				Some(b',') => self.pos += 1,
				Some(b')') => {}
				Some(_) => return Err(self.unexpected()),
				None => return Err(self.error(SyntaxReason::UnbalancedBraces)),
			}
		}
	}

	fn data(&mut self) -> Result<Value> {
		let start = self.pos;
		self.pos += 1;
		let mut out = Vec::new();
		let mut high: Option<u8> = None;
		loop {
			let Some(&byte) = self.bytes.get(self.pos) else {
				return Err(self.error_at(start, SyntaxReason::InvalidData));
			};
			self.pos += 1;
			match byte {
				b'>' if high.is_none() => return Ok(Value::Data(out)),
				b' ' | b'\t' | b'\n' | b'\r' => {}
				_ => {
					let Some(nibble) = char::from(byte).to_digit(16) else {
						return Err(self.error_at(self.pos - 1, SyntaxReason::InvalidData));
					};
					match high.take() {
						Some(hi) => out.push((hi << 4) | nibble as u8),
						None => high = Some(nibble as u8),
					}
				}
			}
		}
	}

	/// Parse a quoted string or a bare token.
	fn string_token(&mut self) -> Result<Value> {
		match self.peek()? {
			Some(quote @ (b'"' | b'\'')) => self.quoted(quote),
			Some(byte) if self.opt.unescaped.contains(u32::from(byte)) => {
				let start = self.pos;
				while self.bytes.get(self.pos).is_some_and(|byte| self.opt.unescaped.contains(u32::from(*byte))) {
					self.pos += 1;
				}
				Ok(Value::AsciiString(self.bytes[start..self.pos].to_vec()))
			}
			Some(_) => Err(self.unexpected()),
			None => Err(self.error(SyntaxReason::UnexpectedEof)),
		}
	}

	fn quoted(&mut self, quote: u8) -> Result<Value> {
		let start = self.pos;
		self.pos += 1;
		let mut units = Vec::new();
		loop {
			let Some(&byte) = self.bytes.get(self.pos) else {
				return Err(self.error_at(start, SyntaxReason::UnterminatedQuote));
			};
			if byte == quote {
				self.pos += 1;
				break;
			}
			if byte == b'\\' {
				let Some((unit, used)) = unescape_sequence(&self.bytes[self.pos + 1..]) else {
					return Err(self.error(SyntaxReason::InvalidEscape));
				};
				units.push(unit);
				self.pos += 1 + used;
			} else if byte < 0x80 {
				units.push(u16::from(byte));
				self.pos += 1;
			} else {
				let ch = self.utf8_char()?;
				let mut buf = [0_u16; 2];
				units.extend_from_slice(ch.encode_utf16(&mut buf));
			}
		}

		if !self.opt.allow_lone_surrogates
			&& let Some(unit) = unpaired_surrogate(&units)
		{
			return Err(self.error_at(start, SyntaxReason::UnpairedSurrogate { unit }));
		}
		Ok(Value::from_utf16(units))
	}

	fn utf8_char(&mut self) -> Result<char> {
		let rest = &self.bytes[self.pos..];
		let text = match std::str::from_utf8(&rest[..rest.len().min(4)]) {
			Ok(text) => text,
			Err(err) => std::str::from_utf8(&rest[..err.valid_up_to()]).unwrap_or_default(),
		};
		let Some(ch) = text.chars().next() else {
			return Err(self.error(SyntaxReason::InvalidUtf8));
		};
		self.pos += ch.len_utf8();
		Ok(ch)
	}
}

fn unpaired_surrogate(units: &[u16]) -> Option<u16> {
	let mut idx = 0;
	while idx < units.len() {
		let unit = units[idx];
		match unit {
			0xd800..=0xdbff if units.get(idx + 1).is_some_and(|next| (0xdc00..=0xdfff).contains(next)) => idx += 2,
			0xd800..=0xdfff => return Some(unit),
			_ => idx += 1,
		}
	}
	None
}
