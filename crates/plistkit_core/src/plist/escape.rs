//! Single-character escaping for the OpenStep / `.strings` text grammar.
//!
//! Every choice here is driven by an [`EscapeConfig`] passed in by the caller:
//! which ASCII characters may appear bare, which control characters get octal
//! escapes, and which quote character delimits tokens.

use std::fmt::Write;

use crate::plist::nextstep::nextstep_to_unicode;

/// Set of ASCII characters allowed to appear in a bare token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnescapedSet {
	bits: u128,
}

impl UnescapedSet {
	/// `[0-9A-Za-z]`, used for dictionary-style keys.
	pub const PLAIN_IDENTIFIER: Self = Self::from_bytes(b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");
	/// `[0-9A-Za-z_$/:.-]`, used for `.strings`-style identifiers.
	pub const STRINGS_FILE: Self = Self::from_bytes(b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$/:.-");

	/// Build a set from ASCII bytes; bytes at or above 0x80 are ignored.
	pub const fn from_bytes(bytes: &[u8]) -> Self {
		let mut bits = 0_u128;
		let mut idx = 0;
		while idx < bytes.len() {
			if bytes[idx] < 0x80 {
				bits |= 1 << bytes[idx];
			}
			idx += 1;
		}
		Self { bits }
	}

	/// Whether `unit` may appear bare.
	pub fn contains(self, unit: u32) -> bool {
		unit < 0x80 && self.bits & (1 << unit) != 0
	}
}

/// Which control characters receive octal escapes on top of the named table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapePreset {
	/// Only the named escapes; other controls are written literally inside quotes.
	Named,
	/// Named escapes plus `\0`..`\6` for code points 0-6.
	LowOctal,
	/// Named escapes plus octal for 0-6, 14-31 and 127.
	Octal,
}

impl EscapePreset {
	fn octal(self, unit: u16) -> bool {
		match self {
			Self::Named => false,
			Self::LowOctal => unit <= 6,
			Self::Octal => unit <= 6 || (14..=31).contains(&unit) || unit == 127,
		}
	}
}

/// Token delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
	/// `"`.
	#[default]
	Double,
	/// `'`.
	Single,
}

impl Quote {
	/// Delimiter byte.
	pub fn byte(self) -> u8 {
		match self {
			Self::Double => b'"',
			Self::Single => b'\'',
		}
	}
}

/// Escaping configuration handed to the text codec at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeConfig {
	/// Characters allowed bare.
	pub unescaped: UnescapedSet,
	/// Control character handling.
	pub preset: EscapePreset,
	/// Token delimiter.
	pub quote: Quote,
}

impl Default for EscapeConfig {
	fn default() -> Self {
		Self::strings_file()
	}
}

/// Representation of one UTF-16 unit or code point inside a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaped {
	/// Literal character from the unescaped set.
	Bare(u8),
	/// Literal ASCII character that forces the token to be quoted.
	Quoted(u8),
	/// Backslash followed by this letter or punctuation byte.
	Named(u8),
	/// Backslash followed by octal digits.
	Octal(u8),
	/// `\U` followed by four lowercase hex digits.
	Unicode(u16),
	/// Supplementary-plane code point as two `\U` escapes.
	Pair(u16, u16),
}

impl Escaped {
	/// Whether the surrounding token needs quotes.
	pub fn requires_quoting(self) -> bool {
		!matches!(self, Self::Bare(_))
	}

	fn starts_with_octal_digit(self) -> bool {
		matches!(self, Self::Bare(b'0'..=b'7') | Self::Quoted(b'0'..=b'7'))
	}

	/// Append the textual form; `pad_octal` widens octal escapes to three digits.
	pub fn write_to(self, out: &mut String, pad_octal: bool) {
		match self {
			Self::Bare(byte) | Self::Quoted(byte) => out.push(char::from(byte)),
			Self::Named(letter) => {
				out.push('\\');
				out.push(char::from(letter));
			}
			Self::Octal(value) if pad_octal => {
				let _ = write!(out, "\\{value:03o}");
			}
			Self::Octal(value) => {
				let _ = write!(out, "\\{value:o}");
			}
			Self::Unicode(unit) => {
				let _ = write!(out, "\\U{unit:04x}");
			}
			Self::Pair(high, low) => {
				let _ = write!(out, "\\U{high:04x}\\U{low:04x}");
			}
		}
	}
}

impl EscapeConfig {
	/// Dictionary-key preset: `[0-9A-Za-z]` bare, `\0`..`\6` for the lowest controls.
	pub fn plain_identifier() -> Self {
		Self {
			unescaped: UnescapedSet::PLAIN_IDENTIFIER,
			preset: EscapePreset::LowOctal,
			quote: Quote::Double,
		}
	}

	/// `.strings` preset: `[0-9A-Za-z_$/:.-]` bare, octal for every unnamed control.
	pub fn strings_file() -> Self {
		Self {
			unescaped: UnescapedSet::STRINGS_FILE,
			preset: EscapePreset::Octal,
			quote: Quote::Double,
		}
	}

	/// Classify one UTF-16 unit.
	pub fn escape_unit(&self, unit: u16) -> Escaped {
		if let Some(letter) = self.named_escape(unit) {
			return Escaped::Named(letter);
		}
		if self.preset.octal(unit) {
			return Escaped::Octal(unit as u8);
		}
		if unit < 0x80 {
			let byte = unit as u8;
			return if self.unescaped.contains(u32::from(unit)) { Escaped::Bare(byte) } else { Escaped::Quoted(byte) };
		}
		Escaped::Unicode(unit)
	}

	/// Classify one Unicode scalar, splitting supplementary-plane characters into surrogates.
	pub fn escape_char(&self, ch: char) -> Escaped {
		let mut buf = [0_u16; 2];
		match *ch.encode_utf16(&mut buf) {
			[unit] => self.escape_unit(unit),
			[high, low] => Escaped::Pair(high, low),
			_ => Escaped::Unicode(0xfffd),
		}
	}

	/// Render a whole token, adding quotes when any unit needs escaping or the token is empty.
	pub fn render_token(&self, units: &[u16]) -> String {
		let escaped: Vec<Escaped> = units.iter().map(|unit| self.escape_unit(*unit)).collect();
		let quoted = escaped.is_empty() || escaped.iter().any(|item| item.requires_quoting());

		let mut out = String::with_capacity(units.len() + 2);
		if quoted {
			out.push(char::from(self.quote.byte()));
		}
		for (idx, item) in escaped.iter().enumerate() {
			let pad = escaped.get(idx + 1).is_some_and(|next| next.starts_with_octal_digit());
			item.write_to(&mut out, pad);
		}
		if quoted {
			out.push(char::from(self.quote.byte()));
		}
		out
	}

	/// Render a Rust string as a token.
	pub fn render_str(&self, text: &str) -> String {
		self.render_token(&text.encode_utf16().collect::<Vec<_>>())
	}

	fn named_escape(&self, unit: u16) -> Option<u8> {
		Some(match unit {
			7 => b'a',
			8 => b'b',
			9 => b't',
			10 => b'n',
			11 => b'v',
			12 => b'f',
			13 => b'r',
			92 => b'\\',
			_ if unit == u16::from(self.quote.byte()) => self.quote.byte(),
			_ => return None,
		})
	}
}

/// Decode one escape sequence; `input` starts just after the backslash.
///
/// Returns the UTF-16 unit and the number of bytes consumed, or `None` for an
/// unrecognized sequence.
pub fn unescape_sequence(input: &[u8]) -> Option<(u16, usize)> {
	let first = *input.first()?;
	let unit = match first {
		b'a' => 7,
		b'b' => 8,
		b't' => 9,
		b'n' => 10,
		b'v' => 11,
		b'f' => 12,
		b'r' => 13,
		b'"' | b'\'' | b'\\' => u16::from(first),
		b'0'..=b'7' => {
			let digits = input.iter().take(3).take_while(|byte| (b'0'..=b'7').contains(*byte)).count();
			let value = input[..digits].iter().fold(0_u16, |acc, byte| acc * 8 + u16::from(*byte - b'0'));
			let unit = match u8::try_from(value) {
				Ok(byte) => nextstep_to_unicode(byte),
				Err(_) => return None,
			};
			return Some((unit, digits));
		}
		b'U' | b'u' => {
			let digits = input[1..].iter().take(4).take_while(|byte| byte.is_ascii_hexdigit()).count();
			if digits == 0 {
				return None;
			}
			let hex = std::str::from_utf8(&input[1..=digits]).ok()?;
			return Some((u16::from_str_radix(hex, 16).ok()?, digits + 1));
		}
		_ => return None,
	};
	Some((unit, 1))
}

#[cfg(test)]
mod tests;
