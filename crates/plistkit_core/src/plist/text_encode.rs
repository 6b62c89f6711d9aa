use std::fmt::Write;

use log::debug;

use crate::plist::{EscapeConfig, PlistError, Result, Value};

/// Text container form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextVariant {
	/// Pairs wrapped in a top-level `{` / `}` dictionary.
	#[default]
	Dictionary,
	/// Bare `key = value;` lines, as in `.strings` files.
	Strings,
}

/// Text encoder configuration.
#[derive(Debug, Clone)]
pub struct TextEncodeOptions {
	/// Container form.
	pub variant: TextVariant,
	/// Escaping rules for every string token.
	pub escape: EscapeConfig,
	/// Indentation unit repeated once per nesting level; tabs and spaces only.
	pub indent: String,
	/// Write `key;` when a value is identical to its key.
	pub shortcut: bool,
}

impl Default for TextEncodeOptions {
	fn default() -> Self {
		Self::openstep()
	}
}

impl TextEncodeOptions {
	/// OpenStep dictionary with plain-identifier escaping.
	pub fn openstep() -> Self {
		Self {
			variant: TextVariant::Dictionary,
			escape: EscapeConfig::plain_identifier(),
			indent: "\t".to_owned(),
			shortcut: false,
		}
	}

	/// `.strings` lines with strings-file escaping.
	pub fn strings() -> Self {
		Self {
			variant: TextVariant::Strings,
			escape: EscapeConfig::strings_file(),
			indent: "\t".to_owned(),
			shortcut: false,
		}
	}
}

/// Encode ordered key/value pairs in the OpenStep or `.strings` grammar.
///
/// Keys must be strings. Values may be strings, data, arrays or dictionaries;
/// the grammar has no spelling for the other variants.
pub fn encode_text(pairs: &[(Value, Value)], opt: &TextEncodeOptions) -> Result<Vec<u8>> {
	if !opt.indent.bytes().all(|byte| byte == b'\t' || byte == b' ') {
		return Err(PlistError::UnsupportedValue {
			kind: "indent",
			reason: "indent may only contain tabs and spaces",
		});
	}

	let mut writer = TextWriter { out: String::new(), opt };
	match opt.variant {
		TextVariant::Dictionary => {
			writer.out.push('{');
			writer.pairs(pairs, 1)?;
			writer.out.push_str("}\n");
		}
		TextVariant::Strings => {
			for (idx, (key, value)) in pairs.iter().enumerate() {
				if idx > 0 {
					writer.out.push('\n');
				}
				writer.entry(key, value, 0)?;
			}
			if !pairs.is_empty() {
				writer.out.push('\n');
			}
		}
	}
	debug!("encoded {} text pairs into {} bytes", pairs.len(), writer.out.len());
	Ok(writer.out.into_bytes())
}

struct TextWriter<'a> {
	out: String,
	opt: &'a TextEncodeOptions,
}

impl TextWriter<'_> {
	fn newline(&mut self, depth: usize) {
		self.out.push('\n');
		for _ in 0..depth {
			self.out.push_str(&self.opt.indent);
		}
	}

	/// Write pairs at `depth`, leaving the closing delimiter to the caller.
	fn pairs(&mut self, pairs: &[(Value, Value)], depth: usize) -> Result<()> {
		for (key, value) in pairs {
			self.newline(depth);
			self.entry(key, value, depth)?;
		}
		if !pairs.is_empty() {
			self.newline(depth - 1);
		}
		Ok(())
	}

	fn entry(&mut self, key: &Value, value: &Value, depth: usize) -> Result<()> {
		let Some(units) = key.utf16_units() else {
			return Err(PlistError::UnsupportedValue {
				kind: key.kind_name(),
				reason: "text keys must be strings",
			});
		};
		let token = self.opt.escape.render_token(&units);
		self.out.push_str(&token);
		if !(self.opt.shortcut && key == value) {
			self.out.push_str(" = ");
			self.value(value, depth)?;
		}
		self.out.push(';');
		Ok(())
	}

	fn value(&mut self, value: &Value, depth: usize) -> Result<()> {
		match value {
			Value::AsciiString(_) | Value::UnicodeString(_) => {
				let units = value.utf16_units().unwrap_or_default();
				let token = self.opt.escape.render_token(&units);
				self.out.push_str(&token);
			}
			Value::Data(bytes) => {
				self.out.push('<');
				for (idx, byte) in bytes.iter().enumerate() {
					if idx > 0 && idx % 4 == 0 {
						self.out.push(' ');
					}
					let _ = write!(self.out, "{byte:02x}");
				}
				self.out.push('>');
			}
			Value::Array(items) => {
				self.out.push('(');
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						self.out.push(',');
					}
					self.newline(depth + 1);
					self.value(item, depth + 1)?;
				}
				if !items.is_empty() {
					self.newline(depth);
				}
				self.out.push(')');
			}
			Value::Dictionary(pairs) => {
				self.out.push('{');
				self.pairs(pairs, depth + 1)?;
				self.out.push('}');
			}
			other => {
				return Err(PlistError::UnsupportedValue {
					kind: other.kind_name(),
					reason: "no text spelling for this variant",
				});
			}
		}
		Ok(())
	}
}
