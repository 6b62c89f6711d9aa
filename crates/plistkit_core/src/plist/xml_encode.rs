use std::fmt::Write;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use chrono::{DateTime, Datelike, Timelike};
use log::debug;

use crate::plist::{PlistError, Result, Value};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub(crate) const UNIX_TO_REFERENCE: i64 = 978_307_200;

/// Public identifier of the 1.0 property-list DTD.
pub const XML_DOCTYPE_PUBLIC: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const DATA_LINE: usize = 76;

/// XML encoder configuration.
#[derive(Debug, Clone)]
pub struct XmlEncodeOptions {
	/// Indentation unit repeated once per nesting level; tabs and spaces only.
	pub indent: String,
	/// Document type line written after the XML declaration, if any.
	pub doctype: Option<String>,
	/// Value of the `version` attribute on `<plist>`.
	pub version: String,
}

impl Default for XmlEncodeOptions {
	fn default() -> Self {
		Self {
			indent: "\t".to_owned(),
			doctype: Some(XML_DOCTYPE_PUBLIC.to_owned()),
			version: "1.0".to_owned(),
		}
	}
}

/// Encode a value tree as an XML property list.
///
/// Null and set values have no XML spelling, and dictionary keys must be
/// strings. Strings holding unpaired surrogates cannot be written as UTF-8.
pub fn encode_xml(value: &Value, opt: &XmlEncodeOptions) -> Result<Vec<u8>> {
	if !opt.indent.bytes().all(|byte| byte == b'\t' || byte == b' ') {
		return Err(PlistError::UnsupportedValue {
			kind: "indent",
			reason: "indent may only contain tabs and spaces",
		});
	}

	let mut writer = XmlWriter { out: String::new(), opt };
	writer.out.push_str(XML_HEADER);
	writer.out.push('\n');
	if let Some(doctype) = &opt.doctype {
		writer.out.push_str(doctype);
		writer.out.push('\n');
	}
	writer.out.push_str("<plist version=\"");
	escape_into(&mut writer.out, &opt.version, true);
	writer.out.push_str("\">\n");
	writer.value(value, 0)?;
	writer.out.push_str("</plist>\n");
	debug!("encoded {} xml nodes into {} bytes", value.node_count(), writer.out.len());
	Ok(writer.out.into_bytes())
}

struct XmlWriter<'a> {
	out: String,
	opt: &'a XmlEncodeOptions,
}

impl XmlWriter<'_> {
	fn line(&mut self, depth: usize, text: &str) {
		self.indent(depth);
		self.out.push_str(text);
		self.out.push('\n');
	}

	fn indent(&mut self, depth: usize) {
		for _ in 0..depth {
			self.out.push_str(&self.opt.indent);
		}
	}

	fn element(&mut self, depth: usize, tag: &str, body: &str) {
		self.indent(depth);
		let _ = write!(self.out, "<{tag}>{body}</{tag}>");
		self.out.push('\n');
	}

	fn value(&mut self, value: &Value, depth: usize) -> Result<()> {
		match value {
			Value::Bool(true) => self.line(depth, "<true/>"),
			Value::Bool(false) => self.line(depth, "<false/>"),
			Value::Int { value, .. } => self.element(depth, "integer", &value.to_string()),
			Value::Real32(real) => self.element(depth, "real", &real_text(f64::from(*real))),
			Value::Real64(real) => self.element(depth, "real", &real_text(*real)),
			Value::Date(secs) => self.element(depth, "date", &date_text(*secs)?),
			Value::Data(bytes) => {
				self.line(depth, "<data>");
				let encoded = BASE64_STANDARD.encode(bytes);
				for chunk in encoded.as_bytes().chunks(DATA_LINE) {
					self.indent(depth);
					self.out.extend(chunk.iter().map(|byte| char::from(*byte)));
					self.out.push('\n');
				}
				self.line(depth, "</data>");
			}
			Value::AsciiString(_) | Value::UnicodeString(_) => {
				let text = string_text(value)?;
				self.indent(depth);
				self.out.push_str("<string>");
				escape_into(&mut self.out, &text, false);
				self.out.push_str("</string>\n");
			}
			Value::Uid(uid) => {
				self.line(depth, "<dict>");
				self.element(depth + 1, "key", "CF$UID");
				self.element(depth + 1, "integer", &uid.to_string());
				self.line(depth, "</dict>");
			}
			Value::Array(items) if items.is_empty() => self.line(depth, "<array/>"),
			Value::Array(items) => {
				self.line(depth, "<array>");
				for item in items {
					self.value(item, depth + 1)?;
				}
				self.line(depth, "</array>");
			}
			Value::Dictionary(pairs) if pairs.is_empty() => self.line(depth, "<dict/>"),
			Value::Dictionary(pairs) => {
				self.line(depth, "<dict>");
				for (key, item) in pairs {
					if !matches!(key, Value::AsciiString(_) | Value::UnicodeString(_)) {
						return Err(PlistError::UnsupportedValue {
							kind: key.kind_name(),
							reason: "xml keys must be strings",
						});
					}
					let text = string_text(key)?;
					self.indent(depth + 1);
					self.out.push_str("<key>");
					escape_into(&mut self.out, &text, false);
					self.out.push_str("</key>\n");
					self.value(item, depth + 1)?;
				}
				self.line(depth, "</dict>");
			}
			Value::Null | Value::Set(_) => {
				return Err(PlistError::UnsupportedValue {
					kind: value.kind_name(),
					reason: "xml has no element for this variant",
				});
			}
		}
		Ok(())
	}
}

fn string_text(value: &Value) -> Result<String> {
	let units = value.utf16_units().unwrap_or_default();
	String::from_utf16(&units).map_err(|_| PlistError::UnsupportedValue {
		kind: value.kind_name(),
		reason: "unpaired surrogate cannot be written as utf-8",
	})
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			_ => out.push(ch),
		}
	}
}

/// Shortest round-trip spelling; zero drops its sign.
fn real_text(real: f64) -> String {
	if real == 0.0 {
		"0.0".to_owned()
	} else if real.is_nan() {
		"nan".to_owned()
	} else if real == f64::INFINITY {
		"+infinity".to_owned()
	} else if real == f64::NEG_INFINITY {
		"-infinity".to_owned()
	} else {
		format!("{real:?}")
	}
}

/// `YYYY-MM-DDTHH:MM:SSZ` with fractional seconds truncated toward the past.
fn date_text(secs: f64) -> Result<String> {
	let out_of_range = PlistError::UnsupportedValue {
		kind: "date",
		reason: "date is outside the representable calendar range",
	};
	if !secs.is_finite() {
		return Err(out_of_range);
	}
	let floored = secs.floor();
	if floored.abs() > 1.0e15 {
		return Err(out_of_range);
	}
	let Some(stamp) = (floored as i64).checked_add(UNIX_TO_REFERENCE).and_then(|unix| DateTime::from_timestamp(unix, 0)) else {
		return Err(out_of_range);
	};

	let year = stamp.year();
	let year = if year < 0 { format!("-{:03}", year.unsigned_abs()) } else { format!("{year:04}") };
	Ok(format!(
		"{year}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
		stamp.month(),
		stamp.day(),
		stamp.hour(),
		stamp.minute(),
		stamp.second()
	))
}
