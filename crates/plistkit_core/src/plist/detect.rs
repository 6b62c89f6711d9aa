use crate::plist::text_decode::first_token_byte;
use crate::plist::trailer::MAGIC;

/// Serialized plist flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// `bplist00` binary container.
	Binary,
	/// XML document with a `<plist>` root.
	Xml,
	/// Text wrapped in a top-level dictionary.
	OpenStep,
	/// Bare `key = value;` lines.
	Strings,
}

impl Format {
	/// Short lowercase name used by the command line.
	pub fn name(self) -> &'static str {
		match self {
			Format::Binary => "binary",
			Format::Xml => "xml",
			Format::OpenStep => "openstep",
			Format::Strings => "strings",
		}
	}
}

/// Guess the format from the leading bytes.
///
/// Input opening with `<` after trivia is XML and input opening with `{` is
/// an OpenStep dictionary. Anything else, including empty input, is treated
/// as a strings file.
pub fn detect_format(bytes: &[u8]) -> Format {
	if bytes.starts_with(MAGIC) {
		return Format::Binary;
	}
	match first_token_byte(bytes) {
		Some(b'{') => Format::OpenStep,
		Some(b'<') => Format::Xml,
		_ => Format::Strings,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_each_format() {
		assert_eq!(detect_format(b"bplist00\x00"), Format::Binary);
		assert_eq!(detect_format(b"/* c */\n{ k = v; }"), Format::OpenStep);
		assert_eq!(detect_format(b"k = v;"), Format::Strings);
		assert_eq!(detect_format(b""), Format::Strings);
		assert_eq!(detect_format(b"bplist01"), Format::Strings);
		assert_eq!(detect_format(b"\xef\xbb\xbf<?xml version=\"1.0\"?><plist/>"), Format::Xml);
		assert_eq!(detect_format(b"  <array/>"), Format::Xml);
	}
}
