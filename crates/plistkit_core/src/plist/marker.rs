use crate::plist::IntWidth;

/// Low nibble flagging that the true count follows as an inline integer object.
pub const EXTENDED_NIBBLE: u8 = 0x0f;

/// Largest count or length stored directly in a marker's low nibble.
pub const MAX_INLINE_COUNT: usize = 14;

/// Decoded object marker byte.
///
/// The high nibble selects the object type, the low nibble carries an inline
/// size, a width exponent, or [`EXTENDED_NIBBLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	/// `0x00`.
	Null,
	/// `0x08`.
	False,
	/// `0x09`.
	True,
	/// `0x10..=0x13`.
	Int(IntWidth),
	/// `0x14`, sixteen-byte integer.
	Int128,
	/// `0x22`.
	Real32,
	/// `0x23`.
	Real64,
	/// `0x33`.
	Date,
	/// `0x4n`.
	Data(u8),
	/// `0x5n`.
	AsciiString(u8),
	/// `0x6n`.
	UnicodeString(u8),
	/// `0x8n`, payload width is `n + 1`.
	Uid(u8),
	/// `0xAn`.
	Array(u8),
	/// `0xCn`.
	Set(u8),
	/// `0xDn`.
	Dictionary(u8),
}

impl Marker {
	/// Classify a raw marker byte.
	pub fn parse(byte: u8) -> Option<Self> {
		let low = byte & 0x0f;
		Some(match byte >> 4 {
			0x0 => match byte {
				0x00 => Self::Null,
				0x08 => Self::False,
				0x09 => Self::True,
				_ => return None,
			},
			0x1 => match low {
				4 => Self::Int128,
				_ => Self::Int(IntWidth::from_log2(low)?),
			},
			0x2 => match low {
				2 => Self::Real32,
				3 => Self::Real64,
				_ => return None,
			},
			0x3 if low == 3 => Self::Date,
			0x4 => Self::Data(low),
			0x5 => Self::AsciiString(low),
			0x6 => Self::UnicodeString(low),
			0x8 => Self::Uid(low),
			0xa => Self::Array(low),
			0xc => Self::Set(low),
			0xd => Self::Dictionary(low),
			_ => return None,
		})
	}

	/// Raw marker byte.
	pub fn to_byte(self) -> u8 {
		match self {
			Self::Null => 0x00,
			Self::False => 0x08,
			Self::True => 0x09,
			Self::Int(width) => 0x10 | width.log2(),
			Self::Int128 => 0x14,
			Self::Real32 => 0x22,
			Self::Real64 => 0x23,
			Self::Date => 0x33,
			Self::Data(low) => 0x40 | (low & 0x0f),
			Self::AsciiString(low) => 0x50 | (low & 0x0f),
			Self::UnicodeString(low) => 0x60 | (low & 0x0f),
			Self::Uid(low) => 0x80 | (low & 0x0f),
			Self::Array(low) => 0xa0 | (low & 0x0f),
			Self::Set(low) => 0xc0 | (low & 0x0f),
			Self::Dictionary(low) => 0xd0 | (low & 0x0f),
		}
	}

	/// Low nibble to store for a count, or [`EXTENDED_NIBBLE`] when it does not fit.
	pub fn count_nibble(count: usize) -> u8 {
		if count <= MAX_INLINE_COUNT { count as u8 } else { EXTENDED_NIBBLE }
	}
}
