use std::borrow::Cow;

use crate::plist::{PlistError, Result};

/// Byte width of a binary integer object, always a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntWidth {
	/// One byte.
	W1,
	/// Two bytes.
	W2,
	/// Four bytes.
	W4,
	/// Eight bytes.
	W8,
}

impl IntWidth {
	/// All widths in ascending order.
	pub const ALL: [IntWidth; 4] = [IntWidth::W1, IntWidth::W2, IntWidth::W4, IntWidth::W8];

	/// Width in bytes.
	pub fn bytes(self) -> usize {
		1 << self.log2()
	}

	/// Base-2 logarithm of the byte width, as stored in an integer marker nibble.
	pub fn log2(self) -> u8 {
		match self {
			Self::W1 => 0,
			Self::W2 => 1,
			Self::W4 => 2,
			Self::W8 => 3,
		}
	}

	/// Inverse of [`IntWidth::log2`].
	pub fn from_log2(nibble: u8) -> Option<Self> {
		Self::ALL.get(usize::from(nibble)).copied()
	}

	/// Map a byte count onto a width, if it is one of 1, 2, 4, 8.
	pub fn from_bytes(count: usize) -> Option<Self> {
		Self::ALL.into_iter().find(|width| width.bytes() == count)
	}

	/// Whether `value` is representable in two's-complement form at this width.
	pub fn fits_signed(self, value: i64) -> bool {
		match self {
			Self::W1 => i8::try_from(value).is_ok(),
			Self::W2 => i16::try_from(value).is_ok(),
			Self::W4 => i32::try_from(value).is_ok(),
			Self::W8 => true,
		}
	}

	/// Whether `value` is representable as an unsigned integer at this width.
	pub fn fits_unsigned(self, value: u64) -> bool {
		match self {
			Self::W1 => u8::try_from(value).is_ok(),
			Self::W2 => u16::try_from(value).is_ok(),
			Self::W4 => u32::try_from(value).is_ok(),
			Self::W8 => true,
		}
	}

	/// Smallest width holding `value` in two's-complement form.
	pub fn for_signed(value: i64) -> Self {
		Self::ALL.into_iter().find(|width| width.fits_signed(value)).unwrap_or(Self::W8)
	}

	/// Smallest width holding `value` as an unsigned integer.
	pub fn for_unsigned(value: u64) -> Self {
		Self::ALL.into_iter().find(|width| width.fits_unsigned(value)).unwrap_or(Self::W8)
	}
}

/// One property-list value.
///
/// Equality is structural: same variant and recursively equal payloads. Numeric
/// variants never compare across types, and integers compare their width too.
/// Reals and dates compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone)]
pub enum Value {
	/// Explicit null.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer with its binary storage width.
	Int {
		/// Integer value.
		value: i64,
		/// Storage width, never narrower than [`IntWidth::for_signed`] of `value`.
		width: IntWidth,
	},
	/// Single-precision real.
	Real32(f32),
	/// Double-precision real.
	Real64(f64),
	/// Seconds relative to 2001-01-01T00:00:00Z.
	Date(f64),
	/// Opaque byte payload.
	Data(Vec<u8>),
	/// 7-bit ASCII string bytes.
	AsciiString(Vec<u8>),
	/// UTF-16 code units, possibly containing unpaired surrogates.
	UnicodeString(Vec<u16>),
	/// Keyed-archiver object reference.
	Uid(u64),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// Ordered set; insertion order is kept on the wire.
	Set(Vec<Value>),
	/// Ordered key/value pairs with distinct keys.
	Dictionary(Vec<(Value, Value)>),
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int { value: a, width: wa }, Self::Int { value: b, width: wb }) => a == b && wa == wb,
			(Self::Real32(a), Self::Real32(b)) => a.to_bits() == b.to_bits(),
			(Self::Real64(a), Self::Real64(b)) | (Self::Date(a), Self::Date(b)) => a.to_bits() == b.to_bits(),
			(Self::Data(a), Self::Data(b)) | (Self::AsciiString(a), Self::AsciiString(b)) => a == b,
			(Self::UnicodeString(a), Self::UnicodeString(b)) => a == b,
			(Self::Uid(a), Self::Uid(b)) => a == b,
			(Self::Array(a), Self::Array(b)) | (Self::Set(a), Self::Set(b)) => a == b,
			(Self::Dictionary(a), Self::Dictionary(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Value {}

impl Value {
	/// Integer stored at its minimal two's-complement width.
	pub fn int(value: i64) -> Self {
		Self::Int {
			value,
			width: IntWidth::for_signed(value),
		}
	}

	/// Integer stored at an explicit width, which must be wide enough for `value`.
	pub fn int_with_width(value: i64, width: IntWidth) -> Result<Self> {
		if !width.fits_signed(value) {
			return Err(PlistError::UnsupportedValue {
				kind: "int",
				reason: "requested width is narrower than the value",
			});
		}
		Ok(Self::Int { value, width })
	}

	/// String value, using the ASCII variant when every character is below 0x80.
	pub fn string(text: &str) -> Self {
		if text.is_ascii() {
			Self::AsciiString(text.as_bytes().to_vec())
		} else {
			Self::UnicodeString(text.encode_utf16().collect())
		}
	}

	/// String value from UTF-16 units, narrowed to ASCII when possible.
	pub fn from_utf16(units: Vec<u16>) -> Self {
		if units.iter().all(|unit| *unit < 0x80) {
			Self::AsciiString(units.into_iter().map(|unit| unit as u8).collect())
		} else {
			Self::UnicodeString(units)
		}
	}

	/// Dictionary from pairs, rejecting repeated keys.
	pub fn dictionary(pairs: Vec<(Value, Value)>) -> Result<Self> {
		for (idx, (key, _)) in pairs.iter().enumerate() {
			if pairs[..idx].iter().any(|(seen, _)| seen == key) {
				return Err(PlistError::UnsupportedValue {
					kind: "dict",
					reason: "duplicate dictionary key",
				});
			}
		}
		Ok(Self::Dictionary(pairs))
	}

	/// Stable lowercase variant label.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int { .. } => "int",
			Self::Real32(_) => "real32",
			Self::Real64(_) => "real64",
			Self::Date(_) => "date",
			Self::Data(_) => "data",
			Self::AsciiString(_) => "ascii-string",
			Self::UnicodeString(_) => "unicode-string",
			Self::Uid(_) => "uid",
			Self::Array(_) => "array",
			Self::Set(_) => "set",
			Self::Dictionary(_) => "dict",
		}
	}

	/// Whether this value holds child values.
	pub fn is_container(&self) -> bool {
		matches!(self, Self::Array(_) | Self::Set(_) | Self::Dictionary(_))
	}

	/// UTF-16 view of either string variant.
	pub fn utf16_units(&self) -> Option<Cow<'_, [u16]>> {
		match self {
			Self::AsciiString(bytes) => Some(Cow::Owned(bytes.iter().map(|byte| u16::from(*byte)).collect())),
			Self::UnicodeString(units) => Some(Cow::Borrowed(units)),
			_ => None,
		}
	}

	/// Lossy Rust string for either string variant.
	pub fn to_string_lossy(&self) -> Option<String> {
		match self {
			Self::AsciiString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
			Self::UnicodeString(units) => Some(String::from_utf16_lossy(units)),
			_ => None,
		}
	}

	/// Look up a dictionary value by exact key equality.
	pub fn get(&self, key: &Value) -> Option<&Value> {
		let Self::Dictionary(pairs) = self else {
			return None;
		};
		pairs.iter().find(|(candidate, _)| candidate == key).map(|(_, value)| value)
	}

	/// Direct children in wire order: dictionary keys first, then its values.
	pub fn children(&self) -> Vec<&Value> {
		match self {
			Self::Array(items) | Self::Set(items) => items.iter().collect(),
			Self::Dictionary(pairs) => pairs.iter().map(|(key, _)| key).chain(pairs.iter().map(|(_, value)| value)).collect(),
			_ => Vec::new(),
		}
	}

	/// Depth-first pre-order traversal; `visit` receives each node and its depth.
	pub fn walk<F>(&self, visit: &mut F)
	where
		F: FnMut(&Value, usize),
	{
		self.walk_at(0, visit);
	}

	fn walk_at<F>(&self, depth: usize, visit: &mut F)
	where
		F: FnMut(&Value, usize),
	{
		visit(self, depth);
		for child in self.children() {
			child.walk_at(depth + 1, visit);
		}
	}

	/// Number of nodes in the tree, counting repeats.
	pub fn node_count(&self) -> usize {
		let mut count = 0;
		self.walk(&mut |_, _| count += 1);
		count
	}
}
