use crate::plist::{IntWidth, MalformedReason, PlistError, Result};

/// Bounded big-endian cursor over an immutable byte slice.
///
/// Positions are absolute offsets into the slice the cursor was created over.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at `pos`.
	pub fn at(bytes: &'a [u8], pos: usize) -> Self {
		Self { bytes, pos }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(PlistError::malformed(
				self.pos,
				MalformedReason::PayloadOutOfRange {
					need: n,
					rem: self.remaining(),
				},
			));
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a big-endian unsigned integer of 1..=8 bytes.
	pub fn read_uint(&mut self, width: usize) -> Result<u64> {
		let raw = self.read_exact(width)?;
		Ok(be_uint(raw))
	}

	/// Read a big-endian two's-complement integer and sign-extend it.
	pub fn read_int(&mut self, width: IntWidth) -> Result<i64> {
		let raw = self.read_exact(width.bytes())?;
		Ok(match width {
			IntWidth::W1 => i64::from(raw[0] as i8),
			IntWidth::W2 => i64::from(i16::from_be_bytes([raw[0], raw[1]])),
			IntWidth::W4 => i64::from(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])),
			IntWidth::W8 => be_uint(raw) as i64,
		})
	}

	/// Read a big-endian `f32`.
	pub fn read_f32(&mut self) -> Result<f32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(f32::from_be_bytes(buf))
	}

	/// Read a big-endian `f64`.
	pub fn read_f64(&mut self) -> Result<f64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(f64::from_be_bytes(buf))
	}
}

/// Fold up to eight big-endian bytes into a `u64`.
pub fn be_uint(raw: &[u8]) -> u64 {
	raw.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// Append the low `width` bytes of `value` in big-endian order.
pub fn put_uint(out: &mut Vec<u8>, value: u64, width: usize) {
	let raw = value.to_be_bytes();
	out.extend_from_slice(&raw[raw.len() - width..]);
}

#[cfg(test)]
mod tests {
	use super::{Cursor, be_uint, put_uint};
	use crate::plist::{ErrorKind, IntWidth};

	#[test]
	fn reads_sign_extended_integers() {
		let bytes = [0xff, 0xff, 0xfe, 0x7f];
		let mut cursor = Cursor::at(&bytes, 0);
		assert_eq!(cursor.read_int(IntWidth::W1).expect("one byte"), -1);
		assert_eq!(cursor.read_int(IntWidth::W1).expect("one byte"), -1);
		assert_eq!(cursor.read_int(IntWidth::W2).expect("two bytes"), -385);
		assert_eq!(cursor.pos(), 4);
	}

	#[test]
	fn short_read_reports_offset() {
		let bytes = [1, 2, 3];
		let mut cursor = Cursor::at(&bytes, 2);
		let err = cursor.read_uint(2).expect_err("only one byte left");
		assert_eq!(err.kind(), ErrorKind::MalformedFile);
		assert!(err.to_string().contains("offset 2"));
	}

	#[test]
	fn put_uint_truncates_to_width() {
		let mut out = Vec::new();
		put_uint(&mut out, 0x0102_0304, 2);
		put_uint(&mut out, 9, 1);
		assert_eq!(out, vec![0x03, 0x04, 0x09]);
		assert_eq!(be_uint(&[0x01, 0x00]), 256);
	}
}
