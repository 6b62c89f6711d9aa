use crate::plist::bytes::{Cursor, put_uint};
use crate::plist::{MalformedReason, PlistError, Result};

/// Fixed `bplist00` file magic.
pub const MAGIC: &[u8; 8] = b"bplist00";

/// Parsed 32-byte binary trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
	/// Byte width of each offset table entry.
	pub offset_int_size: u8,
	/// Byte width of object references inside containers.
	pub object_ref_size: u8,
	/// Number of objects in the object table.
	pub num_objects: u64,
	/// Index of the root object.
	pub top_object: u64,
	/// Absolute offset of the offset table.
	pub offset_table_offset: u64,
}

impl Trailer {
	/// Exact trailer size in bytes.
	pub const SIZE: usize = 32;

	/// Parse and validate the trailer at the end of `bytes`, checking the magic as well.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if bytes.get(..MAGIC.len()) != Some(MAGIC.as_slice()) {
			return Err(PlistError::malformed(0, MalformedReason::BadMagic));
		}
		let len = bytes.len();
		if len < MAGIC.len() + Self::SIZE {
			return Err(PlistError::malformed(len, MalformedReason::TruncatedTrailer));
		}

		let start = len - Self::SIZE;
		let mut cursor = Cursor::at(bytes, start + 6);
		let offset_int_size = cursor.read_u8()?;
		let object_ref_size = cursor.read_u8()?;
		let num_objects = cursor.read_uint(8)?;
		let top_object = cursor.read_uint(8)?;
		let offset_table_offset = cursor.read_uint(8)?;

		let trailer = Self {
			offset_int_size,
			object_ref_size,
			num_objects,
			top_object,
			offset_table_offset,
		};
		trailer.validate(start)?;
		Ok(trailer)
	}

	fn validate(&self, start: usize) -> Result<()> {
		check_width("offset", self.offset_int_size, start + 6)?;
		check_width("object ref", self.object_ref_size, start + 7)?;

		if self.num_objects == 0 {
			return Err(PlistError::malformed(start + 8, MalformedReason::NoObjects));
		}
		if self.top_object >= self.num_objects {
			return Err(PlistError::malformed(
				start + 16,
				MalformedReason::TopOutOfRange {
					top: self.top_object,
					count: self.num_objects,
				},
			));
		}

		let misplaced = PlistError::malformed(
			start + 24,
			MalformedReason::OffsetTableOutOfRange {
				offset: self.offset_table_offset,
			},
		);
		if self.offset_table_offset < (MAGIC.len() + 1) as u64 {
			return Err(misplaced);
		}
		let table_len = self.num_objects.checked_mul(u64::from(self.offset_int_size));
		let table_end = table_len.and_then(|table_len| table_len.checked_add(self.offset_table_offset));
		if table_end != Some(start as u64) {
			return Err(misplaced);
		}

		let max_ref = self.num_objects - 1;
		if self.object_ref_size < 8 && max_ref >> (u32::from(self.object_ref_size) * 8) != 0 {
			return Err(PlistError::malformed(
				start + 7,
				MalformedReason::WidthTooSmall {
					field: "object ref",
					width: self.object_ref_size,
					value: max_ref,
				},
			));
		}
		let table = self.offset_table_offset;
		if self.offset_int_size < 8 && table >> (u32::from(self.offset_int_size) * 8) != 0 {
			return Err(PlistError::malformed(
				start + 6,
				MalformedReason::WidthTooSmall {
					field: "offset",
					width: self.offset_int_size,
					value: table,
				},
			));
		}
		Ok(())
	}

	/// Read every offset table entry, checking each lands inside the object table.
	pub fn read_offsets(&self, bytes: &[u8]) -> Result<Vec<usize>> {
		let table = self.offset_table_offset as usize;
		let width = usize::from(self.offset_int_size);
		let mut cursor = Cursor::at(bytes, table);
		let mut offsets = Vec::with_capacity(self.num_objects as usize);
		for _ in 0..self.num_objects {
			let at = cursor.pos();
			let offset = cursor.read_uint(width)?;
			if offset < MAGIC.len() as u64 || offset >= table as u64 {
				return Err(PlistError::malformed(at, MalformedReason::OffsetOutOfRange { offset }));
			}
			offsets.push(offset as usize);
		}
		Ok(offsets)
	}

	/// Append the 32-byte trailer encoding.
	pub fn write(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&[0_u8; 6]);
		out.push(self.offset_int_size);
		out.push(self.object_ref_size);
		put_uint(out, self.num_objects, 8);
		put_uint(out, self.top_object, 8);
		put_uint(out, self.offset_table_offset, 8);
	}
}

fn check_width(field: &'static str, width: u8, at: usize) -> Result<()> {
	if (1..=8).contains(&width) {
		Ok(())
	} else {
		Err(PlistError::malformed(at, MalformedReason::BadWidth { field, width }))
	}
}
