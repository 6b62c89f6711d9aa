use log::{debug, trace};

use crate::plist::bytes::{Cursor, be_uint};
use crate::plist::marker::{EXTENDED_NIBBLE, Marker};
use crate::plist::{IntWidth, MalformedReason, PlistError, Result, Trailer, Value};

/// Resource limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
	/// Maximum container nesting depth.
	pub max_depth: usize,
	/// Maximum number of values materialized, counting shared objects once per use.
	pub max_nodes: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			max_nodes: 1 << 22,
		}
	}
}

/// Decode a `bplist00` file with default limits.
pub fn decode_binary(bytes: &[u8]) -> Result<Value> {
	decode_binary_with(bytes, &DecodeOptions::default())
}

/// Decode a `bplist00` file.
pub fn decode_binary_with(bytes: &[u8], opt: &DecodeOptions) -> Result<Value> {
	let trailer = Trailer::parse(bytes)?;
	let offsets = trailer.read_offsets(bytes)?;
	debug!(
		"decoding bplist: {} objects, top={}, offset_size={}, ref_size={}",
		trailer.num_objects, trailer.top_object, trailer.offset_int_size, trailer.object_ref_size
	);

	let mut reader = Reader {
		objects: &bytes[..trailer.offset_table_offset as usize],
		ref_size: usize::from(trailer.object_ref_size),
		on_path: vec![false; offsets.len()],
		offsets,
		nodes: 0,
		opt: *opt,
	};
	let value = reader.read_object(trailer.top_object, 0)?;
	debug!("decoded bplist: {} nodes", reader.nodes);
	Ok(value)
}

struct Reader<'a> {
	/// File bytes up to the offset table; objects never extend past this.
	objects: &'a [u8],
	ref_size: usize,
	offsets: Vec<usize>,
	on_path: Vec<bool>,
	nodes: usize,
	opt: DecodeOptions,
}

impl Reader<'_> {
	fn read_object(&mut self, index: u64, depth: usize) -> Result<Value> {
		self.nodes += 1;
		if self.nodes > self.opt.max_nodes {
			return Err(PlistError::NodeBudgetExceeded { max_nodes: self.opt.max_nodes });
		}
		if depth > self.opt.max_depth {
			return Err(PlistError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		let offset = self.offsets[index as usize];
		let mut cursor = Cursor::at(self.objects, offset);
		let byte = cursor.read_u8()?;
		let marker = Marker::parse(byte).ok_or(PlistError::malformed(offset, MalformedReason::UnknownMarker { marker: byte }))?;
		trace!("object {index} at offset {offset}: {marker:?}");

		Ok(match marker {
			Marker::Null => Value::Null,
			Marker::False => Value::Bool(false),
			Marker::True => Value::Bool(true),
			Marker::Int(width) => Value::Int {
				value: cursor.read_int(width)?,
				width,
			},
			Marker::Int128 => read_int128(&mut cursor)?,
			Marker::Real32 => Value::Real32(cursor.read_f32()?),
			Marker::Real64 => Value::Real64(cursor.read_f64()?),
			Marker::Date => Value::Date(cursor.read_f64()?),
			Marker::Data(nibble) => {
				let len = read_count(&mut cursor, nibble)?;
				Value::Data(cursor.read_exact(len)?.to_vec())
			}
			Marker::AsciiString(nibble) => {
				let len = read_count(&mut cursor, nibble)?;
				let at = cursor.pos();
				let raw = cursor.read_exact(len)?;
				if !raw.is_ascii() {
					return Err(PlistError::malformed(at, MalformedReason::NonAsciiString));
				}
				Value::AsciiString(raw.to_vec())
			}
			Marker::UnicodeString(nibble) => {
				let len = read_count(&mut cursor, nibble)?;
				let at = cursor.pos();
				let raw = cursor.read_exact(checked_len(len, 2, at)?)?;
				Value::UnicodeString(raw.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect())
			}
			Marker::Uid(nibble) => read_uid(&mut cursor, usize::from(nibble) + 1)?,
			Marker::Array(nibble) => {
				let count = read_count(&mut cursor, nibble)?;
				let refs = self.read_refs(&mut cursor, count)?;
				Value::Array(self.read_children(index, offset, &refs, depth)?)
			}
			Marker::Set(nibble) => {
				let count = read_count(&mut cursor, nibble)?;
				let refs = self.read_refs(&mut cursor, count)?;
				Value::Set(self.read_children(index, offset, &refs, depth)?)
			}
			Marker::Dictionary(nibble) => {
				let count = read_count(&mut cursor, nibble)?;
				let at = cursor.pos();
				let refs = self.read_refs(&mut cursor, checked_len(count, 2, at)?)?;
				let mut children = self.read_children(index, offset, &refs, depth)?;
				let values = children.split_off(count);
				Value::Dictionary(children.into_iter().zip(values).collect())
			}
		})
	}

	fn read_refs(&self, cursor: &mut Cursor<'_>, count: usize) -> Result<Vec<(u64, usize)>> {
		let at = cursor.pos();
		cursor.read_exact(checked_len(count, self.ref_size, at)?)?;
		let mut refs = Cursor::at(self.objects, at);
		let mut out = Vec::with_capacity(count);
		for _ in 0..count {
			let pos = refs.pos();
			let index = refs.read_uint(self.ref_size)?;
			if index >= self.offsets.len() as u64 {
				return Err(PlistError::malformed(pos, MalformedReason::RefOutOfRange { index }));
			}
			out.push((index, pos));
		}
		Ok(out)
	}

	fn read_children(&mut self, index: u64, offset: usize, refs: &[(u64, usize)], depth: usize) -> Result<Vec<Value>> {
		self.on_path[index as usize] = true;
		let mut out = Vec::with_capacity(refs.len());
		for (child, _) in refs {
			if self.on_path[*child as usize] {
				self.on_path[index as usize] = false;
				return Err(PlistError::CyclicReference { index: *child, at: offset });
			}
			match self.read_object(*child, depth + 1) {
				Ok(value) => out.push(value),
				Err(err) => {
					self.on_path[index as usize] = false;
					return Err(err);
				}
			}
		}
		self.on_path[index as usize] = false;
		Ok(out)
	}
}

/// Resolve a marker nibble to a count, reading the inline integer object when extended.
fn read_count(cursor: &mut Cursor<'_>, nibble: u8) -> Result<usize> {
	if nibble != EXTENDED_NIBBLE {
		return Ok(usize::from(nibble));
	}

	let at = cursor.pos();
	let bad_length = || PlistError::malformed(at, MalformedReason::BadLength);
	let Some(Marker::Int(width)) = Marker::parse(cursor.read_u8()?) else {
		return Err(bad_length());
	};
	let count = cursor.read_int(width)?;
	usize::try_from(count).map_err(|_| bad_length())
}

fn checked_len(count: usize, unit: usize, at: usize) -> Result<usize> {
	count.checked_mul(unit).ok_or(PlistError::malformed(at, MalformedReason::BadLength))
}

fn read_int128(cursor: &mut Cursor<'_>) -> Result<Value> {
	let raw = cursor.read_exact(16)?;
	let high = be_uint(&raw[..8]);
	let low = be_uint(&raw[8..]) as i64;
	let sign_fill = if low < 0 { u64::MAX } else { 0 };
	if high != sign_fill {
		return Err(PlistError::UnsupportedValue {
			kind: "int",
			reason: "128-bit integer does not fit in 64 bits",
		});
	}
	Ok(Value::Int {
		value: low,
		width: IntWidth::W8,
	})
}

fn read_uid(cursor: &mut Cursor<'_>, width: usize) -> Result<Value> {
	let raw = cursor.read_exact(width)?;
	let (pad, tail) = raw.split_at(width.saturating_sub(8));
	if pad.iter().any(|byte| *byte != 0) {
		return Err(PlistError::UnsupportedValue {
			kind: "uid",
			reason: "uid wider than 64 bits",
		});
	}
	Ok(Value::Uid(be_uint(tail)))
}

#[cfg(test)]
mod tests;
