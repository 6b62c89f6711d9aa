use std::collections::HashMap;

use log::{debug, trace};

use crate::plist::bytes::put_uint;
use crate::plist::marker::{MAX_INLINE_COUNT, Marker};
use crate::plist::trailer::MAGIC;
use crate::plist::{IntWidth, PlistError, Result, Trailer, Value};

/// Target format profile for binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
	/// Allow the `0xC0` set extension.
	#[default]
	Extended,
	/// Refuse values outside the original format (sets).
	Strict,
}

/// Object-table sharing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dedup {
	/// One object-table entry per tree node, repeats included.
	#[default]
	None,
	/// Byte-identical scalar objects share one entry; containers are never merged.
	Scalars,
}

/// Binary encoder configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
	/// Format profile controlling which variants are accepted.
	pub profile: Profile,
	/// Object sharing policy.
	pub dedup: Dedup,
}

impl EncodeOptions {
	/// Preset refusing format extensions.
	pub fn strict() -> Self {
		Self {
			profile: Profile::Strict,
			dedup: Dedup::None,
		}
	}
}

/// Encode a value tree as a `bplist00` file with default options.
pub fn encode_binary(value: &Value) -> Result<Vec<u8>> {
	encode_binary_with(value, &EncodeOptions::default())
}

/// Encode a value tree as a `bplist00` file.
pub fn encode_binary_with(value: &Value, opt: &EncodeOptions) -> Result<Vec<u8>> {
	let mut table = ObjectTable::new(*opt);
	let top = table.add(value)?;
	let bytes = table.finish(top);
	debug!("encoded bplist: {} objects, {} bytes", table.entries.len(), bytes.len());
	Ok(bytes)
}

enum Entry {
	Scalar(Vec<u8>),
	Container { kind: ContainerKind, count: usize, refs: Vec<usize> },
}

#[derive(Clone, Copy)]
enum ContainerKind {
	Array,
	Set,
	Dictionary,
}

impl ContainerKind {
	fn marker(self, nibble: u8) -> Marker {
		match self {
			Self::Array => Marker::Array(nibble),
			Self::Set => Marker::Set(nibble),
			Self::Dictionary => Marker::Dictionary(nibble),
		}
	}
}

struct ObjectTable {
	opt: EncodeOptions,
	entries: Vec<Entry>,
	shared: HashMap<Vec<u8>, usize>,
}

impl ObjectTable {
	fn new(opt: EncodeOptions) -> Self {
		Self {
			opt,
			entries: Vec::new(),
			shared: HashMap::new(),
		}
	}

	/// Append `value` and its subtree in depth-first order, returning its index.
	fn add(&mut self, value: &Value) -> Result<usize> {
		let (kind, count) = match value {
			Value::Array(items) => (ContainerKind::Array, items.len()),
			Value::Set(items) => {
				if self.opt.profile == Profile::Strict {
					return Err(PlistError::UnsupportedValue {
						kind: "set",
						reason: "sets are not allowed by the strict profile",
					});
				}
				(ContainerKind::Set, items.len())
			}
			Value::Dictionary(pairs) => (ContainerKind::Dictionary, pairs.len()),
			scalar => return self.add_scalar(scalar),
		};

		let index = self.entries.len();
		self.entries.push(Entry::Container {
			kind,
			count,
			refs: Vec::new(),
		});
		let children = value.children();
		let mut child_refs = Vec::with_capacity(children.len());
		for child in children {
			child_refs.push(self.add(child)?);
		}
		if let Some(Entry::Container { refs, .. }) = self.entries.get_mut(index) {
			*refs = child_refs;
		}
		Ok(index)
	}

	fn add_scalar(&mut self, value: &Value) -> Result<usize> {
		let bytes = encode_scalar(value)?;
		if self.opt.dedup == Dedup::Scalars
			&& let Some(index) = self.shared.get(&bytes)
		{
			return Ok(*index);
		}

		let index = self.entries.len();
		if self.opt.dedup == Dedup::Scalars {
			self.shared.insert(bytes.clone(), index);
		}
		self.entries.push(Entry::Scalar(bytes));
		Ok(index)
	}

	fn finish(&self, top: usize) -> Vec<u8> {
		let num_objects = self.entries.len();
		let ref_size = IntWidth::for_unsigned(num_objects.saturating_sub(1) as u64).bytes();

		let mut out = MAGIC.to_vec();
		let mut offsets = Vec::with_capacity(num_objects);
		for (index, entry) in self.entries.iter().enumerate() {
			offsets.push(out.len() as u64);
			match entry {
				Entry::Scalar(bytes) => out.extend_from_slice(bytes),
				Entry::Container { kind, count, refs } => {
					write_sized_marker(&mut out, |nibble| kind.marker(nibble), *count);
					for child in refs {
						put_uint(&mut out, *child as u64, ref_size);
					}
				}
			}
			trace!("object {index} at offset {}", offsets[index]);
		}

		// Sized for the table position too, which bounds every object offset.
		let offset_table_offset = out.len() as u64;
		let offset_size = IntWidth::for_unsigned(offset_table_offset).bytes();
		for offset in &offsets {
			put_uint(&mut out, *offset, offset_size);
		}

		Trailer {
			offset_int_size: offset_size as u8,
			object_ref_size: ref_size as u8,
			num_objects: num_objects as u64,
			top_object: top as u64,
			offset_table_offset,
		}
		.write(&mut out);
		out
	}
}

fn encode_scalar(value: &Value) -> Result<Vec<u8>> {
	let mut out = Vec::new();
	match value {
		Value::Null => out.push(Marker::Null.to_byte()),
		Value::Bool(false) => out.push(Marker::False.to_byte()),
		Value::Bool(true) => out.push(Marker::True.to_byte()),
		Value::Int { value, width } => {
			if !width.fits_signed(*value) {
				return Err(PlistError::UnsupportedValue {
					kind: "int",
					reason: "declared width is narrower than the value",
				});
			}
			write_int(&mut out, *value, *width);
		}
		Value::Real32(value) => {
			out.push(Marker::Real32.to_byte());
			out.extend_from_slice(&value.to_be_bytes());
		}
		Value::Real64(value) => {
			out.push(Marker::Real64.to_byte());
			out.extend_from_slice(&value.to_be_bytes());
		}
		Value::Date(seconds) => {
			out.push(Marker::Date.to_byte());
			out.extend_from_slice(&seconds.to_be_bytes());
		}
		Value::Data(bytes) => {
			write_sized_marker(&mut out, Marker::Data, bytes.len());
			out.extend_from_slice(bytes);
		}
		Value::AsciiString(bytes) => {
			if !bytes.is_ascii() {
				return Err(PlistError::UnsupportedValue {
					kind: "ascii-string",
					reason: "byte at or above 0x80",
				});
			}
			write_sized_marker(&mut out, Marker::AsciiString, bytes.len());
			out.extend_from_slice(bytes);
		}
		Value::UnicodeString(units) => {
			write_sized_marker(&mut out, Marker::UnicodeString, units.len());
			for unit in units {
				out.extend_from_slice(&unit.to_be_bytes());
			}
		}
		Value::Uid(value) => {
			let width = IntWidth::for_unsigned(*value).bytes();
			out.push(Marker::Uid(width as u8 - 1).to_byte());
			put_uint(&mut out, *value, width);
		}
		Value::Array(_) | Value::Set(_) | Value::Dictionary(_) => {
			return Err(PlistError::UnsupportedValue {
				kind: value.kind_name(),
				reason: "containers have no standalone scalar encoding",
			});
		}
	}
	Ok(out)
}

fn write_int(out: &mut Vec<u8>, value: i64, width: IntWidth) {
	out.push(Marker::Int(width).to_byte());
	put_uint(out, value as u64, width.bytes());
}

/// Write a marker carrying `count`, spilling into an inline integer object past 14.
fn write_sized_marker(out: &mut Vec<u8>, marker: impl Fn(u8) -> Marker, count: usize) {
	out.push(marker(Marker::count_nibble(count)).to_byte());
	if count > MAX_INLINE_COUNT {
		let count = count as i64;
		write_int(out, count, IntWidth::for_signed(count));
	}
}

#[cfg(test)]
mod tests;
