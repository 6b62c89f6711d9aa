//! Shared test helpers for workspace crates.
//!
//! The byte builders here assemble binary plists by hand, the same way the
//! fixture generators do, so codec tests never validate the encoder with itself.

use std::path::{Path, PathBuf};
use std::process::Output;

/// Names of the single-entry dictionary fixtures, one per key marker type.
pub const KEY_TYPES: [&str; 14] = [
	"null",
	"false",
	"true",
	"int",
	"float",
	"double",
	"date",
	"data",
	"string-ascii",
	"string-unicode",
	"uid",
	"array",
	"set",
	"dict",
];

/// Raw key object bytes for a [`KEY_TYPES`] entry.
pub fn key_object(name: &str) -> Option<Vec<u8>> {
	let mut out = Vec::new();
	match name {
		"null" => out.push(0x00),
		"false" => out.push(0x08),
		"true" => out.push(0x09),
		"int" => out.extend_from_slice(&[0x10, 123]),
		"float" => {
			out.push(0x22);
			out.extend_from_slice(&3.5_f32.to_be_bytes());
		}
		"double" => {
			out.push(0x23);
			out.extend_from_slice(&3.5_f64.to_be_bytes());
		}
		"date" => {
			out.push(0x33);
			out.extend_from_slice(&3.5_f64.to_be_bytes());
		}
		"data" => out.extend_from_slice(&[0x41, 0x4b]),
		"string-ascii" => out.extend_from_slice(&[0x53, b'K', b'E', b'Y']),
		"string-unicode" => out.extend_from_slice(&[0x61, 0x26, 0x3a]),
		"uid" => out.extend_from_slice(&[0x80, 42]),
		"array" => out.push(0xa0),
		"set" => out.push(0xc0),
		"dict" => out.push(0xd0),
		_ => return None,
	}
	Some(out)
}

/// Assemble `{key: "value"}` with the dictionary at index 0, key at 1, value at 2.
pub fn key_type_plist(name: &str) -> Option<Vec<u8>> {
	let key = key_object(name)?;
	let mut out = b"bplist00".to_vec();
	let mut offsets = vec![out.len()];
	out.extend_from_slice(&[0xd1, 1, 2]);
	offsets.push(out.len());
	out.extend_from_slice(&key);
	offsets.push(out.len());
	out.extend_from_slice(&[0x55, b'v', b'a', b'l', b'u', b'e']);
	let table = out.len();
	for offset in &offsets {
		out.push(*offset as u8);
	}
	out.extend_from_slice(&trailer(1, 1, offsets.len() as u64, 0, table as u64));
	Some(out)
}

/// Assemble the smallest valid file: a lone null object.
pub fn null_plist() -> Vec<u8> {
	let mut out = b"bplist00".to_vec();
	out.push(0x00);
	out.push(8);
	out.extend_from_slice(&trailer(1, 1, 1, 0, 9));
	out
}

/// Build a 32-byte trailer.
pub fn trailer(offset_int_size: u8, object_ref_size: u8, num_objects: u64, top_object: u64, offset_table_offset: u64) -> [u8; 32] {
	let mut out = [0_u8; 32];
	out[6] = offset_int_size;
	out[7] = object_ref_size;
	out[8..16].copy_from_slice(&num_objects.to_be_bytes());
	out[16..24].copy_from_slice(&top_object.to_be_bytes());
	out[24..32].copy_from_slice(&offset_table_offset.to_be_bytes());
	out
}

/// Assemble a file from raw object encodings with one-byte offsets and refs.
pub fn assemble(objects: &[&[u8]], top_object: u64) -> Vec<u8> {
	let mut out = b"bplist00".to_vec();
	let mut offsets = Vec::with_capacity(objects.len());
	for object in objects {
		offsets.push(out.len() as u8);
		out.extend_from_slice(object);
	}
	let table = out.len() as u64;
	out.extend_from_slice(&offsets);
	out.extend_from_slice(&trailer(1, 1, objects.len() as u64, top_object, table));
	out
}

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Create and return a per-test scratch directory under the target directory.
pub fn scratch_dir(name: &str) -> PathBuf {
	let dir = target_dir().join("plistkit-scratch").join(name);
	std::fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir
}

/// Assert a command succeeded and parse its stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
	assert!(
		output.status.success(),
		"command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
