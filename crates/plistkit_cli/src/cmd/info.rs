use std::path::PathBuf;

use plistkit::plist::{Format, Result, Trailer, Value};

use crate::cmd::util::{FormatArg, Loaded, emit_json, load};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub from: Option<FormatArg>,
	#[arg(long)]
	pub json: bool,
}

/// Print container layout and value statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, from, json } = args;

	let Loaded { format, value, bytes } = load(&path, from, true)?;
	let trailer = if format == Format::Binary { Some(Trailer::parse(&bytes)?) } else { None };
	let stats = ValueStats::collect(&value);

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			format: format.name(),
			top_kind: value.kind_name(),
			node_count: stats.nodes,
			max_depth: stats.max_depth,
			kinds: stats.kinds.iter().map(|(kind, count)| KindCountJson { kind: *kind, count: *count }).collect(),
			trailer: trailer.map(|trailer| TrailerJson {
				offset_int_size: trailer.offset_int_size,
				object_ref_size: trailer.object_ref_size,
				num_objects: trailer.num_objects,
				top_object: trailer.top_object,
				offset_table_offset: trailer.offset_table_offset,
			}),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("format: {}", format.name());
	if let Some(trailer) = trailer {
		println!("offset_int_size: {}", trailer.offset_int_size);
		println!("object_ref_size: {}", trailer.object_ref_size);
		println!("num_objects: {}", trailer.num_objects);
		println!("top_object: {}", trailer.top_object);
		println!("offset_table_offset: {}", trailer.offset_table_offset);
	}
	println!("top_kind: {}", value.kind_name());
	println!("node_count: {}", stats.nodes);
	println!("max_depth: {}", stats.max_depth);
	println!("kinds:");
	for (kind, count) in &stats.kinds {
		println!("  {kind}: {count}");
	}

	Ok(())
}

struct ValueStats {
	nodes: usize,
	max_depth: usize,
	kinds: Vec<(&'static str, usize)>,
}

impl ValueStats {
	fn collect(value: &Value) -> Self {
		let mut stats = Self {
			nodes: 0,
			max_depth: 0,
			kinds: Vec::new(),
		};
		value.walk(&mut |item, depth| {
			stats.nodes += 1;
			stats.max_depth = stats.max_depth.max(depth);
			let kind = item.kind_name();
			match stats.kinds.iter_mut().find(|(name, _)| *name == kind) {
				Some((_, count)) => *count += 1,
				None => stats.kinds.push((kind, 1)),
			}
		});
		stats.kinds.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
		stats
	}
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	format: &'static str,
	top_kind: &'static str,
	node_count: usize,
	max_depth: usize,
	kinds: Vec<KindCountJson>,
	trailer: Option<TrailerJson>,
}

#[derive(serde::Serialize)]
struct KindCountJson {
	kind: &'static str,
	count: usize,
}

#[derive(serde::Serialize)]
struct TrailerJson {
	offset_int_size: u8,
	object_ref_size: u8,
	num_objects: u64,
	top_object: u64,
	offset_table_offset: u64,
}

#[cfg(test)]
mod tests {
	use plistkit::plist::Value;

	use super::ValueStats;

	#[test]
	fn stats_count_every_node() {
		let value = Value::Array(vec![Value::int(1), Value::Array(vec![Value::int(2), Value::Null])]);
		let stats = ValueStats::collect(&value);
		assert_eq!(stats.nodes, 5);
		assert_eq!(stats.max_depth, 2);
		assert_eq!(stats.kinds, vec![("array", 2), ("int", 2), ("null", 1)]);
	}
}
