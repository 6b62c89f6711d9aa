use std::path::PathBuf;

use plistkit::plist::{Result, Value};

use crate::cmd::util::{FormatArg, Loaded, emit_json, hex, load};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub from: Option<FormatArg>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<usize>,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
	#[arg(long = "allow-lone-surrogates")]
	pub allow_lone_surrogates: bool,
}

/// Output truncation limits for printed values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of characters printed for strings.
	pub max_string_len: usize,
	/// Maximum number of children printed for arrays, sets and dictionaries.
	pub max_items: usize,
	/// Maximum recursive print depth.
	pub max_depth: usize,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_string_len: 200,
			max_items: 64,
			max_depth: 16,
		}
	}
}

/// Decode a file and print its value tree.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		from,
		json,
		max_depth,
		max_items,
		allow_lone_surrogates,
	} = args;

	let Loaded { format, value, .. } = load(&path, from, allow_lone_surrogates)?;

	if json {
		return emit_json(&ShowJson {
			path: path.display().to_string(),
			format: format.name(),
			value: value_to_json(&value),
		});
	}

	let mut options = PrintOptions::default();
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}
	if let Some(max_items) = max_items {
		options.max_items = max_items;
	}

	let mut out = String::new();
	render_value(&mut out, &value, 0, options);
	print!("{out}");
	Ok(())
}

/// Render one value and its children, one node per line.
pub fn render_value(out: &mut String, value: &Value, indent: usize, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Array(items) | Value::Set(items) => {
			let (open, close) = if matches!(value, Value::Set(_)) { ("set {", "}") } else { ("[", "]") };
			if indent / 2 >= options.max_depth {
				out.push_str(&format!("{pad}{open}... {} items{close}\n", items.len()));
				return;
			}
			out.push_str(&format!("{pad}{open}\n"));
			for item in items.iter().take(options.max_items) {
				render_value(out, item, indent + 2, options);
			}
			if items.len() > options.max_items {
				out.push_str(&format!("{pad}  ... {} more\n", items.len() - options.max_items));
			}
			out.push_str(&format!("{pad}{close}\n"));
		}
		Value::Dictionary(pairs) => {
			if indent / 2 >= options.max_depth {
				out.push_str(&format!("{pad}{{... {} entries}}\n", pairs.len()));
				return;
			}
			out.push_str(&format!("{pad}{{\n"));
			for (key, item) in pairs.iter().take(options.max_items) {
				out.push_str(&format!("{pad}  {} =>\n", scalar_label(key, options)));
				render_value(out, item, indent + 4, options);
			}
			if pairs.len() > options.max_items {
				out.push_str(&format!("{pad}  ... {} more\n", pairs.len() - options.max_items));
			}
			out.push_str(&format!("{pad}}}\n"));
		}
		scalar => out.push_str(&format!("{pad}{}\n", scalar_label(scalar, options))),
	}
}

fn scalar_label(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Bool(v) => v.to_string(),
		Value::Int { value: int, width } => format!("{int} (int{})", width.bytes() * 8),
		Value::Real32(v) => format!("{v} (real32)"),
		Value::Real64(v) => format!("{v} (real64)"),
		Value::Date(v) => format!("date({v})"),
		Value::Data(v) => format!("data[{}] <{}>", v.len(), truncate(&hex(v), options.max_string_len)),
		Value::AsciiString(_) | Value::UnicodeString(_) => {
			let text = value.to_string_lossy().unwrap_or_default();
			format!("{:?}", truncate(&text, options.max_string_len))
		}
		Value::Uid(v) => format!("uid({v})"),
		Value::Array(items) => format!("[{} items]", items.len()),
		Value::Set(items) => format!("set {{{} items}}", items.len()),
		Value::Dictionary(pairs) => format!("{{{} entries}}", pairs.len()),
	}
}

fn truncate(text: &str, max: usize) -> String {
	match text.char_indices().nth(max) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.to_owned(),
	}
}

/// JSON rendering; dictionaries become `[{"key", "value"}]` lists so non-string
/// and repeated keys survive.
pub fn value_to_json(value: &Value) -> serde_json::Value {
	use serde_json::{Value as JsonValue, json};

	match value {
		Value::Null => JsonValue::Null,
		Value::Bool(v) => json!(v),
		Value::Int { value: int, .. } => json!(int),
		Value::Real32(v) => json!(v),
		Value::Real64(v) => json!(v),
		Value::Date(v) => json!({ "date": v }),
		Value::Data(v) => json!({ "data": hex(v) }),
		Value::AsciiString(_) | Value::UnicodeString(_) => json!(value.to_string_lossy()),
		Value::Uid(v) => json!({ "uid": v }),
		Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		Value::Set(items) => json!({ "set": items.iter().map(value_to_json).collect::<Vec<_>>() }),
		Value::Dictionary(pairs) => JsonValue::Array(
			pairs
				.iter()
				.map(|(key, item)| json!({ "key": value_to_json(key), "value": value_to_json(item) }))
				.collect(),
		),
	}
}

#[derive(serde::Serialize)]
struct ShowJson {
	path: String,
	format: &'static str,
	value: serde_json::Value,
}
