use std::path::Path;

use log::info;
use plistkit::plist::{
	DecodeOptions, EscapePreset, Format, PlistError, Quote, Result, TextDecodeOptions, Value, XmlDecodeOptions, decode_binary_with, decode_text,
	decode_xml, detect_format,
};

/// Format names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum FormatArg {
	Binary,
	Xml,
	Openstep,
	Strings,
}

impl From<FormatArg> for Format {
	fn from(value: FormatArg) -> Self {
		match value {
			FormatArg::Binary => Format::Binary,
			FormatArg::Xml => Format::Xml,
			FormatArg::Openstep => Format::OpenStep,
			FormatArg::Strings => Format::Strings,
		}
	}
}

/// Escape presets accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PresetArg {
	Named,
	LowOctal,
	Octal,
}

impl From<PresetArg> for EscapePreset {
	fn from(value: PresetArg) -> Self {
		match value {
			PresetArg::Named => EscapePreset::Named,
			PresetArg::LowOctal => EscapePreset::LowOctal,
			PresetArg::Octal => EscapePreset::Octal,
		}
	}
}

/// Quote characters accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum QuoteArg {
	Double,
	Single,
}

impl From<QuoteArg> for Quote {
	fn from(value: QuoteArg) -> Self {
		match value {
			QuoteArg::Double => Quote::Double,
			QuoteArg::Single => Quote::Single,
		}
	}
}

/// A decoded input together with the bytes it came from.
pub(crate) struct Loaded {
	pub format: Format,
	pub value: Value,
	pub bytes: Vec<u8>,
}

/// Read and decode a file, sniffing the format unless one is forced.
pub(crate) fn load(path: &Path, forced: Option<FormatArg>, allow_lone_surrogates: bool) -> Result<Loaded> {
	let bytes = std::fs::read(path)?;
	let loaded = decode_input(bytes, forced, allow_lone_surrogates)?;
	info!("read {} as {}", path.display(), loaded.format.name());
	Ok(loaded)
}

/// Decode raw input bytes.
///
/// Text inputs come back as a dictionary holding their pairs in file order.
pub(crate) fn decode_input(bytes: Vec<u8>, forced: Option<FormatArg>, allow_lone_surrogates: bool) -> Result<Loaded> {
	let format = forced.map(Format::from).unwrap_or_else(|| detect_format(&bytes));
	let value = match format {
		Format::Binary => decode_binary_with(&bytes, &DecodeOptions::default())?,
		Format::Xml => decode_xml(&bytes, &XmlDecodeOptions::default())?,
		Format::OpenStep | Format::Strings => {
			let mut opt = if format == Format::OpenStep {
				TextDecodeOptions::openstep()
			} else {
				TextDecodeOptions::strings()
			};
			opt.allow_lone_surrogates = allow_lone_surrogates;
			Value::Dictionary(decode_text(&bytes, &opt)?)
		}
	};
	Ok(Loaded { format, value, bytes })
}

/// Pairs of a top-level dictionary, as required by the text encoders.
pub(crate) fn top_pairs(value: &Value) -> Result<&[(Value, Value)]> {
	match value {
		Value::Dictionary(pairs) => Ok(pairs),
		other => Err(PlistError::UnsupportedValue {
			kind: other.kind_name(),
			reason: "text output needs a top-level dictionary",
		}),
	}
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(payload).map_err(std::io::Error::from)?;
	println!("{text}");
	Ok(())
}

/// Lowercase hex rendering of a byte run.
pub(crate) fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
