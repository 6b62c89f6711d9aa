use std::io::Write;
use std::path::PathBuf;

use log::info;
use plistkit::plist::{Dedup, EncodeOptions, Format, Profile, Result, TextEncodeOptions, XmlEncodeOptions, encode_binary_with, encode_text, encode_xml};

use crate::cmd::util::{FormatArg, Loaded, PresetArg, QuoteArg, load, top_pairs};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub to: FormatArg,
	#[arg(long)]
	pub from: Option<FormatArg>,
	#[arg(short, long)]
	pub output: Option<PathBuf>,
	#[arg(long)]
	pub strict: bool,
	#[arg(long)]
	pub dedup: bool,
	#[arg(long)]
	pub preset: Option<PresetArg>,
	#[arg(long)]
	pub quote: Option<QuoteArg>,
	#[arg(long)]
	pub shortcut: bool,
	#[arg(long, default_value = "\t")]
	pub indent: String,
	#[arg(long = "allow-lone-surrogates")]
	pub allow_lone_surrogates: bool,
}

/// Decode a file and re-encode it in the requested format.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		to,
		from,
		output,
		strict,
		dedup,
		preset,
		quote,
		shortcut,
		indent,
		allow_lone_surrogates,
	} = args;

	let Loaded { format: source, value, .. } = load(&path, from, allow_lone_surrogates)?;
	let target = Format::from(to);

	let bytes = match target {
		Format::Binary => {
			let opt = EncodeOptions {
				profile: if strict { Profile::Strict } else { Profile::Extended },
				dedup: if dedup { Dedup::Scalars } else { Dedup::None },
			};
			encode_binary_with(&value, &opt)?
		}
		Format::Xml => {
			let opt = XmlEncodeOptions {
				indent,
				..XmlEncodeOptions::default()
			};
			encode_xml(&value, &opt)?
		}
		Format::OpenStep | Format::Strings => {
			let mut opt = if target == Format::OpenStep {
				TextEncodeOptions::openstep()
			} else {
				TextEncodeOptions::strings()
			};
			if let Some(preset) = preset {
				opt.escape.preset = preset.into();
			}
			if let Some(quote) = quote {
				opt.escape.quote = quote.into();
			}
			opt.shortcut = shortcut;
			opt.indent = indent;
			encode_text(top_pairs(&value)?, &opt)?
		}
	};
	info!("converted {} -> {} ({} bytes)", source.name(), target.name(), bytes.len());

	match output {
		Some(output) => std::fs::write(output, &bytes)?,
		None => std::io::stdout().lock().write_all(&bytes)?,
	}
	Ok(())
}
