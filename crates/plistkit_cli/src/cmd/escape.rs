use plistkit::plist::{EscapeConfig, Result};

use crate::cmd::util::{PresetArg, QuoteArg, emit_json};

/// Unescaped-character sets accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SetArg {
	Plain,
	Strings,
}

#[derive(clap::Args)]
pub struct Args {
	/// Code point as decimal, `0x263a` or `U+263A`.
	#[arg(value_parser = parse_code_point)]
	pub code_point: u32,
	#[arg(long, default_value = "plain")]
	pub set: SetArg,
	#[arg(long)]
	pub preset: Option<PresetArg>,
	#[arg(long)]
	pub quote: Option<QuoteArg>,
	#[arg(long)]
	pub json: bool,
}

/// Print the token a single code point renders to.
pub fn run(args: Args) -> Result<()> {
	let Args {
		code_point,
		set,
		preset,
		quote,
		json,
	} = args;

	let mut config = match set {
		SetArg::Plain => EscapeConfig::plain_identifier(),
		SetArg::Strings => EscapeConfig::strings_file(),
	};
	if let Some(preset) = preset {
		config.preset = preset.into();
	}
	if let Some(quote) = quote {
		config.quote = quote.into();
	}

	let units = utf16_units(code_point);
	let token = config.render_token(&units);
	let escapes: Vec<String> = units
		.iter()
		.map(|unit| {
			let mut out = String::new();
			config.escape_unit(*unit).write_to(&mut out, false);
			out
		})
		.collect();

	if json {
		emit_json(&EscapeJson {
			code_point,
			units,
			quoted: token.starts_with(char::from(config.quote.byte())),
			token,
			escapes,
		})?;
	} else {
		println!("{token}");
	}
	Ok(())
}

/// UTF-16 units for a code point; surrogate values pass through as single units.
fn utf16_units(code_point: u32) -> Vec<u16> {
	match char::from_u32(code_point) {
		Some(ch) => {
			let mut buf = [0_u16; 2];
			ch.encode_utf16(&mut buf).to_vec()
		}
		None => vec![code_point as u16],
	}
}

fn parse_code_point(input: &str) -> std::result::Result<u32, String> {
	let trimmed = input.trim();
	let hex = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.or_else(|| trimmed.strip_prefix("U+"))
		.or_else(|| trimmed.strip_prefix("u+"));
	let value = match hex {
		Some(digits) => u32::from_str_radix(digits, 16),
		None => trimmed.parse::<u32>(),
	}
	.map_err(|err| format!("invalid code point {input:?}: {err}"))?;
	if value > 0x10_ffff {
		return Err(format!("code point {input:?} is above U+10FFFF"));
	}
	Ok(value)
}

#[derive(serde::Serialize)]
struct EscapeJson {
	code_point: u32,
	units: Vec<u16>,
	token: String,
	quoted: bool,
	escapes: Vec<String>,
}
