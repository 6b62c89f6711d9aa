#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "plistkit", about = "Property list inspection and conversion tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Summarize container layout.
	Info(cmd::info::Args),
	/// Print the decoded value tree.
	Show(cmd::show::Args),
	/// Re-encode between binary and text forms.
	Convert(cmd::convert::Args),
	/// Render one code point as a text token.
	Escape(cmd::escape::Args),
}

fn main() {
	env_logger::init();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> plistkit::plist::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Show(args) => cmd::show::run(args),
		Commands::Convert(args) => cmd::convert::run(args),
		Commands::Escape(args) => cmd::escape::run(args),
	}
}
