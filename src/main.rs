#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "nrbfdoc", about = "MS-NRBF stream inspection tools")]
struct Cli {
	/// Log to stderr: -v info, -vv debug, -vvv trace.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Header fields and record counts.
	Info(cmd::info::Args),
	/// Flat record listing.
	Records(cmd::records::Args),
	/// Distilled object graph.
	Show(cmd::show::Args),
	/// 2D cine slice summary.
	Cine(cmd::cine::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> nrbfdoc::nrbf::Result<()> {
	let cli = Cli::parse();
	cmd::logging::init(cli.verbose);

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Records(args) => cmd::records::run(args),
		Commands::Show(args) => cmd::show::run(args),
		Commands::Cine(args) => cmd::cine::run(args),
	}
}
