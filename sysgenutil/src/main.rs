//! CLI for generating kernel system call glue.

pub(crate) mod cmd;
pub(crate) mod config;
pub(crate) mod util;

use std::path::PathBuf;

use clap::Parser;
use sysgen::Artifact;

/// sysgenutil: system call glue generator
///
/// Scans a table of `SYSCALL(<number>, <name>, <args>...)` declarations
/// and generates the declaration, definition and trampoline include
/// files the kernel is built with.
///
/// Defaults are read from `[workspace.metadata.sysgen]` in the
/// enclosing cargo workspace, if any; flags override them.
#[derive(Parser, Debug)]
struct Args {
	/// Log verbosely. Specify multiple times for more verbosity.
	#[clap(long, short = 'v', action = clap::ArgAction::Count)]
	pub verbose: u8,
	/// The command to execute
	#[clap(subcommand)]
	command:     Command,
}

/// Subcommands for the generator
#[derive(Parser, Debug)]
enum Command {
	/// Generates the include files
	Generate(GenerateArgs),
	/// Checks that the include files on disk are up to date
	Check(CheckArgs),
	/// Lists the declared system calls
	List(ListArgs),
}

/// Arguments selecting and interpreting the declaration source.
#[derive(Parser, Debug)]
pub(crate) struct SourceArgs {
	/// The declaration source to scan.
	#[clap(long, short = 'i')]
	pub input: Option<PathBuf>,

	/// Fail on any line that is not a declaration, blank or a comment.
	#[clap(long)]
	pub strict: bool,

	/// Fail unless system call numbers run from 0 without gaps.
	#[clap(long)]
	pub require_contiguous: bool,
}

/// Arguments selecting the generated artifacts.
#[derive(Parser, Debug)]
pub(crate) struct OutputArgs {
	/// Directory to write the include files to. Defaults to the
	/// directory containing the declaration source.
	#[clap(long, short = 'o')]
	pub out_dir: Option<PathBuf>,

	/// Only produce the given artifacts (`decl`, `impl`, `tramp`).
	#[clap(long, value_delimiter = ',')]
	pub only: Vec<Artifact>,
}

/// Arguments for the `generate` command
#[derive(Parser, Debug)]
pub(crate) struct GenerateArgs {
	/// Source arguments.
	#[clap(flatten)]
	pub source: SourceArgs,
	/// Output arguments.
	#[clap(flatten)]
	pub output: OutputArgs,
}

/// Arguments for the `check` command
#[derive(Parser, Debug)]
pub(crate) struct CheckArgs {
	/// Source arguments.
	#[clap(flatten)]
	pub source: SourceArgs,
	/// Output arguments.
	#[clap(flatten)]
	pub output: OutputArgs,
}

/// Arguments for the `list` command
#[derive(Parser, Debug)]
pub(crate) struct ListArgs {
	/// Source arguments.
	#[clap(flatten)]
	pub source: SourceArgs,
}

fn pmain() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let verbosity = match args.verbose {
		0 => log::LevelFilter::Info,
		1 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};

	log::set_max_level(verbosity);
	colog::default_builder().filter_level(verbosity).init();

	match args.command {
		Command::Generate(args) => {
			cmd::generate::run(args)?;
		}
		Command::Check(args) => {
			cmd::check::run(args)?;
		}
		Command::List(args) => {
			cmd::list::run(args)?;
		}
	}

	Ok(())
}

fn main() {
	if let Err(e) = pmain() {
		log::error!("fatal: {}", e);
		std::process::exit(1);
	}
}
