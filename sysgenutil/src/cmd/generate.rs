//! Implements the `generate` command.

use sysgen::WriteStatus;

use crate::config::{Config, SysgenMetadata};

pub fn run(args: crate::GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::resolve(&args.source, Some(&args.output), SysgenMetadata::load()?)?;

	let statuses = config
		.generator
		.run(&config.input, &config.output_list())?;

	let written = statuses
		.iter()
		.filter(|(_, status)| *status == WriteStatus::Written)
		.count();

	log::info!(
		"generated {} artifact(s) from {} ({} unchanged)",
		written,
		config.input.display(),
		statuses.len() - written
	);

	Ok(())
}
