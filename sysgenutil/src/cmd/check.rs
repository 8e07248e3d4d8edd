//! Implements the `check` command, verifying that the generated files on
//! disk match what the current declarations would produce.

use crate::config::{Config, SysgenMetadata};

pub fn run(args: crate::CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::resolve(&args.source, Some(&args.output), SysgenMetadata::load()?)?;

	let stale = stale_files(&config)?;

	if stale > 0 {
		return Err(format!(
			"{stale} generated file(s) are stale, run `sysgenutil generate` to update them"
		)
		.into());
	}

	log::info!("all generated files are up to date");

	Ok(())
}

/// Compares every selected artifact against the file on disk, printing a
/// diff for each mismatch. Returns the number of missing or stale files.
fn stale_files(config: &Config) -> Result<usize, Box<dyn std::error::Error>> {
	let table = config.generator.table_from_file(&config.input)?;

	let mut stale = 0_usize;

	for (path, expected) in sysgen::generate::render(&table, &config.output_list()) {
		let current = match std::fs::read_to_string(&path) {
			Ok(current) => current,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				log::error!("generated file is missing: {}", path.display());
				stale += 1;
				continue;
			}
			Err(e) => return Err(format!("failed to read {}: {e}", path.display()).into()),
		};

		if current == expected {
			log::debug!("{} is up to date", path.display());
			continue;
		}

		log::error!("generated file is out of date: {}", path.display());
		if !crate::util::print_diff(&current, &expected) {
			// `diff_lines` doesn't show trailing newline differences.
			println!("\x1b[33m(whitespace-only difference)\x1b[m");
		}
		stale += 1;
	}

	Ok(stale)
}
