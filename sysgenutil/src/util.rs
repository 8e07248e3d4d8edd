//! Utilities used throughout the `sysgenutil` CLI.

use std::sync::atomic::{AtomicBool, Ordering::Relaxed};

/// Returns a [`std::process::Command`] for running `cargo`.
///
/// Automatically resolves the `cargo` binary from the current environment.
pub fn cargo_command() -> std::process::Command {
	let cargo_program = std::env::var("CARGO").unwrap_or_else(|_| {
		static HAS_WARNED: AtomicBool = AtomicBool::new(false);
		if !HAS_WARNED.swap(true, Relaxed) {
			log::debug!("`CARGO` environment variable not set; using 'cargo' as default");
		}
		"cargo".to_string()
	});

	std::process::Command::new(cargo_program)
}

/// Returns metadata from `cargo metadata` for the current workspace.
///
/// Dependencies are not resolved; only workspace-level information is
/// needed.
pub fn cargo_metadata<T>() -> Result<T, Box<dyn std::error::Error>>
where
	T: serde::de::DeserializeOwned,
{
	let mut cmd = cargo_command();
	cmd.arg("metadata")
		.arg("--format-version=1")
		.arg("--no-deps");

	log::trace!("{cmd:?}");

	let output = cmd.output()?;

	if !output.status.success() {
		return Err(format!("`cargo metadata` failed with status: {}", output.status).into());
	}

	let metadata: T = serde_json::from_slice(&output.stdout)?;
	Ok(metadata)
}

/// Prints a line diff between the on-disk and expected contents of a file.
///
/// Returns `true` if any line differs.
pub fn print_diff(current: &str, expected: &str) -> bool {
	let mut differs = false;

	for (change, line) in
		similar::utils::diff_lines(similar::Algorithm::Patience, current, expected)
	{
		let line = line.trim_end_matches('\n');
		match change {
			similar::ChangeTag::Insert => {
				differs = true;
				println!("\x1b[32m+{line}\x1b[m");
			}
			similar::ChangeTag::Delete => {
				differs = true;
				println!("\x1b[31m-{line}\x1b[m");
			}
			similar::ChangeTag::Equal => {}
		}
	}

	differs
}
