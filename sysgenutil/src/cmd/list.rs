//! Implements the `list` command for displaying the declared system calls.

use std::fmt::Write as _;

use sysgen::SyscallTable;

use crate::config::{Config, SysgenMetadata};

pub fn run(args: crate::ListArgs) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::resolve(&args.source, None, SysgenMetadata::load()?)?;

	let table = config.generator.table_from_file(&config.input)?;

	print!("{}", listing(&table)?);

	Ok(())
}

/// Formats the table as printed by `list`.
fn listing(table: &SyscallTable) -> Result<String, std::fmt::Error> {
	let abi = table.abi();
	let mut out = String::new();

	writeln!(out, "System Calls ({}):", table.len())?;
	if table.is_empty() {
		writeln!(out, "  (none)")?;
	}

	for sig in table {
		let raw_str = if sig.is_raw(abi) { " [raw]" } else { "" };

		writeln!(
			out,
			"  {:>4}  {}/{}{}",
			sig.number(),
			sig.name(),
			sig.argument_count(),
			raw_str
		)?;

		if sig.argument_count() > 0 && !sig.is_raw(abi) {
			writeln!(out, "          ({})", sig.declaration_string())?;
		}
	}

	if let Err(e) = table.check_contiguous() {
		writeln!(out)?;
		writeln!(
			out,
			"Note: {e}; the dispatch table is not indexable by number."
		)?;
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use sysgen::Scanner;

	use super::*;

	#[test]
	fn lists_in_number_order() {
		let table = Scanner::default()
			.scan("SYSCALL(1, fork)\nSYSCALL(0, exit, int code)\nSYSCALL(2, fault, Registers* regs)\n")
			.unwrap();

		assert_eq!(
			listing(&table).unwrap(),
			"\
System Calls (3):
     0  exit/1
          (int)
     1  fork/0
     2  fault/1 [raw]
"
		);
	}

	#[test]
	fn notes_gaps_and_empty_tables() {
		let empty = Scanner::default().scan("").unwrap();
		assert_eq!(listing(&empty).unwrap(), "System Calls (0):\n  (none)\n");

		let gapped = Scanner::default()
			.scan("SYSCALL(0, a)\nSYSCALL(2, b)\n")
			.unwrap();
		let out = listing(&gapped).unwrap();
		assert!(out.contains("\nNote: "), "{out}");
		assert!(out.ends_with("the dispatch table is not indexable by number.\n"));
	}
}
