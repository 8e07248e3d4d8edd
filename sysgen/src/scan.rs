//! Extracts `SYSCALL(...)` declarations from a source file.
//!
//! A declaration line has the form
//!
//! ```text
//! SYSCALL(<number>, <name>[, <arg-spec>[, <arg-spec>...]])
//! ```
//!
//! with optional leading whitespace. Anything after the closing
//! parenthesis (typically a `;`) is ignored. The argument list is split
//! on every comma; types containing commas are not supported.

use core::fmt;

use crate::{
	abi::Abi,
	signature::{Argument, Signature},
	table::{SyscallTable, TableError},
};

/// The macro name that introduces a declaration.
const MACRO_OPEN: &str = "SYSCALL(";

/// How the scanner treats lines that aren't declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
	/// Non-matching lines are skipped silently.
	#[default]
	BestEffort,
	/// Non-matching lines that are neither blank nor comments are
	/// collected and reported as a [`ScanError::Unmatched`].
	Strict,
}

/// A line that didn't match the declaration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedLine {
	/// 1-based line number.
	pub line: usize,
	/// The offending line, verbatim.
	pub text: String,
}

impl fmt::Display for UnmatchedLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.line, self.text)
	}
}

/// Errors raised while scanning a declaration source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
	/// A declaration was well-formed but could not be added to the table.
	#[error("line {line}: {source}")]
	Table {
		/// 1-based line number of the declaration.
		line:   usize,
		/// The underlying table error.
		#[source]
		source: TableError,
	},
	/// Strict mode only: lines that did not match the declaration pattern.
	#[error("{} line(s) are not system call declarations", .0.len())]
	Unmatched(Vec<UnmatchedLine>),
}

/// Scans declaration sources into a [`SyscallTable`].
#[derive(Debug, Clone, Default)]
pub struct Scanner {
	/// The convention declarations are checked against.
	abi:  Abi,
	/// Handling of non-declaration lines.
	mode: ScanMode,
}

impl Scanner {
	/// Creates a best-effort scanner for the given ABI.
	#[must_use]
	pub fn new(abi: Abi) -> Self {
		Self {
			abi,
			mode: ScanMode::BestEffort,
		}
	}

	/// Sets the scan mode.
	#[must_use]
	pub fn with_mode(mut self, mode: ScanMode) -> Self {
		self.mode = mode;
		self
	}

	/// Scans the given source text.
	///
	/// Later declarations of an already-declared number replace the
	/// earlier ones.
	pub fn scan(&self, source: &str) -> Result<SyscallTable, ScanError> {
		let mut table = SyscallTable::new(self.abi.clone());
		let mut unmatched = Vec::new();

		for (line, text) in (1_usize..).zip(source.lines()) {
			let Some(signature) = parse_declaration(text) else {
				log::trace!("line {line}: not a declaration");
				if self.mode == ScanMode::Strict && !is_blank_or_comment(text) {
					unmatched.push(UnmatchedLine {
						line,
						text: text.to_string(),
					});
				}
				continue;
			};

			let replaced = table
				.insert(signature)
				.map_err(|source| ScanError::Table { line, source })?;

			if let Some(old) = replaced {
				log::debug!(
					"line {line}: system call {} redeclared; `{}` replaces `{}`",
					old.number(),
					table.get(old.number()).map_or("?", Signature::name),
					old.name()
				);
			}
		}

		if !unmatched.is_empty() {
			return Err(ScanError::Unmatched(unmatched));
		}

		log::debug!("scanned {} system call(s)", table.len());

		Ok(table)
	}
}

/// Parses a single line as a declaration.
///
/// Returns `None` if the line is not a well-formed declaration,
/// including when one of its argument specs has no parameter name.
#[must_use]
pub fn parse_declaration(line: &str) -> Option<Signature> {
	let rest = line.trim_start().strip_prefix(MACRO_OPEN)?;

	let (number, rest) = split_while(rest, |c| c.is_ascii_digit());
	if number.is_empty() {
		return None;
	}
	let number = number.parse::<u32>().ok()?;

	let rest = rest.strip_prefix(',')?.trim_start();

	let (name, rest) = split_while(rest, |c| c.is_ascii_alphanumeric() || c == '_');
	if name.is_empty() {
		return None;
	}

	let arguments = if rest.starts_with(')') {
		Vec::new()
	} else {
		let rest = rest.strip_prefix(',')?;
		let (list, _) = rest.split_once(')')?;
		parse_arguments(list)?
	};

	Some(Signature::new(number, name, arguments))
}

/// Splits a raw argument list on commas.
///
/// Trailing empty elements are dropped, so `int code, ` is a single
/// argument; an empty element anywhere else rejects the list.
fn parse_arguments(list: &str) -> Option<Vec<Argument>> {
	let mut specs = list.split(',').collect::<Vec<_>>();
	while specs.last().is_some_and(|spec| spec.trim().is_empty()) {
		specs.pop();
	}

	specs.into_iter().map(Argument::parse).collect()
}

/// Splits `s` after the longest prefix whose characters satisfy `pred`.
fn split_while(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
	let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
	s.split_at(end)
}

/// Whether the line is empty or (the start of / inside) a comment.
///
/// Continuation lines of a block comment must start with a lone `*`
/// (followed by whitespace or nothing) or with `*/`; `*ptr = 0;` is code.
fn is_blank_or_comment(line: &str) -> bool {
	let line = line.trim();
	if line.is_empty() || line.starts_with("//") || line.starts_with("/*") {
		return true;
	}

	line.strip_prefix('*').is_some_and(|rest| {
		rest.is_empty() || rest.starts_with('/') || rest.starts_with(char::is_whitespace)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_zero_arguments() {
		let sig = parse_declaration("SYSCALL(1, fork)").unwrap();
		assert_eq!(sig.number(), 1);
		assert_eq!(sig.name(), "fork");
		assert_eq!(sig.argument_count(), 0);
	}

	#[test]
	fn parses_arguments_and_trailing_text() {
		let sig = parse_declaration("\tSYSCALL(5, write,int fd ,  const char* buf, ...);").unwrap();
		assert_eq!(sig.number(), 5);
		assert_eq!(sig.name(), "write");
		assert_eq!(sig.declaration_string(), "int, const char*, ...");
	}

	#[test]
	fn empty_argument_list_is_zero_arity() {
		let sig = parse_declaration("SYSCALL(3, pause,  )").unwrap();
		assert_eq!(sig.argument_count(), 0);
	}

	#[test]
	fn trailing_comma_is_ignored() {
		let sig = parse_declaration("SYSCALL(0, exit, int code, )").unwrap();
		assert_eq!(sig.argument_count(), 1);
		assert_eq!(sig.argument_types().collect::<Vec<_>>(), ["int"]);

		let table = Scanner::default()
			.scan("SYSCALL(0, exit, int code, )\nSYSCALL(1, fork)\n")
			.unwrap();
		assert_eq!(table.len(), 2);
		assert_eq!(table.get(0).unwrap().name(), "exit");
	}

	#[test]
	fn rejects_malformed_lines() {
		for line in [
			"",
			"// SYSCALL(0, exit, int code)",
			"SYSCALL(x, exit)",
			"SYSCALL(0 , exit)",
			"SYSCALL(0, exit , int code)",
			"SYSCALL(0, , int code)",
			"SYSCALL(0, exit, int code",
			"SYSCALL(0, exit, int)",
			"SYSCALL(0, exit, int a,, int b)",
			"SYSCALL(99999999999, exit)",
			"DEFN_SYSCALL1(exit, 0, int);",
		] {
			assert_eq!(parse_declaration(line), None, "{line:?}");
		}
	}

	#[test]
	fn comma_naive_splitting() {
		// Commas inside a type are not understood; the first half has no
		// parameter name and the whole declaration is rejected.
		assert_eq!(
			parse_declaration("SYSCALL(7, f, map<int, int> m)"),
			None
		);
	}

	#[test]
	fn scan_best_effort() {
		let source = "\
// system calls
SYSCALL(0, exit, int code)

int helper(void) { return 0; }
SYSCALL(3, first)
SYSCALL(3, second, int x)
";

		let table = Scanner::default().scan(source).unwrap();
		assert_eq!(table.len(), 2);
		assert_eq!(table.get(0).unwrap().name(), "exit");
		assert_eq!(table.get(3).unwrap().name(), "second");
	}

	#[test]
	fn scan_strict_reports_unmatched() {
		let source = "\
// comment
/* block
 * comment
 */

SYSCALL(0, exit, int code)
int helper(void);
SYSCALL(1, open, char*)
";

		let err = Scanner::default()
			.with_mode(ScanMode::Strict)
			.scan(source)
			.unwrap_err();

		assert_eq!(
			err,
			ScanError::Unmatched(vec![
				UnmatchedLine {
					line: 7,
					text: "int helper(void);".into(),
				},
				UnmatchedLine {
					line: 8,
					text: "SYSCALL(1, open, char*)".into(),
				},
			])
		);
	}

	#[test]
	fn comment_continuations_vs_dereferences() {
		assert!(is_blank_or_comment(" * block comment body"));
		assert!(is_blank_or_comment(" *"));
		assert!(is_blank_or_comment(" */"));
		assert!(is_blank_or_comment("\t*\tindented with a tab"));
		assert!(!is_blank_or_comment("*ptr = 0;"));
		assert!(!is_blank_or_comment("  **pp = nullptr;"));

		let err = Scanner::default()
			.with_mode(ScanMode::Strict)
			.scan("SYSCALL(0, exit, int code)\n*ptr = 0;\n")
			.unwrap_err();
		assert_eq!(
			err,
			ScanError::Unmatched(vec![UnmatchedLine {
				line: 2,
				text: "*ptr = 0;".into(),
			}])
		);
	}

	#[test]
	fn scan_strict_accepts_clean_source() {
		let source = "// numbers are dispatch indices\n\nSYSCALL(0, exit, int code)\n";
		let table = Scanner::default()
			.with_mode(ScanMode::Strict)
			.scan(source)
			.unwrap();
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn scan_reports_capacity_with_line() {
		let source = "\nSYSCALL(4, mmap, void* a, int b, int c, int d, int e, int f)\n";
		let err = Scanner::default().scan(source).unwrap_err();

		assert!(matches!(
			err,
			ScanError::Table {
				line:   2,
				source: TableError::TooManyArguments { count: 6, max: 5, .. },
			}
		));
	}
}
