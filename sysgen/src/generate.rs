//! A full generation run: scan, validate, emit, write.

use std::path::{Path, PathBuf};

use crate::{
	abi::Abi,
	emit::Artifact,
	output::{self, OutputError, WriteStatus},
	scan::{ScanError, ScanMode, Scanner},
	table::{SyscallTable, TableError},
};

/// Any error that aborts a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
	/// The declaration source could not be read.
	#[error("failed to read `{}`: {source}", path.display())]
	Read {
		/// The declaration source.
		path:   PathBuf,
		/// The underlying IO error.
		#[source]
		source: std::io::Error,
	},
	/// Scanning failed.
	#[error(transparent)]
	Scan(#[from] ScanError),
	/// The table failed validation.
	#[error(transparent)]
	Table(#[from] TableError),
	/// Writing the artifacts failed.
	#[error(transparent)]
	Output(#[from] OutputError),
}

/// Drives a generation run.
#[derive(Debug, Clone, Default)]
pub struct Generator {
	/// Scanner configured with the target ABI and scan mode.
	scanner:            Scanner,
	/// Whether to reject non-contiguous numbering.
	require_contiguous: bool,
}

impl Generator {
	/// Creates a best-effort generator for the given ABI.
	#[must_use]
	pub fn new(abi: Abi) -> Self {
		Self {
			scanner:            Scanner::new(abi),
			require_contiguous: false,
		}
	}

	/// Sets the scan mode.
	#[must_use]
	pub fn with_mode(mut self, mode: ScanMode) -> Self {
		self.scanner = self.scanner.with_mode(mode);
		self
	}

	/// Requires system call numbers to be contiguous and zero-based.
	#[must_use]
	pub fn require_contiguous(mut self, require: bool) -> Self {
		self.require_contiguous = require;
		self
	}

	/// Scans and validates a declaration source.
	pub fn table(&self, source: &str) -> Result<SyscallTable, GenerateError> {
		let table = self.scanner.scan(source)?;

		if self.require_contiguous {
			table.check_contiguous()?;
		}

		Ok(table)
	}

	/// Reads, scans and validates the declaration source at `path`.
	pub fn table_from_file(&self, path: &Path) -> Result<SyscallTable, GenerateError> {
		let source = std::fs::read_to_string(path).map_err(|source| {
			GenerateError::Read {
				path: path.to_path_buf(),
				source,
			}
		})?;

		log::debug!("scanning {}", path.display());

		self.table(&source)
	}

	/// Runs a full generation: reads `input`, emits each requested
	/// artifact and atomically writes it to its paired path.
	pub fn run(
		&self,
		input: &Path,
		outputs: &[(Artifact, PathBuf)],
	) -> Result<Vec<(PathBuf, WriteStatus)>, GenerateError> {
		let table = self.table_from_file(input)?;

		let files = render(&table, outputs);

		Ok(output::write_all(&files)?)
	}
}

/// Emits every requested artifact, pairing it with its destination.
#[must_use]
pub fn render(table: &SyscallTable, outputs: &[(Artifact, PathBuf)]) -> Vec<(PathBuf, String)> {
	outputs
		.iter()
		.map(|(artifact, path)| (path.clone(), artifact.emit(table)))
		.collect()
}
