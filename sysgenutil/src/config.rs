//! Generator configuration, merged from `[workspace.metadata.sysgen]` and
//! the command line.

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use cargo_metadata::Metadata;
use serde::Deserialize;
use strum::IntoEnumIterator;
use sysgen::{Abi, Artifact, Generator, ScanMode};

/// Errors raised while resolving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// `[workspace.metadata.sysgen]` exists but doesn't deserialize.
	#[error("invalid `[workspace.metadata.sysgen]` table: {0}")]
	Metadata(#[from] serde_json::Error),
	/// Neither the command line nor the workspace metadata name an input.
	#[error("no declaration source given; pass `--input` or set `workspace.metadata.sysgen.input`")]
	NoInput,
}

/// The `[workspace.metadata.sysgen]` table.
///
/// ```toml
/// [workspace.metadata.sysgen]
/// input              = "kernel/syscall.cpp"
/// out-dir            = "kernel"
/// require-contiguous = true
/// registers          = ["ebx", "ecx", "edx", "esi", "edi"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SysgenMetadata {
	/// The declaration source, relative to the workspace root.
	pub input:              Option<PathBuf>,
	/// The output directory, relative to the workspace root.
	pub out_dir:            Option<PathBuf>,
	/// Report non-declaration lines.
	pub strict:             bool,
	/// Reject gaps in the numbering.
	pub require_contiguous: bool,
	/// File name override for the declarations artifact.
	pub decl_file:          Option<String>,
	/// File name override for the definitions artifact.
	pub impl_file:          Option<String>,
	/// File name override for the trampolines artifact.
	pub tramp_file:         Option<String>,
	/// Register convention overrides.
	#[serde(flatten)]
	pub abi:                Abi,
}

impl SysgenMetadata {
	/// Loads the metadata table from the enclosing cargo workspace.
	///
	/// Relative paths are resolved against the workspace root. If
	/// `cargo metadata` can't be run (e.g. outside of a workspace),
	/// the defaults are used.
	pub fn load() -> Result<Self, ConfigError> {
		let metadata = match crate::util::cargo_metadata::<Metadata>() {
			Ok(metadata) => metadata,
			Err(e) => {
				log::warn!("could not read workspace metadata, using defaults: {e}");
				return Ok(Self::default());
			}
		};

		let Some(table) = metadata.workspace_metadata.get("sysgen") else {
			log::debug!("no `[workspace.metadata.sysgen]` table; using defaults");
			return Ok(Self::default());
		};

		let mut this: Self = serde_json::from_value(table.clone())?;

		let root = metadata.workspace_root.as_std_path();
		this.input = this.input.map(|p| root.join(p));
		this.out_dir = this.out_dir.map(|p| root.join(p));

		Ok(this)
	}

	/// The file name configured for the given artifact.
	pub fn file_name(&self, artifact: Artifact) -> &str {
		let configured = match artifact {
			Artifact::Declarations => &self.decl_file,
			Artifact::Definitions => &self.impl_file,
			Artifact::Trampolines => &self.tramp_file,
		};

		configured
			.as_deref()
			.unwrap_or_else(|| artifact.default_file_name())
	}
}

/// A fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
	/// The declaration source.
	pub input:   PathBuf,
	/// Each selected artifact and where it goes.
	pub outputs: BTreeMap<Artifact, PathBuf>,
	/// The configured generator.
	pub generator: Generator,
}

impl Config {
	/// Merges command line arguments over the workspace metadata.
	pub fn resolve(
		source: &crate::SourceArgs,
		output: Option<&crate::OutputArgs>,
		metadata: SysgenMetadata,
	) -> Result<Self, ConfigError> {
		let input = source
			.input
			.clone()
			.or_else(|| metadata.input.clone())
			.ok_or(ConfigError::NoInput)?;

		let out_dir = output
			.and_then(|o| o.out_dir.clone())
			.or_else(|| metadata.out_dir.clone())
			.unwrap_or_else(|| parent_dir(&input));

		let selected = match output {
			Some(o) if !o.only.is_empty() => o.only.clone(),
			_ => Artifact::iter().collect(),
		};

		let outputs = selected
			.into_iter()
			.map(|artifact| (artifact, out_dir.join(metadata.file_name(artifact))))
			.collect();

		let mode = if source.strict || metadata.strict {
			ScanMode::Strict
		} else {
			ScanMode::BestEffort
		};

		let generator = Generator::new(metadata.abi)
			.with_mode(mode)
			.require_contiguous(source.require_contiguous || metadata.require_contiguous);

		Ok(Self {
			input,
			outputs,
			generator,
		})
	}

	/// The selected outputs as `(artifact, path)` pairs.
	pub fn output_list(&self) -> Vec<(Artifact, PathBuf)> {
		self.outputs
			.iter()
			.map(|(artifact, path)| (*artifact, path.clone()))
			.collect()
	}
}

/// The directory containing `path`, or `.` for bare file names.
fn parent_dir(path: &Path) -> PathBuf {
	match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
		_ => PathBuf::from("."),
	}
}
