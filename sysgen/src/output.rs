//! Atomic replacement of generated artifacts.
//!
//! Every file is first written in full to a temporary file next to its
//! destination. Only once *all* of them have been staged are they renamed
//! into place, so a failed run never leaves a truncated artifact behind and
//! never touches artifacts from a previous run.

use std::{
	io::Write,
	path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

/// Errors raised while writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
	/// The temporary file for an artifact could not be created or written.
	#[error("failed to stage `{}`: {source}", path.display())]
	Stage {
		/// The artifact's final destination.
		path:   PathBuf,
		/// The underlying IO error.
		#[source]
		source: std::io::Error,
	},
	/// A staged artifact could not be moved into place.
	#[error("failed to replace `{}`: {source}", path.display())]
	Persist {
		/// The artifact's final destination.
		path:   PathBuf,
		/// The underlying IO error.
		#[source]
		source: std::io::Error,
	},
}

/// What happened to a single artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
	/// The file was (re)written.
	Written,
	/// The file already had the expected contents and was left alone.
	Unchanged,
}

/// Writes all `(path, contents)` pairs atomically.
///
/// Files whose current contents already match are not rewritten, which
/// keeps their modification times stable for the consuming build.
pub fn write_all<P: AsRef<Path>>(
	files: &[(P, String)],
) -> Result<Vec<(PathBuf, WriteStatus)>, OutputError> {
	let mut staged = Vec::with_capacity(files.len());
	let mut statuses = Vec::with_capacity(files.len());

	for (path, contents) in files {
		let path: &Path = path.as_ref();

		if std::fs::read(path).is_ok_and(|existing| existing == contents.as_bytes()) {
			log::debug!("{} is up to date", path.display());
			statuses.push((path.to_path_buf(), WriteStatus::Unchanged));
			continue;
		}

		let tmp = stage(path, contents).map_err(|source| {
			OutputError::Stage {
				path: path.to_path_buf(),
				source,
			}
		})?;

		log::trace!("staged {} at {}", path.display(), tmp.path().display());
		staged.push((path, tmp));
		statuses.push((path.to_path_buf(), WriteStatus::Written));
	}

	// Any early return above drops `staged`, which deletes the temporaries.
	for (path, tmp) in staged {
		tmp.persist(path).map_err(|err| {
			OutputError::Persist {
				path:   path.to_path_buf(),
				source: err.error,
			}
		})?;

		log::info!("wrote {}", path.display());
	}

	Ok(statuses)
}

/// Writes `contents` to a fresh temporary file in `path`'s directory.
fn stage(path: &Path, contents: &str) -> std::io::Result<NamedTempFile> {
	let dir = match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => dir,
		_ => Path::new("."),
	};

	let mut tmp = NamedTempFile::new_in(dir)?;
	tmp.write_all(contents.as_bytes())?;
	tmp.as_file().sync_all()?;

	Ok(tmp)
}
