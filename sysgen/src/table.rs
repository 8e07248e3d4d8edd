//! The `number -> signature` mapping shared by every emitter.

use std::collections::{BTreeMap, btree_map};

use crate::{abi::Abi, signature::Signature};

/// Errors raised while building or validating a [`SyscallTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
	/// A system call declares more arguments than there are argument registers.
	#[error(
		"system call `{name}` ({number}) declares {count} arguments, but only {max} argument \
		 registers are available"
	)]
	TooManyArguments {
		/// The system call number.
		number: u32,
		/// The system call name.
		name:   String,
		/// The number of declared arguments.
		count:  usize,
		/// The number of argument registers in the ABI.
		max:    usize,
	},
	/// The system call numbers do not form a contiguous, zero-based range.
	#[error("system call numbers are not contiguous: expected {expected}, found {found}")]
	Gap {
		/// The number that should have been declared next.
		expected: u32,
		/// The number that was found in its place.
		found:    u32,
	},
}

/// All declared system calls, keyed (and always iterated) by number.
///
/// Inserting a signature for a number that is already present replaces
/// the earlier one. The table also carries the [`Abi`] it was built for,
/// since arity limits and raw detection depend on it.
#[derive(Debug, Clone, Default)]
pub struct SyscallTable {
	/// The convention every signature is checked against.
	abi:     Abi,
	/// The signatures, ordered by number.
	entries: BTreeMap<u32, Signature>,
}

impl SyscallTable {
	/// Creates an empty table for the given ABI.
	#[must_use]
	pub fn new(abi: Abi) -> Self {
		Self {
			abi,
			entries: BTreeMap::new(),
		}
	}

	/// The ABI this table was built for.
	#[inline]
	#[must_use]
	pub fn abi(&self) -> &Abi {
		&self.abi
	}

	/// Inserts a signature, returning the one it replaced (if any).
	///
	/// Fails if the signature has more arguments than the ABI has
	/// argument registers; the table is left unchanged in that case.
	pub fn insert(&mut self, signature: Signature) -> Result<Option<Signature>, TableError> {
		let max = self.abi.max_arguments();
		if signature.argument_count() > max {
			return Err(TableError::TooManyArguments {
				number: signature.number(),
				name: signature.name().to_string(),
				count: signature.argument_count(),
				max,
			});
		}

		Ok(self.entries.insert(signature.number(), signature))
	}

	/// Looks up a system call by number.
	#[must_use]
	pub fn get(&self, number: u32) -> Option<&Signature> {
		self.entries.get(&number)
	}

	/// The number of distinct system call numbers.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table holds no system calls.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over all signatures in ascending number order.
	pub fn iter(&self) -> btree_map::Values<'_, u32, Signature> {
		self.entries.values()
	}

	/// Iterates over the signatures that are not raw, in ascending order.
	pub fn non_raw(&self) -> impl Iterator<Item = &Signature> {
		self.iter().filter(|sig| !sig.is_raw(&self.abi))
	}

	/// Verifies that the declared numbers are exactly `0..len()`.
	///
	/// The dispatch table is emitted in sorted order, so consumers that
	/// index it by number only work if there are no gaps. This is not
	/// enforced unless explicitly requested.
	pub fn check_contiguous(&self) -> Result<(), TableError> {
		for (expected, &found) in (0_u32..).zip(self.entries.keys()) {
			if expected != found {
				return Err(TableError::Gap { expected, found });
			}
		}

		Ok(())
	}
}

impl<'a> IntoIterator for &'a SyscallTable {
	type IntoIter = btree_map::Values<'a, u32, Signature>;
	type Item = &'a Signature;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signature::Argument;

	fn sig(number: u32, name: &str, specs: &[&str]) -> Signature {
		Signature::new(
			number,
			name,
			specs.iter().map(|s| Argument::parse(s).unwrap()).collect(),
		)
	}

	#[test]
	fn last_insert_wins() {
		let mut table = SyscallTable::default();
		assert_eq!(table.insert(sig(3, "first", &[])).unwrap(), None);
		let replaced = table.insert(sig(3, "second", &["int x"])).unwrap();

		assert_eq!(replaced.unwrap().name(), "first");
		assert_eq!(table.len(), 1);
		assert_eq!(table.get(3).unwrap().name(), "second");
	}

	#[test]
	fn iterates_in_numeric_order() {
		let mut table = SyscallTable::default();
		for n in [10, 2, 7, 0] {
			table.insert(sig(n, &format!("s{n}"), &[])).unwrap();
		}

		let numbers = table.iter().map(Signature::number).collect::<Vec<_>>();
		assert_eq!(numbers, [0, 2, 7, 10]);
	}

	#[test]
	fn rejects_too_many_arguments() {
		let mut table = SyscallTable::default();
		let err = table
			.insert(sig(
				4,
				"mmap",
				&["void* a", "int b", "int c", "int d", "int e", "int f"],
			))
			.unwrap_err();

		assert_eq!(
			err,
			TableError::TooManyArguments {
				number: 4,
				name:   "mmap".into(),
				count:  6,
				max:    5,
			}
		);
		assert!(table.is_empty());

		// Exactly at the limit is fine.
		table
			.insert(sig(4, "mmap", &["void* a", "int b", "int c", "int d", "..."]))
			.unwrap();
	}

	#[test]
	fn contiguity() {
		let mut table = SyscallTable::default();
		assert_eq!(table.check_contiguous(), Ok(()));

		for n in 0..4 {
			table.insert(sig(n, "x", &[])).unwrap();
		}
		assert_eq!(table.check_contiguous(), Ok(()));

		table.insert(sig(6, "y", &[])).unwrap();
		assert_eq!(
			table.check_contiguous(),
			Err(TableError::Gap {
				expected: 4,
				found:    6,
			})
		);

		let mut table = SyscallTable::default();
		table.insert(sig(1, "z", &[])).unwrap();
		assert_eq!(
			table.check_contiguous(),
			Err(TableError::Gap {
				expected: 0,
				found:    1,
			})
		);
	}

	#[test]
	fn non_raw_skips_raw() {
		let mut table = SyscallTable::default();
		table.insert(sig(0, "exit", &["int code"])).unwrap();
		table.insert(sig(1, "fault", &["Registers* regs"])).unwrap();

		let names = table.non_raw().map(Signature::name).collect::<Vec<_>>();
		assert_eq!(names, ["exit"]);
	}
}
