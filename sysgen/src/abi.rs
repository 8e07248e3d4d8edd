//! Register calling convention the generated trampolines are written against.

use serde::Deserialize;

/// Describes the register context handed to every trampoline.
///
/// The defaults describe the 32-bit x86 convention used by the kernel:
/// arguments arrive in `ebx`, `ecx`, `edx`, `esi`, `edi` (in that order),
/// the context is a `Registers*` named `regs`, and the result is written
/// back into `eax`.
///
/// Every field may be overridden from `[workspace.metadata.sysgen]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Abi {
	/// General purpose registers that carry arguments, in argument order.
	///
	/// The length of this list is the maximum arity a system call may
	/// declare.
	pub registers:       Vec<String>,
	/// The type of the register context parameter (e.g. `Registers*`).
	///
	/// A system call whose only argument is of this type (and is named
	/// [`Abi::context_param`]) receives the context directly.
	pub context_type:    String,
	/// The name of the register context parameter inside each trampoline.
	pub context_param:   String,
	/// The context field that receives a system call's return value.
	pub return_register: String,
}

impl Default for Abi {
	fn default() -> Self {
		Self {
			registers:       ["ebx", "ecx", "edx", "esi", "edi"]
				.into_iter()
				.map(String::from)
				.collect(),
			context_type:    "Registers*".into(),
			context_param:   "regs".into(),
			return_register: "eax".into(),
		}
	}
}

impl Abi {
	/// The maximum number of arguments a system call may take.
	#[inline]
	#[must_use]
	pub fn max_arguments(&self) -> usize {
		self.registers.len()
	}

	/// Renders an access to the given context field, e.g. `regs->ebx`.
	#[must_use]
	pub fn field(&self, register: &str) -> String {
		format!("{}->{register}", self.context_param)
	}
}
