//! In-memory model of a single declared system call.

use core::fmt;

use crate::abi::Abi;

/// The literal spelling of the variadic marker.
pub const VARIADIC: &str = "...";

/// A single argument specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
	/// A typed argument, e.g. `const char* buf`.
	Typed {
		/// The type portion (every token but the last).
		ty:   String,
		/// The declared parameter name (the last token).
		name: String,
	},
	/// The variadic marker `...`; the register is passed through uncast.
	Variadic,
}

impl Argument {
	/// Parses a single (already comma-split) argument specification.
	///
	/// Returns `None` if the spec is empty or consists of a single
	/// token that isn't the variadic marker (i.e. it has no parameter
	/// name to strip).
	#[must_use]
	pub fn parse(spec: &str) -> Option<Self> {
		let spec = spec.trim();

		if spec == VARIADIC {
			return Some(Self::Variadic);
		}

		let mut tokens = spec.split_whitespace().collect::<Vec<_>>();
		let name = tokens.pop()?;

		if tokens.is_empty() {
			return None;
		}

		Some(Self::Typed {
			ty:   tokens.join(" "),
			name: name.to_string(),
		})
	}

	/// The type string of this argument; the variadic marker passes
	/// through unchanged.
	#[must_use]
	pub fn ty(&self) -> &str {
		match self {
			Self::Typed { ty, .. } => ty,
			Self::Variadic => VARIADIC,
		}
	}

	/// Returns `true` if this is the variadic marker.
	#[inline]
	#[must_use]
	pub const fn is_variadic(&self) -> bool {
		matches!(self, Self::Variadic)
	}
}

impl fmt::Display for Argument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Typed { ty, name } => write!(f, "{ty} {name}"),
			Self::Variadic => f.write_str(VARIADIC),
		}
	}
}

/// One declared system call.
///
/// Signatures are immutable once built; every derived view is computed
/// on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
	/// The dispatch index.
	number:    u32,
	/// The implementation's bare identifier.
	name:      String,
	/// Ordered argument list.
	arguments: Vec<Argument>,
}

impl Signature {
	/// Creates a new signature.
	#[must_use]
	pub fn new(number: u32, name: impl Into<String>, arguments: Vec<Argument>) -> Self {
		Self {
			number,
			name: name.into(),
			arguments,
		}
	}

	/// The system call number.
	#[inline]
	#[must_use]
	pub const fn number(&self) -> u32 {
		self.number
	}

	/// The system call name.
	#[inline]
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The declared arguments, in order.
	#[inline]
	#[must_use]
	pub fn arguments(&self) -> &[Argument] {
		&self.arguments
	}

	/// The number of declared arguments.
	#[inline]
	#[must_use]
	pub fn argument_count(&self) -> usize {
		self.arguments.len()
	}

	/// Iterates over the argument types, in order.
	pub fn argument_types(&self) -> impl Iterator<Item = &str> {
		self.arguments.iter().map(Argument::ty)
	}

	/// The argument types joined by `", "`, as used in the
	/// `DECL_SYSCALLn`/`DEFN_SYSCALLn` parameter lists.
	#[must_use]
	pub fn declaration_string(&self) -> String {
		self.argument_types().collect::<Vec<_>>().join(", ")
	}

	/// Builds the argument list passed from a trampoline to the
	/// implementation, mapping each argument onto its register.
	///
	/// Typed arguments are cast (`(int)regs->ebx`); the variadic marker
	/// is passed through uncast (`regs->edx`).
	///
	/// Arguments beyond the ABI's register count have no register and
	/// are not rendered; [`crate::SyscallTable`] refuses such signatures
	/// before they can reach an emitter.
	#[must_use]
	pub fn register_expression(&self, abi: &Abi) -> String {
		abi.registers
			.iter()
			.zip(&self.arguments)
			.map(|(register, arg)| {
				match arg {
					Argument::Variadic => abi.field(register),
					Argument::Typed { ty, .. } => format!("({ty}){}", abi.field(register)),
				}
			})
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// Whether this is a raw system call, receiving the whole register
	/// context rather than unpacked arguments.
	#[must_use]
	pub fn is_raw(&self, abi: &Abi) -> bool {
		match self.arguments.as_slice() {
			[Argument::Typed { ty, name }] => *ty == abi.context_type && *name == abi.context_param,
			_ => false,
		}
	}
}
