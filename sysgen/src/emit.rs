//! The three emission passes.
//!
//! Each pass is a pure function of a [`SyscallTable`] and always walks
//! it in ascending number order. The textual output is consumed
//! directly by the kernel build, so macro names, symbol names and
//! layout must not change.

use crate::{signature::Signature, table::SyscallTable};

/// Prefix of every generated trampoline symbol.
pub const TRAMPOLINE_PREFIX: &str = "_syscall_tramp_";

/// Identifies one of the generated artifacts.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	strum::Display,
	strum::EnumString,
	strum::EnumIter,
)]
pub enum Artifact {
	/// `DECL_SYSCALLn` invocations.
	#[strum(to_string = "decl", serialize = "declarations")]
	Declarations,
	/// `DEFN_SYSCALLn` invocations.
	#[strum(to_string = "impl", serialize = "definitions")]
	Definitions,
	/// Trampolines, the dispatch table and the name table.
	#[strum(to_string = "tramp", serialize = "trampolines")]
	Trampolines,
}

impl Artifact {
	/// The file name the kernel build includes this artifact as.
	#[must_use]
	pub const fn default_file_name(self) -> &'static str {
		match self {
			Self::Declarations => "syscall_decl.incl.hpp",
			Self::Definitions => "syscall_impl.incl.hpp",
			Self::Trampolines => "syscall_tramp.incl.hpp",
		}
	}

	/// Runs the emission pass that produces this artifact.
	#[must_use]
	pub fn emit(self, table: &SyscallTable) -> String {
		match self {
			Self::Declarations => declarations(table),
			Self::Definitions => definitions(table),
			Self::Trampolines => trampolines(table),
		}
	}
}

/// Emits one `DECL_SYSCALLn` invocation per non-raw system call.
#[must_use]
pub fn declarations(table: &SyscallTable) -> String {
	table
		.non_raw()
		.map(|sig| {
			match sig.argument_count() {
				0 => format!("DECL_SYSCALL0({});\n", sig.name()),
				n => {
					format!(
						"DECL_SYSCALL{n}({}, {});\n",
						sig.name(),
						sig.declaration_string()
					)
				}
			}
		})
		.collect()
}

/// Emits one `DEFN_SYSCALLn` invocation per non-raw system call,
/// binding its name to its number.
#[must_use]
pub fn definitions(table: &SyscallTable) -> String {
	table
		.non_raw()
		.map(|sig| {
			match sig.argument_count() {
				0 => format!("DEFN_SYSCALL0({}, {});\n", sig.name(), sig.number()),
				n => {
					format!(
						"DEFN_SYSCALL{n}({}, {}, {});\n",
						sig.name(),
						sig.number(),
						sig.declaration_string()
					)
				}
			}
		})
		.collect()
}

/// Emits a trampoline for every system call (raw ones included),
/// followed by the null-terminated dispatch table, its length, and the
/// null-terminated name table.
///
/// Both tables are in ascending number order; they are only indexable
/// by number when the numbering is contiguous and zero-based (see
/// [`SyscallTable::check_contiguous`]).
#[must_use]
pub fn trampolines(table: &SyscallTable) -> String {
	let mut out = table
		.iter()
		.map(|sig| trampoline(table, sig))
		.collect::<String>();

	out.push_str("static void* syscalls[] = {\n");
	for sig in table {
		out.push_str(&format!("  (void*)&{TRAMPOLINE_PREFIX}{},\n", sig.name()));
	}
	out.push_str("  0\n};\n");

	out.push_str(&format!("const static u32 num_syscalls = {};\n", table.len()));

	out.push_str("static const char* syscall_names[] = {\n");
	for sig in table {
		out.push_str(&format!("  \"{}\",\n", sig.name()));
	}
	out.push_str("  0\n};\n");

	out
}

/// Renders a single trampoline function.
fn trampoline(table: &SyscallTable, sig: &Signature) -> String {
	let abi = table.abi();
	let name = sig.name();
	let number = sig.number();

	let call = if sig.is_raw(abi) {
		format!("SYSCALL_NAME({name})({});", abi.context_param)
	} else {
		format!(
			"{} = SYSCALL_NAME({name})({});",
			abi.field(&abi.return_register),
			sig.register_expression(abi)
		)
	};

	format!(
		"void {TRAMPOLINE_PREFIX}{name}({} {}) {{\n  TRACE_START_SYSCALL({number});\n  \
		 {call}\n  TRACE_END_SYSCALL({number});\n}}\n",
		abi.context_type, abi.context_param
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scan::Scanner;

	fn table(source: &str) -> SyscallTable {
		Scanner::default().scan(source).unwrap()
	}

	#[test]
	fn exit_scenario() {
		let table = table("SYSCALL(0, exit, int code)");

		assert_eq!(declarations(&table), "DECL_SYSCALL1(exit, int);\n");
		assert_eq!(definitions(&table), "DEFN_SYSCALL1(exit, 0, int);\n");
		assert_eq!(
			trampolines(&table),
			"\
void _syscall_tramp_exit(Registers* regs) {
  TRACE_START_SYSCALL(0);
  regs->eax = SYSCALL_NAME(exit)((int)regs->ebx);
  TRACE_END_SYSCALL(0);
}
static void* syscalls[] = {
  (void*)&_syscall_tramp_exit,
  0
};
const static u32 num_syscalls = 1;
static const char* syscall_names[] = {
  \"exit\",
  0
};
"
		);
	}

	#[test]
	fn zero_and_n_arity_forms() {
		let table = table(
			"SYSCALL(1, fork)\nSYSCALL(2, read, int fd, char* buf, int len)\nSYSCALL(0, \
			 getpid)",
		);

		assert_eq!(
			declarations(&table),
			"DECL_SYSCALL0(getpid);\nDECL_SYSCALL0(fork);\nDECL_SYSCALL3(read, int, char*, \
			 int);\n"
		);
		assert_eq!(
			definitions(&table),
			"DEFN_SYSCALL0(getpid, 0);\nDEFN_SYSCALL0(fork, 1);\nDEFN_SYSCALL3(read, 2, int, \
			 char*, int);\n"
		);
	}

	#[test]
	fn raw_only_in_trampolines() {
		let table = table("SYSCALL(0, exit, int code)\nSYSCALL(2, fault_handler, Registers* regs)");

		assert!(!declarations(&table).contains("fault_handler"));
		assert!(!definitions(&table).contains("fault_handler"));

		let tramp = trampolines(&table);
		assert!(tramp.contains(
			"void _syscall_tramp_fault_handler(Registers* regs) {\n  TRACE_START_SYSCALL(2);\n  \
			 SYSCALL_NAME(fault_handler)(regs);\n  TRACE_END_SYSCALL(2);\n}\n"
		));
		assert!(!tramp.contains("regs->eax = SYSCALL_NAME(fault_handler)"));
		assert!(tramp.contains("  (void*)&_syscall_tramp_fault_handler,\n"));
		assert!(tramp.contains("  \"fault_handler\",\n"));
	}

	#[test]
	fn tables_follow_sorted_numbers() {
		let table = table("SYSCALL(7, c)\nSYSCALL(3, b)\nSYSCALL(3, a)\nSYSCALL(0, z)");
		let tramp = trampolines(&table);

		let entries = tramp
			.lines()
			.filter(|l| l.starts_with("  (void*)&"))
			.collect::<Vec<_>>();
		let names = tramp
			.lines()
			.filter(|l| l.starts_with("  \""))
			.collect::<Vec<_>>();

		assert_eq!(
			entries,
			[
				"  (void*)&_syscall_tramp_z,",
				"  (void*)&_syscall_tramp_a,",
				"  (void*)&_syscall_tramp_c,",
			]
		);
		assert_eq!(names, ["  \"z\",", "  \"a\",", "  \"c\","]);
		assert!(tramp.contains("const static u32 num_syscalls = 3;\n"));
		assert_eq!(tramp.matches("  0\n};\n").count(), 2);
	}

	#[test]
	fn empty_table() {
		let table = SyscallTable::default();
		assert_eq!(declarations(&table), "");
		assert_eq!(definitions(&table), "");
		assert_eq!(
			trampolines(&table),
			"static void* syscalls[] = {\n  0\n};\nconst static u32 num_syscalls = 0;\nstatic \
			 const char* syscall_names[] = {\n  0\n};\n"
		);
	}

	#[test]
	fn artifact_names() {
		assert_eq!("decl".parse::<Artifact>(), Ok(Artifact::Declarations));
		assert_eq!("impl".parse::<Artifact>(), Ok(Artifact::Definitions));
		assert_eq!("trampolines".parse::<Artifact>(), Ok(Artifact::Trampolines));
		assert!("bogus".parse::<Artifact>().is_err());
		assert_eq!(Artifact::Definitions.to_string(), "impl");
	}
}
