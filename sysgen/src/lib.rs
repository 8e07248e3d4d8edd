//! Generates kernel system call glue from a single declaration table.
//!
//! System calls are declared once, as `SYSCALL(<number>, <name>, <args>...)`
//! lines. From those, this crate derives:
//!
//! - `DECL_SYSCALLn` invocations ([`emit::declarations`]),
//! - `DEFN_SYSCALLn` invocations ([`emit::definitions`]),
//! - per-call dispatch trampolines plus the dispatch and name tables
//!   ([`emit::trampolines`]).
//!
//! The macro bodies, the register context type, the trace hooks and the
//! system call implementations themselves live in the kernel; this crate
//! only emits references to them.
//!
//! ```ignore
//! let table = sysgen::Scanner::default().scan(source)?;
//! let decls = sysgen::emit::declarations(&table);
//! ```

pub mod abi;
pub mod emit;
pub mod generate;
pub mod output;
pub mod scan;
pub mod signature;
pub mod table;

pub use self::{
	abi::Abi,
	emit::Artifact,
	generate::{GenerateError, Generator},
	output::{OutputError, WriteStatus},
	scan::{ScanError, ScanMode, Scanner, UnmatchedLine},
	signature::{Argument, Signature},
	table::{SyscallTable, TableError},
};
