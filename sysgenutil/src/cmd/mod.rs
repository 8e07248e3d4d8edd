//! All subcommand implementations for the system call glue generator.

pub mod check;
pub mod generate;
pub mod list;
