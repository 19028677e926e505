//! Subcommand modules for the `lineage` binary.

pub mod args;
pub mod check;
pub mod forest;
pub mod nest;
