//! CLI subcommand implementations.

pub mod call;
pub mod check;
pub mod describe;
pub mod list;
pub mod serve;
