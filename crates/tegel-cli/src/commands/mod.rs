//! CLI command implementations for tegel.
//!
//! Each module corresponds to a subcommand (`tegel <command>`).

pub mod backend;
pub mod config;
pub mod cursor;
pub mod nodes;
