//! Core library for the tegel backend-skeleton generator.
//!
//! Given a component name, a visitor flag and an ordered list of AST node names,
//! tegel emits a paired C++ declaration/definition skeleton for a compiler backend:
//! an optional visitor class with one dispatch method per node kind, plus the two
//! backend classes with their generation entry points.
//!
//! The moving parts:
//! - [`dispatcher::Dispatcher`]: orchestrates the artifacts and runs the terminal
//!   emission routines in [`emit`]
//! - [`cursor::IterationCursor`]: position tracking for repeated blocks
//! - [`sink`]: output sinks and the overwrite policy for existing files
//! - [`params`], [`config`]: parameter mappings and the configuration file

pub mod artifacts;
pub mod casing;
pub mod config;
pub mod cursor;
pub mod dispatcher;
pub mod emit;
pub mod error;
pub mod naming;
pub mod params;
pub mod sink;
pub mod vocabulary;
