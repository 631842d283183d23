//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder and a macro for defining state
//! enums with minimal boilerplate.

pub mod machine;
pub mod macros;

pub use machine::MachineBuilder;
