//! Statekeeper: a small thread-safe finite state machine
//!
//! Statekeeper is meant to live inside a host's own data structures and
//! enforce the legal lifecycle of whatever the host tracks. States are
//! registered at runtime together with the states they may move to; the
//! machine then validates and applies transition requests from any thread.
//!
//! # Core Concepts
//!
//! - **State**: any hashable identifier via the `State` trait (`StateId`,
//!   `String`, `&'static str` or a `state_enum!` enum)
//! - **Rules**: per-state `TransitionRuleSet`s, registered additively
//! - **Initial transition**: the first move only needs a registered target
//! - **Callbacks**: one optional observer, notified synchronously or in
//!   order on a background thread
//!
//! # Example
//!
//! ```rust
//! use statekeeper::{ErrorCode, Machine};
//!
//! let machine: Machine = Machine::new();
//! machine.register_rules("start", ["started", "never_exist"]);
//! machine.register_rules("started", ["finishing", "aborted"]);
//! machine.register_state("aborted");
//! machine.register_rules("finishing", ["finished"]);
//! machine.register_state("finished");
//!
//! machine.transition_to("start").unwrap();
//!
//! let err = machine.transition_to("finished").unwrap_err();
//! assert_eq!(err.code(), ErrorCode::TransitionNotPermitted);
//!
//! // Listed as a destination of "start" but never registered itself.
//! let err = machine.transition_to("never_exist").unwrap_err();
//! assert_eq!(err.code(), ErrorCode::StateUndefined);
//!
//! machine.transition_to("started").unwrap();
//! assert_eq!(machine.current_state().unwrap(), "started");
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod machine;
pub mod notify;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use core::{State, StateId, TransitionRuleSet};
pub use error::{Error, ErrorCode, Result};
pub use machine::Machine;
pub use notify::{CallbackResult, DispatchMode, TransitionCallback};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
