//! Core state machine types.
//!
//! This module contains the value types the machine is built from:
//! - State identifiers via the `State` trait and the `StateId` newtype
//! - Destination sets via `TransitionRuleSet`

mod rules;
mod state;

pub use rules::TransitionRuleSet;
pub use state::{State, StateId};
