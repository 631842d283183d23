//! Builder for constructing machines.

use crate::core::State;
use crate::error::Result;
use crate::machine::Machine;
use crate::notify::{DispatchMode, TransitionCallback};
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
///
/// Rules are registered in the order they were added, the callback is
/// installed next, and the initial transition (if any) runs last.
pub struct MachineBuilder<S: State> {
    rules: Vec<(S, Vec<S>)>,
    callback: Option<(Arc<dyn TransitionCallback<S>>, DispatchMode)>,
    initial: Option<S>,
}

impl<S: State> MachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            callback: None,
            initial: None,
        }
    }

    /// Register `source` with the given destinations.
    pub fn rules<I>(mut self, source: impl Into<S>, destinations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<S>,
    {
        let destinations = destinations.into_iter().map(Into::<S>::into).collect();
        self.rules.push((source.into(), destinations));
        self
    }

    /// Register a terminal state.
    pub fn state(mut self, state: impl Into<S>) -> Self {
        self.rules.push((state.into(), Vec::new()));
        self
    }

    /// Install a transition callback.
    pub fn callback(
        mut self,
        callback: Arc<dyn TransitionCallback<S>>,
        mode: impl Into<DispatchMode>,
    ) -> Self {
        self.callback = Some((callback, mode.into()));
        self
    }

    /// Apply an initial transition once the machine is built.
    pub fn initial(mut self, state: impl Into<S>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Build the machine.
    ///
    /// Fails with the initial transition's error when `initial` names a
    /// state that was never registered, or when no rules were given.
    pub fn build(self) -> Result<Machine<S>> {
        let machine = Machine::new();

        for (source, destinations) in self.rules {
            machine.register_rules(source, destinations);
        }

        if let Some((callback, mode)) = self.callback {
            machine.set_callback(callback, mode);
        }

        if let Some(initial) = self.initial {
            machine.transition_to(initial)?;
        }

        Ok(machine)
    }
}

impl<S: State> Default for MachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
