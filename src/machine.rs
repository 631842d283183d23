//! The thread-safe state machine.
//!
//! Registry, current state and callback configuration live behind a single
//! reader/writer lock and are always read and changed together.

use crate::core::{State, StateId, TransitionRuleSet};
use crate::error::{Error, ErrorCode, Result};
use crate::notify::dispatcher::{deliver, Dispatcher};
use crate::notify::{DispatchMode, TransitionCallback};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

struct Registration<S: State> {
    callback: Arc<dyn TransitionCallback<S>>,
    mode: DispatchMode,
}

struct Inner<S: State> {
    /// `None` until the first rule registration.
    registry: Option<HashMap<S, TransitionRuleSet<S>>>,
    /// `None` until the initial transition.
    current: Option<S>,
    callback: Option<Registration<S>>,
    /// Started on the first asynchronous notification.
    dispatcher: Option<Dispatcher<S>>,
}

impl<S: State> Inner<S> {
    fn registry(&self, message: &str) -> Result<&HashMap<S, TransitionRuleSet<S>>> {
        self.registry
            .as_ref()
            .ok_or_else(|| Error::not_initialized(message))
    }

    /// Check every precondition of a move to `target` without applying it.
    fn validate(&self, target: &S) -> Result<()> {
        let registry = self.registry("the machine has no states added")?;

        let Some(current) = &self.current else {
            if registry.contains_key(target) {
                return Ok(());
            }
            return Err(Error::new(
                ErrorCode::StateUndefined,
                format!("initial state {} has not been registered", target.name()),
            ));
        };

        let permitted = registry
            .get(current)
            .is_some_and(|rules| rules.contains(target));
        if !permitted {
            return Err(Error::not_permitted(current.name(), target.name()));
        }

        // A destination can be listed without ever being registered itself.
        if !registry.contains_key(target) {
            return Err(Error::state_undefined(target.name()));
        }

        Ok(())
    }

    fn notify(&mut self, state: S) {
        let Some((callback, mode)) = self
            .callback
            .as_ref()
            .map(|r| (Arc::clone(&r.callback), r.mode))
        else {
            return;
        };

        match mode {
            DispatchMode::Synchronous => deliver(callback.as_ref(), &state),
            DispatchMode::Asynchronous => self.dispatch(callback, state),
        }
    }

    fn dispatch(&mut self, callback: Arc<dyn TransitionCallback<S>>, state: S) {
        if self.dispatcher.is_none() {
            match Dispatcher::spawn() {
                Ok(dispatcher) => self.dispatcher = Some(dispatcher),
                Err(err) => {
                    warn!(error = %err, "cannot start notification thread, delivering inline");
                    deliver(callback.as_ref(), &state);
                    return;
                }
            }
        }

        let delivered = self
            .dispatcher
            .as_ref()
            .is_some_and(|dispatcher| dispatcher.send(callback, state));
        if !delivered {
            warn!("notification thread has stopped, notification dropped");
            self.dispatcher = None;
        }
    }
}

/// A finite state machine with a dynamically registered rule set.
///
/// Rules are registered per source state; the first transition picks the
/// initial state from any registered state, every later transition must be
/// allowed by the current state's rules and land on a registered state.
///
/// All methods take `&self`, so a machine can be shared across threads in an
/// `Arc` or embedded directly in a host's own shared structure.
///
/// # Example
///
/// ```rust
/// use statekeeper::{ErrorCode, Machine};
///
/// let machine: Machine = Machine::new();
/// machine.register_rules("start", ["started"]);
/// machine.register_rules("started", ["finished"]);
/// machine.register_state("finished");
///
/// machine.transition_to("start").unwrap();
/// let err = machine.transition_to("finished").unwrap_err();
/// assert_eq!(err.code(), ErrorCode::TransitionNotPermitted);
///
/// machine.transition_to("started").unwrap();
/// assert_eq!(machine.current_state().unwrap(), "started");
/// ```
pub struct Machine<S: State = StateId> {
    inner: RwLock<Inner<S>>,
}

impl<S: State> Default for Machine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Machine<S> {
    /// Create a machine with no rules and no current state.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                registry: None,
                current: None,
                callback: None,
                dispatcher: None,
            }),
        }
    }

    // Every write completes before a callback runs, so a lock poisoned by a
    // panicking synchronous callback still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner<S>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<S>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `source` and add `destinations` to the states it may move to.
    ///
    /// Registration is additive: calling this again for the same source only
    /// adds destinations. Destinations do not have to be registered yet.
    pub fn register_rules<I>(&self, source: impl Into<S>, destinations: I)
    where
        I: IntoIterator,
        I::Item: Into<S>,
    {
        let source = source.into();
        let mut inner = self.write();

        let rules = inner
            .registry
            .get_or_insert_with(HashMap::new)
            .entry(source.clone())
            .or_default();
        rules.extend(destinations.into_iter().map(Into::<S>::into));

        debug!(
            source = source.name(),
            destinations = rules.len(),
            "registered transition rules"
        );
    }

    /// Register `state` without adding any destinations.
    ///
    /// A state registered only this way is terminal.
    pub fn register_state(&self, state: impl Into<S>) {
        self.register_rules(state, std::iter::empty::<S>());
    }

    /// Copy of the destinations allowed from `state`.
    pub fn rules_for(&self, state: impl Into<S>) -> Result<TransitionRuleSet<S>> {
        let state = state.into();
        let inner = self.read();

        inner
            .registry("the machine has not been fully initialized")?
            .get(&state)
            .cloned()
            .ok_or_else(|| Error::state_undefined(state.name()))
    }

    /// Whether `state` has been registered as a source.
    pub fn is_registered(&self, state: impl Into<S>) -> bool {
        let state = state.into();
        self.read()
            .registry
            .as_ref()
            .is_some_and(|registry| registry.contains_key(&state))
    }

    /// Move the machine to `target`.
    ///
    /// The first successful call sets the initial state and only requires
    /// `target` to be registered; it does not notify the callback. Later
    /// calls require `target` to be both allowed from the current state and
    /// registered, and notify the callback on success.
    ///
    /// A synchronous callback runs before this returns, while the machine is
    /// still locked.
    pub fn transition_to(&self, target: impl Into<S>) -> Result<()> {
        let target = target.into();
        let mut inner = self.write();

        inner.validate(&target)?;

        let previous = inner.current.replace(target.clone());
        debug!(
            from = previous.as_ref().map(State::name),
            to = target.name(),
            "state transition"
        );

        if previous.is_some() {
            inner.notify(target);
        }
        Ok(())
    }

    /// Check whether [`Machine::transition_to`] would accept `target` right
    /// now, returning the error it would return.
    pub fn can_transition_to(&self, target: impl Into<S>) -> Result<()> {
        self.read().validate(&target.into())
    }

    /// The current state, or `None` before the initial transition.
    pub fn current_state(&self) -> Option<S> {
        self.read().current.clone()
    }

    /// Whether the machine sits in a state with no outgoing rules.
    pub fn is_terminal(&self) -> bool {
        let inner = self.read();
        match (&inner.current, &inner.registry) {
            (Some(current), Some(registry)) => registry
                .get(current)
                .map_or(true, TransitionRuleSet::is_empty),
            _ => false,
        }
    }

    /// Install the callback notified after each non-initial transition,
    /// replacing any previous one.
    ///
    /// `mode` accepts a [`DispatchMode`] or a `bool` where `true` means
    /// synchronous.
    ///
    /// The first asynchronous notification starts a dedicated OS thread that
    /// lives as long as the machine. Hosts embedding one machine per tracked
    /// entity pay one thread per machine with an asynchronous callback.
    pub fn set_callback(
        &self,
        callback: Arc<dyn TransitionCallback<S>>,
        mode: impl Into<DispatchMode>,
    ) {
        let mode = mode.into();
        let mut inner = self.write();

        let replaced = inner
            .callback
            .replace(Registration { callback, mode })
            .is_some();
        debug!(?mode, replaced, "transition callback set");
    }

    /// Remove the registered callback, if any.
    pub fn clear_callback(&self) {
        if self.write().callback.take().is_some() {
            debug!("transition callback cleared");
        }
    }

    /// Dispatch mode of the registered callback, if any.
    pub fn dispatch_mode(&self) -> Option<DispatchMode> {
        self.read().callback.as_ref().map(|r| r.mode)
    }
}

impl<S: State> fmt::Debug for Machine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("Machine")
            .field("current", &inner.current)
            .field(
                "registered_states",
                &inner.registry.as_ref().map_or(0, HashMap::len),
            )
            .field("dispatch_mode", &inner.callback.as_ref().map(|r| r.mode))
            .finish()
    }
}
