//! Ordered delivery of asynchronous notifications.
//!
//! Each machine owns at most one dispatcher: a channel drained by a single
//! worker thread, so notifications arrive in the order transitions were
//! applied. The worker holds only the callback and the state it delivers and
//! never touches the machine lock.

use super::callback::TransitionCallback;
use crate::core::State;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{trace, warn};

struct Notification<S: State> {
    callback: Arc<dyn TransitionCallback<S>>,
    state: S,
}

pub(crate) struct Dispatcher<S: State> {
    queue: Sender<Notification<S>>,
}

impl<S: State> Dispatcher<S> {
    /// Start the worker thread. It exits once the dispatcher is dropped and
    /// the queue has been drained.
    pub(crate) fn spawn() -> io::Result<Self> {
        let (queue, pending) = mpsc::channel::<Notification<S>>();

        thread::Builder::new()
            .name("statekeeper-notify".to_string())
            .spawn(move || {
                for notification in pending {
                    let Notification { callback, state } = notification;
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        deliver(callback.as_ref(), &state);
                    }));
                    if outcome.is_err() {
                        warn!(state = state.name(), "transition callback panicked");
                    }
                }
                trace!("notification queue closed");
            })?;

        Ok(Self { queue })
    }

    /// Queue a notification. Returns `false` if the worker is gone.
    pub(crate) fn send(&self, callback: Arc<dyn TransitionCallback<S>>, state: S) -> bool {
        self.queue.send(Notification { callback, state }).is_ok()
    }
}

/// Invoke a callback, logging and discarding any error it reports.
pub(crate) fn deliver<S: State>(callback: &dyn TransitionCallback<S>, state: &S) {
    trace!(state = state.name(), "delivering transition notification");
    if let Err(err) = callback.on_transition(state) {
        warn!(state = state.name(), error = %err, "transition callback failed");
    }
}
