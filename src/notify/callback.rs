//! The notification contract hosts implement.

use crate::core::State;
use std::error::Error as StdError;

/// Result reported by a callback. The machine logs a failure and moves on.
pub type CallbackResult = Result<(), Box<dyn StdError + Send + Sync>>;

/// Receives the newly entered state after a completed transition.
///
/// Synchronous callbacks run while the machine holds its exclusive lock:
/// they must not call back into the same machine.
///
/// Closures of the shape `Fn(&S) -> CallbackResult` implement this trait.
///
/// # Example
///
/// ```rust
/// use statekeeper::notify::{CallbackResult, TransitionCallback};
/// use std::sync::Mutex;
///
/// struct Recorder {
///     seen: Mutex<Vec<&'static str>>,
/// }
///
/// impl TransitionCallback<&'static str> for Recorder {
///     fn on_transition(&self, state: &&'static str) -> CallbackResult {
///         self.seen.lock().unwrap().push(*state);
///         Ok(())
///     }
/// }
/// ```
pub trait TransitionCallback<S: State>: Send + Sync {
    fn on_transition(&self, state: &S) -> CallbackResult;
}

impl<S, F> TransitionCallback<S> for F
where
    S: State,
    F: Fn(&S) -> CallbackResult + Send + Sync,
{
    fn on_transition(&self, state: &S) -> CallbackResult {
        self(state)
    }
}

/// How a registered callback is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Run inside `transition_to` before it returns.
    #[default]
    Synchronous,

    /// Queue for the machine's notification thread and return immediately.
    Asynchronous,
}

impl DispatchMode {
    pub fn is_synchronous(self) -> bool {
        matches!(self, Self::Synchronous)
    }
}

/// `true` selects synchronous delivery.
impl From<bool> for DispatchMode {
    fn from(synchronous: bool) -> Self {
        if synchronous {
            Self::Synchronous
        } else {
            Self::Asynchronous
        }
    }
}
