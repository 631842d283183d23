//! Transition notifications.
//!
//! A machine holds at most one [`TransitionCallback`] together with its
//! [`DispatchMode`]. Synchronous callbacks run inside the transition;
//! asynchronous ones are handed to a per-machine worker thread that delivers
//! them in transition order.

mod callback;
pub(crate) mod dispatcher;

pub use callback::{CallbackResult, DispatchMode, TransitionCallback};
