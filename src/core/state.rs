//! State identifiers.
//!
//! The machine never enumerates states at compile time; any hashable
//! identifier works. [`StateId`] is the owned string form most hosts use.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for state identifiers.
///
/// # Required Traits
///
/// - `Clone`: rule sets hand out copies of their states
/// - `Eq` + `Hash`: states key the rule registry
/// - `Debug`: states must be debuggable for diagnostics
/// - `Send` + `Sync` + `'static`: states cross into the notification thread
///
/// # Example
///
/// ```rust
/// use statekeeper::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum JobState {
///     Queued,
///     Running,
///     Done,
/// }
///
/// impl State for JobState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Queued => "Queued",
///             Self::Running => "Running",
///             Self::Done => "Done",
///         }
///     }
/// }
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

/// Owned, opaque string identifier for a state.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl State for StateId {
    fn name(&self) -> &str {
        &self.0
    }
}

impl State for String {
    fn name(&self) -> &str {
        self
    }
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for StateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StateId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
