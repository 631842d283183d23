//! Error taxonomy shared by every machine operation.
//!
//! Errors carry a machine-distinguishable [`ErrorCode`] plus a human-readable
//! message, so callers can branch on the cause without parsing strings.

use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric cause of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ErrorCode {
    /// No cause assigned. Also used for any out-of-range numeric code.
    #[default]
    Unknown = 0,

    /// A registry-dependent operation ran before any rule was registered.
    MachineNotInitialized = 1,

    /// The current state does not allow a move to the requested state.
    TransitionNotPermitted = 2,

    /// The referenced state is not a registered key.
    StateUndefined = 3,
}

impl ErrorCode {
    /// Numeric value of the code.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Name used when rendering the code.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::MachineNotInitialized => "MachineNotInitialized",
            Self::TransitionNotPermitted => "TransitionNotPermitted",
            Self::StateUndefined => "StateUndefined",
        }
    }
}

impl From<u32> for ErrorCode {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::MachineNotInitialized,
            2 => Self::TransitionNotPermitted,
            3 => Self::StateUndefined,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a machine operation's preconditions do not hold.
///
/// A rejected operation never changes the machine, so every `Error` is
/// recoverable by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} ({}): {}", .code, .code.as_u32(), .message)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create an error with an explicit code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn not_initialized(message: &str) -> Self {
        Self::new(ErrorCode::MachineNotInitialized, message)
    }

    pub(crate) fn state_undefined(state: &str) -> Self {
        Self::new(
            ErrorCode::StateUndefined,
            format!("state {state} has not been registered"),
        )
    }

    pub(crate) fn not_permitted(from: &str, to: &str) -> Self {
        Self::new(
            ErrorCode::TransitionNotPermitted,
            format!("transition from state {from} to {to} is not permitted"),
        )
    }

    /// The cause of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_names_render() {
        assert_eq!(ErrorCode::Unknown.to_string(), "Unknown");
        assert_eq!(
            ErrorCode::MachineNotInitialized.to_string(),
            "MachineNotInitialized"
        );
        assert_eq!(
            ErrorCode::TransitionNotPermitted.to_string(),
            "TransitionNotPermitted"
        );
        assert_eq!(ErrorCode::StateUndefined.to_string(), "StateUndefined");
    }

    #[test]
    fn out_of_range_code_is_unknown() {
        assert_eq!(ErrorCode::from(100), ErrorCode::Unknown);
        assert_eq!(ErrorCode::from(u32::MAX).to_string(), "Unknown");
        assert_eq!(ErrorCode::from(3), ErrorCode::StateUndefined);
    }

    #[test]
    fn error_exposes_code_and_message() {
        let err = Error::new(ErrorCode::StateUndefined, "testMessage");

        assert_eq!(err.code(), ErrorCode::StateUndefined);
        assert_eq!(err.message(), "testMessage");
    }

    #[test]
    fn error_display_includes_name_number_and_message() {
        let err = Error::new(ErrorCode::TransitionNotPermitted, "testMessage");
        assert_eq!(err.to_string(), "TransitionNotPermitted (2): testMessage");

        let err = Error::new(ErrorCode::from(42), "testMessage");
        assert_eq!(err.to_string(), "Unknown (0): testMessage");
    }

    #[test]
    fn default_error_has_unknown_code() {
        let err = Error::default();
        assert_eq!(err.code(), ErrorCode::Unknown);
        assert_eq!(err.message(), "");
    }

    #[test]
    fn constructors_format_messages() {
        assert_eq!(
            Error::state_undefined("ghost").to_string(),
            "StateUndefined (3): state ghost has not been registered"
        );
        assert_eq!(
            Error::not_permitted("start", "finished").message(),
            "transition from state start to finished is not permitted"
        );
    }
}
