//! Macros for ergonomic state definitions.

/// Generate a `State` implementation for a plain enum.
///
/// The enum gets `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash` and `Debug`
/// derives; each variant's name is its identifier.
///
/// # Example
///
/// ```
/// use statekeeper::core::State;
/// use statekeeper::state_enum;
///
/// state_enum! {
///     pub enum Lifecycle {
///         Start,
///         Started,
///         Finished,
///     }
/// }
///
/// assert_eq!(Lifecycle::Started.name(), "Started");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
