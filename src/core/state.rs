//! Label traits for states and triggers.
//!
//! A state machine is generic over the *labels* it is declared with: the
//! state identifiers forming the hierarchy and the trigger identifiers that
//! cause transitions. Both are plain values; the engine never inspects them
//! beyond equality, hashing, and the `name()` used in diagnostics.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state labels.
///
/// A state label identifies one node of the state hierarchy. Labels are
/// compared and hashed to resolve them to their representation in the tree,
/// and cloned into [`Transition`](crate::core::Transition) values.
///
/// # Required Traits
///
/// - `Clone`: labels are copied into transitions and diagnostics
/// - `Eq` + `Hash`: labels resolve to tree nodes by lookup
/// - `Debug`: labels must be debuggable for diagnostics
///
/// # Example
///
/// ```rust
/// use substate::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum PlayerState {
///     Stopped,
///     Playing,
///     Paused,
/// }
///
/// impl State for PlayerState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Stopped => "Stopped",
///             Self::Playing => "Playing",
///             Self::Paused => "Paused",
///         }
///     }
/// }
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync {
    /// Get the state's name for display/logging.
    ///
    /// Returns a static string reference for zero-cost naming.
    fn name(&self) -> &str;
}

/// Trait for trigger labels.
///
/// A trigger label identifies the event that caused a transition. Triggers
/// are hashed to look up internal handlers and compared against per-trigger
/// entry-action filters.
///
/// # Example
///
/// ```rust
/// use substate::core::Trigger;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum PlayerEvent {
///     Play,
///     Pause,
///     Stop,
/// }
///
/// impl Trigger for PlayerEvent {
///     fn name(&self) -> &str {
///         match self {
///             Self::Play => "Play",
///             Self::Pause => "Pause",
///             Self::Stop => "Stop",
///         }
///     }
/// }
/// ```
pub trait Trigger: Clone + Eq + Hash + Debug + Send + Sync {
    /// Get the trigger's name for display/logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        Busy,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Busy => "Busy",
            }
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestTrigger {
        Go,
        Halt,
    }

    impl Trigger for TestTrigger {
        fn name(&self) -> &str {
            match self {
                Self::Go => "Go",
                Self::Halt => "Halt",
            }
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Busy.name(), "Busy");
    }

    #[test]
    fn trigger_name_returns_correct_value() {
        assert_eq!(TestTrigger::Go.name(), "Go");
        assert_eq!(TestTrigger::Halt.name(), "Halt");
    }

    #[test]
    fn labels_are_comparable_and_cloneable() {
        let a = TestState::Idle;
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, TestState::Busy);
    }
}
