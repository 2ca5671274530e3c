//! Resolved transition values.
//!
//! A [`Transition`] is the immutable outcome of trigger resolution: which
//! state is being left, which is being entered, and which trigger caused it.
//! The execution core consumes transitions; it never decides them.

use crate::core::state::{State, Trigger};

/// A resolved transition between two states.
///
/// Constructed once per fired trigger and then consumed by the exit/enter
/// traversal. The exit walk may synthesize a rewritten copy whose source is
/// an ancestor of the original source (see [`Transition::retarget_source`]);
/// destination and trigger are never rewritten.
///
/// # Example
///
/// ```rust
/// use substate::core::Transition;
/// use substate::{state_enum, trigger_enum};
///
/// state_enum! {
///     enum Phase { Idle, Busy }
/// }
/// trigger_enum! {
///     enum Event { Start }
/// }
///
/// let transition = Transition::new(Phase::Idle, Phase::Busy, Event::Start);
/// assert!(!transition.is_reentry());
///
/// let reentry = Transition::new(Phase::Busy, Phase::Busy, Event::Start);
/// assert!(reentry.is_reentry());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<S: State, T: Trigger> {
    source: S,
    destination: S,
    trigger: T,
}

impl<S: State, T: Trigger> Transition<S, T> {
    /// Create a resolved transition.
    pub fn new(source: S, destination: S, trigger: T) -> Self {
        Self {
            source,
            destination,
            trigger,
        }
    }

    /// The state being left.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The state being entered.
    pub fn destination(&self) -> &S {
        &self.destination
    }

    /// The trigger that caused the transition.
    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    /// True iff source and destination are the same state.
    ///
    /// Reentry transitions still run entry/exit-style actions on the
    /// reentered state, but never recurse into its ancestors.
    pub fn is_reentry(&self) -> bool {
        self.source == self.destination
    }

    /// Synthesize the transition handed to an ancestor's exit walk: the
    /// source becomes the ancestor's own state, destination and trigger are
    /// preserved.
    pub fn retarget_source(&self, ancestor: S) -> Self {
        Self {
            source: ancestor,
            destination: self.destination.clone(),
            trigger: self.trigger.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::state_enum! {
        enum TestState {
            Root,
            Leaf,
        }
    }

    crate::trigger_enum! {
        enum TestTrigger {
            Tick,
        }
    }

    #[test]
    fn reentry_iff_source_equals_destination() {
        let t = Transition::new(TestState::Leaf, TestState::Leaf, TestTrigger::Tick);
        assert!(t.is_reentry());

        let t = Transition::new(TestState::Leaf, TestState::Root, TestTrigger::Tick);
        assert!(!t.is_reentry());
    }

    #[test]
    fn retarget_source_preserves_destination_and_trigger() {
        let t = Transition::new(TestState::Leaf, TestState::Root, TestTrigger::Tick);
        let rewritten = t.retarget_source(TestState::Root);

        assert_eq!(rewritten.source(), &TestState::Root);
        assert_eq!(rewritten.destination(), t.destination());
        assert_eq!(rewritten.trigger(), t.trigger());
    }

    #[test]
    fn retarget_to_destination_becomes_reentry() {
        let t = Transition::new(TestState::Leaf, TestState::Root, TestTrigger::Tick);
        assert!(t.retarget_source(TestState::Root).is_reentry());
    }
}
