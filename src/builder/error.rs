//! Build errors for state tree construction.

use thiserror::Error;

/// Errors that can occur when building a state tree.
///
/// All construction problems surface here, at `.build()` time; the
/// execution core never re-validates the tree.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no states declared. Declare at least one state before .build()")]
    NoStates,

    #[error("state '{0}' declared more than once")]
    DuplicateState(String),

    #[error("superstate '{superstate}' of state '{state}' is not declared. Declare it with .state() or .substate()")]
    UnknownSuperstate { state: String, superstate: String },

    #[error("state '{0}' is not declared. Declare it before registering actions on it")]
    UnknownState(String),

    #[error("superstate chain of state '{0}' forms a cycle")]
    SuperstateCycle(String),

    #[error("internal handler for trigger '{trigger}' on state '{state}' registered more than once")]
    DuplicateInternalHandler { state: String, trigger: String },
}
