//! Lifecycle action behaviours.
//!
//! Each declared state owns ordered lists of behaviours, one list per kind
//! (entry, exit, activate, deactivate) plus a trigger-keyed map of internal
//! handlers. A behaviour wraps the user callback together with a
//! description used only for diagnostics. Kinds differ in the arguments the
//! callback receives, so each kind is its own strongly-typed struct rather
//! than a variant of a polymorphic action.
//!
//! Every callback yields a unit-of-work (a [`BoxFuture`]); the traversal
//! awaits each unit to completion before starting the next, so actions in
//! one list never overlap.

use crate::core::state::{State, Trigger};
use crate::core::transition::Transition;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure returned by a user-supplied action callback.
///
/// Carries a message only; the traversal wraps it with the state, action
/// description, and phase it failed in (see [`TraversalError`]).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ActionError(String);

impl ActionError {
    /// Create an action failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Result of one action unit-of-work.
pub type ActionResult = Result<(), ActionError>;

/// Which lifecycle list an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Entry,
    Exit,
    Activate,
    Deactivate,
    Internal,
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

/// Errors raised while executing a traversal.
///
/// A failed action abandons the remaining actions in its list and any
/// further ancestor traversal; actions already run are not rolled back.
#[derive(Debug, Clone, Error)]
pub enum TraversalError {
    #[error("{phase} action '{action}' failed in state '{state}': {message}")]
    ActionFailed {
        phase: ActionPhase,
        action: String,
        state: String,
        message: String,
    },
}

/// Diagnostic name attached to a registered action.
///
/// Purely descriptive: it appears in failure messages and trace events,
/// never in execution decisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDescription {
    name: String,
}

impl ActionDescription {
    /// Create a description from a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for ActionDescription {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ActionDescription {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ActionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Callback for entry actions and internal handlers: receives the resolved
/// transition and the arguments supplied when the trigger fired.
pub type TriggeredCallback<S, T, A> =
    Arc<dyn Fn(Transition<S, T>, A) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// Callback for exit actions: receives the resolved transition only.
pub type ExitCallback<S, T> =
    Arc<dyn Fn(Transition<S, T>) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// Callback for activate/deactivate actions: receives nothing.
pub type LifecycleCallback = Arc<dyn Fn() -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// Entry action behaviour, optionally filtered to a single trigger.
///
/// A filtered behaviour whose filter does not match the transition's trigger
/// completes immediately as a no-op unit-of-work.
pub struct EntryAction<S: State, T: Trigger, A> {
    callback: TriggeredCallback<S, T, A>,
    description: ActionDescription,
    trigger_filter: Option<T>,
}

impl<S: State, T: Trigger, A> EntryAction<S, T, A> {
    pub fn new(
        callback: TriggeredCallback<S, T, A>,
        description: ActionDescription,
        trigger_filter: Option<T>,
    ) -> Self {
        Self {
            callback,
            description,
            trigger_filter,
        }
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }
}

impl<S: State, T: Trigger, A: Clone> EntryAction<S, T, A> {
    /// Execute the behaviour for `transition`, yielding its unit-of-work.
    pub fn execute(&self, transition: &Transition<S, T>, args: &A) -> BoxFuture<'static, ActionResult> {
        match &self.trigger_filter {
            Some(filter) if filter != transition.trigger() => {
                futures::future::ready(Ok(())).boxed()
            }
            _ => (self.callback)(transition.clone(), args.clone()),
        }
    }
}

impl<S: State, T: Trigger, A> Clone for EntryAction<S, T, A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            description: self.description.clone(),
            trigger_filter: self.trigger_filter.clone(),
        }
    }
}

/// Exit action behaviour.
pub struct ExitAction<S: State, T: Trigger> {
    callback: ExitCallback<S, T>,
    description: ActionDescription,
}

impl<S: State, T: Trigger> ExitAction<S, T> {
    pub fn new(callback: ExitCallback<S, T>, description: ActionDescription) -> Self {
        Self {
            callback,
            description,
        }
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }

    pub fn execute(&self, transition: &Transition<S, T>) -> BoxFuture<'static, ActionResult> {
        (self.callback)(transition.clone())
    }
}

impl<S: State, T: Trigger> Clone for ExitAction<S, T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            description: self.description.clone(),
        }
    }
}

/// Activate action behaviour.
pub struct ActivateAction {
    callback: LifecycleCallback,
    description: ActionDescription,
}

impl ActivateAction {
    pub fn new(callback: LifecycleCallback, description: ActionDescription) -> Self {
        Self {
            callback,
            description,
        }
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }

    pub fn execute(&self) -> BoxFuture<'static, ActionResult> {
        (self.callback)()
    }
}

impl Clone for ActivateAction {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            description: self.description.clone(),
        }
    }
}

/// Deactivate action behaviour.
pub struct DeactivateAction {
    callback: LifecycleCallback,
    description: ActionDescription,
}

impl DeactivateAction {
    pub fn new(callback: LifecycleCallback, description: ActionDescription) -> Self {
        Self {
            callback,
            description,
        }
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }

    pub fn execute(&self) -> BoxFuture<'static, ActionResult> {
        (self.callback)()
    }
}

impl Clone for DeactivateAction {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            description: self.description.clone(),
        }
    }
}

/// Internal-trigger handler behaviour.
///
/// Executed in place of a state change when a trigger is declared internal;
/// never touches entry/exit/activation lifecycles.
pub struct InternalHandler<S: State, T: Trigger, A> {
    callback: TriggeredCallback<S, T, A>,
    description: ActionDescription,
}

impl<S: State, T: Trigger, A> InternalHandler<S, T, A> {
    pub fn new(callback: TriggeredCallback<S, T, A>, description: ActionDescription) -> Self {
        Self {
            callback,
            description,
        }
    }

    pub fn description(&self) -> &ActionDescription {
        &self.description
    }
}

impl<S: State, T: Trigger, A: Clone> InternalHandler<S, T, A> {
    pub fn execute(&self, transition: &Transition<S, T>, args: &A) -> BoxFuture<'static, ActionResult> {
        (self.callback)(transition.clone(), args.clone())
    }
}

impl<S: State, T: Trigger, A> Clone for InternalHandler<S, T, A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            description: self.description.clone(),
        }
    }
}
