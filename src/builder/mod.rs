//! Builder API for constructing state trees.
//!
//! Construction is a distinct configuration phase: declarations and action
//! registrations are collected fluently and validated all at once in
//! [`StateTreeBuilder::build`], after which the tree's shape is frozen.

pub mod error;
pub mod macros;

pub use error::BuildError;

use crate::core::{
    ActionDescription, ActionResult, ActivateAction, DeactivateAction, EntryAction, ExitAction,
    InternalHandler, State, StateId, StateTree, Transition, Trigger,
};
use futures::future::BoxFuture;
use std::sync::Arc;

enum Registration<S: State, T: Trigger, A> {
    Entry {
        state: S,
        action: EntryAction<S, T, A>,
    },
    Exit {
        state: S,
        action: ExitAction<S, T>,
    },
    Activate {
        state: S,
        action: ActivateAction,
    },
    Deactivate {
        state: S,
        action: DeactivateAction,
    },
    Internal {
        state: S,
        trigger: T,
        handler: InternalHandler<S, T, A>,
    },
}

struct Declaration<S> {
    state: S,
    superstate: Option<S>,
}

/// Builder for constructing a [`StateTree`] with a fluent API.
///
/// Declaration and registration methods never fail; all validation happens
/// in [`Self::build`], the way the errors in [`BuildError`] describe.
///
/// # Example
///
/// ```rust
/// use substate::{state_enum, trigger_enum, StateTreeBuilder};
///
/// state_enum! {
///     enum Phase { Root, Idle, Busy }
/// }
/// trigger_enum! {
///     enum Event { Start }
/// }
///
/// let tree = StateTreeBuilder::<Phase, Event>::new()
///     .state(Phase::Root)
///     .substate(Phase::Idle, Phase::Root)
///     .substate(Phase::Busy, Phase::Root)
///     .build()
///     .unwrap();
///
/// let idle = tree.id_of(&Phase::Idle).unwrap();
/// assert!(tree.is_included_in(idle, &Phase::Root));
/// ```
pub struct StateTreeBuilder<S: State, T: Trigger, A = ()> {
    declarations: Vec<Declaration<S>>,
    registrations: Vec<Registration<S, T, A>>,
}

impl<S, T, A> StateTreeBuilder<S, T, A>
where
    S: State + 'static,
    T: Trigger + 'static,
    A: 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// Declare a root-level state.
    pub fn state(mut self, state: S) -> Self {
        self.declarations.push(Declaration {
            state,
            superstate: None,
        });
        self
    }

    /// Declare a state nested under `superstate`.
    pub fn substate(mut self, state: S, superstate: S) -> Self {
        self.declarations.push(Declaration {
            state,
            superstate: Some(superstate),
        });
        self
    }

    /// Append an entry action to `state`.
    ///
    /// The callback receives the resolved transition and the arguments the
    /// trigger was fired with.
    pub fn on_entry<F>(
        mut self,
        state: S,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn(Transition<S, T>, A) -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Entry {
            state,
            action: EntryAction::new(Arc::new(callback), description.into(), None),
        });
        self
    }

    /// Append an entry action to `state` that only runs when the
    /// transition was caused by `trigger`.
    pub fn on_entry_from<F>(
        mut self,
        state: S,
        trigger: T,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn(Transition<S, T>, A) -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Entry {
            state,
            action: EntryAction::new(Arc::new(callback), description.into(), Some(trigger)),
        });
        self
    }

    /// Append an exit action to `state`.
    pub fn on_exit<F>(
        mut self,
        state: S,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn(Transition<S, T>) -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Exit {
            state,
            action: ExitAction::new(Arc::new(callback), description.into()),
        });
        self
    }

    /// Append an activate action to `state`.
    pub fn on_activate<F>(
        mut self,
        state: S,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn() -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Activate {
            state,
            action: ActivateAction::new(Arc::new(callback), description.into()),
        });
        self
    }

    /// Append a deactivate action to `state`.
    pub fn on_deactivate<F>(
        mut self,
        state: S,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn() -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Deactivate {
            state,
            action: DeactivateAction::new(Arc::new(callback), description.into()),
        });
        self
    }

    /// Declare `trigger` internal for `state` and register its handler.
    ///
    /// Internal triggers run their handler without causing a state change
    /// or any entry/exit/activation side effects.
    pub fn on_internal<F>(
        mut self,
        state: S,
        trigger: T,
        callback: F,
        description: impl Into<ActionDescription>,
    ) -> Self
    where
        F: Fn(Transition<S, T>, A) -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::Internal {
            state,
            trigger,
            handler: InternalHandler::new(Arc::new(callback), description.into()),
        });
        self
    }

    /// Validate the declarations and registrations and build the tree.
    pub fn build(self) -> Result<StateTree<S, T, A>, BuildError> {
        if self.declarations.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut tree = StateTree::new();

        for declaration in &self.declarations {
            if tree.id_of(&declaration.state).is_some() {
                return Err(BuildError::DuplicateState(
                    declaration.state.name().to_string(),
                ));
            }
            tree.insert(declaration.state.clone());
        }

        for declaration in &self.declarations {
            let Some(superstate) = &declaration.superstate else {
                continue;
            };
            let child = tree
                .id_of(&declaration.state)
                .expect("declared state is present");
            let parent = tree
                .id_of(superstate)
                .ok_or_else(|| BuildError::UnknownSuperstate {
                    state: declaration.state.name().to_string(),
                    superstate: superstate.name().to_string(),
                })?;
            tree.link(child, parent);
        }

        self.check_cycles(&tree)?;

        for registration in self.registrations {
            match registration {
                Registration::Entry { state, action } => {
                    let id = resolve(&tree, &state)?;
                    tree.add_entry_action(id, action);
                }
                Registration::Exit { state, action } => {
                    let id = resolve(&tree, &state)?;
                    tree.add_exit_action(id, action);
                }
                Registration::Activate { state, action } => {
                    let id = resolve(&tree, &state)?;
                    tree.add_activate_action(id, action);
                }
                Registration::Deactivate { state, action } => {
                    let id = resolve(&tree, &state)?;
                    tree.add_deactivate_action(id, action);
                }
                Registration::Internal {
                    state,
                    trigger,
                    handler,
                } => {
                    let id = resolve(&tree, &state)?;
                    if !tree.add_internal_handler(id, trigger.clone(), handler) {
                        return Err(BuildError::DuplicateInternalHandler {
                            state: state.name().to_string(),
                            trigger: trigger.name().to_string(),
                        });
                    }
                }
            }
        }

        Ok(tree)
    }

    fn check_cycles(&self, tree: &StateTree<S, T, A>) -> Result<(), BuildError> {
        for declaration in &self.declarations {
            let start = tree
                .id_of(&declaration.state)
                .expect("declared state is present");
            let mut cursor = tree.superstate(start);
            let mut steps = 0;
            while let Some(current) = cursor {
                steps += 1;
                if steps > tree.len() {
                    return Err(BuildError::SuperstateCycle(
                        declaration.state.name().to_string(),
                    ));
                }
                cursor = tree.superstate(current);
            }
        }
        Ok(())
    }
}

fn resolve<S, T, A>(tree: &StateTree<S, T, A>, state: &S) -> Result<StateId, BuildError>
where
    S: State,
    T: Trigger,
{
    tree.id_of(state)
        .ok_or_else(|| BuildError::UnknownState(state.name().to_string()))
}

impl<S, T, A> Default for StateTreeBuilder<S, T, A>
where
    S: State + 'static,
    T: Trigger + 'static,
    A: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
