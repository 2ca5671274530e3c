//! State representations and the hierarchy traversal algorithms.
//!
//! The hierarchy is stored as an arena: [`StateTree`] owns a vector of
//! nodes addressed by [`StateId`], and each node records its superstate id,
//! its substate ids, its `active` flag, and its lifecycle action lists.
//! Parent links are plain indices, so the parent/child relation carries no
//! ownership in either direction.
//!
//! Ordering invariants implemented here:
//!
//! - exit and deactivate walk leaf-to-root
//! - entry and activate walk root-to-leaf
//! - within one state, deactivate runs before exit on the way out and entry
//!   runs before activate on the way in
//! - every action list runs in declaration order, each unit-of-work awaited
//!   to completion before the next begins
//!
//! The tree's shape and action lists are immutable once built; only the
//! `active` flags mutate, and only through [`StateTree::activate`] and
//! [`StateTree::deactivate`].

use crate::core::action::{
    ActionDescription, ActionError, ActionPhase, ActivateAction, DeactivateAction, EntryAction,
    ExitAction, InternalHandler, TraversalError,
};
use crate::core::state::{State, Trigger};
use crate::core::transition::Transition;
use futures::future::BoxFuture;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Opaque index of one state representation within its tree.
///
/// Ids are only produced by the tree that owns the node, so indexing with a
/// foreign id is a construction bug, not a runtime condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) usize);

/// One node of the hierarchy: a declared state plus its lifecycle lists.
pub(crate) struct StateNode<S: State, T: Trigger, A> {
    pub(crate) state: S,
    pub(crate) superstate: Option<StateId>,
    pub(crate) substates: Vec<StateId>,
    pub(crate) active: bool,
    pub(crate) entry_actions: Vec<EntryAction<S, T, A>>,
    pub(crate) exit_actions: Vec<ExitAction<S, T>>,
    pub(crate) activate_actions: Vec<ActivateAction>,
    pub(crate) deactivate_actions: Vec<DeactivateAction>,
    pub(crate) internal_handlers: HashMap<T, InternalHandler<S, T, A>>,
}

/// Arena of state representations for one machine.
///
/// Built by [`StateTreeBuilder`](crate::builder::StateTreeBuilder) and
/// read-only afterwards except for the per-node `active` flags.
pub struct StateTree<S: State, T: Trigger, A = ()> {
    nodes: Vec<StateNode<S, T, A>>,
    ids: HashMap<S, StateId>,
}

impl<S: State, T: Trigger, A> StateTree<S, T, A> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Insert a parentless node for `state`. The builder guarantees the
    /// label is not already present.
    pub(crate) fn insert(&mut self, state: S) -> StateId {
        let id = StateId(self.nodes.len());
        self.ids.insert(state.clone(), id);
        self.nodes.push(StateNode {
            state,
            superstate: None,
            substates: Vec::new(),
            active: false,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            activate_actions: Vec::new(),
            deactivate_actions: Vec::new(),
            internal_handlers: HashMap::new(),
        });
        id
    }

    /// Wire `child` under `superstate`.
    pub(crate) fn link(&mut self, child: StateId, superstate: StateId) {
        self.nodes[child.0].superstate = Some(superstate);
        self.nodes[superstate.0].substates.push(child);
    }

    pub(crate) fn add_entry_action(&mut self, id: StateId, action: EntryAction<S, T, A>) {
        self.nodes[id.0].entry_actions.push(action);
    }

    pub(crate) fn add_exit_action(&mut self, id: StateId, action: ExitAction<S, T>) {
        self.nodes[id.0].exit_actions.push(action);
    }

    pub(crate) fn add_activate_action(&mut self, id: StateId, action: ActivateAction) {
        self.nodes[id.0].activate_actions.push(action);
    }

    pub(crate) fn add_deactivate_action(&mut self, id: StateId, action: DeactivateAction) {
        self.nodes[id.0].deactivate_actions.push(action);
    }

    /// Register the internal handler for `trigger`. Returns false when a
    /// handler for the trigger is already present.
    pub(crate) fn add_internal_handler(
        &mut self,
        id: StateId,
        trigger: T,
        handler: InternalHandler<S, T, A>,
    ) -> bool {
        let handlers = &mut self.nodes[id.0].internal_handlers;
        if handlers.contains_key(&trigger) {
            return false;
        }
        handlers.insert(trigger, handler);
        true
    }

    /// Resolve a state label to its representation.
    pub fn id_of(&self, state: &S) -> Option<StateId> {
        self.ids.get(state).copied()
    }

    /// The label of the representation `id`.
    pub fn state(&self, id: StateId) -> &S {
        &self.nodes[id.0].state
    }

    /// The superstate of `id`, if any.
    pub fn superstate(&self, id: StateId) -> Option<StateId> {
        self.nodes[id.0].superstate
    }

    /// Whether `id` currently holds activated status.
    pub fn is_active(&self, id: StateId) -> bool {
        self.nodes[id.0].active
    }

    /// Number of declared states.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no states are declared.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True iff `state` is this representation's own state or any
    /// descendant's (transitive downward closure).
    pub fn includes(&self, id: StateId, state: &S) -> bool {
        let node = &self.nodes[id.0];
        node.state == *state
            || node
                .substates
                .iter()
                .any(|child| self.includes(*child, state))
    }

    /// True iff `state` is this representation's own state or any
    /// ancestor's (transitive upward closure). Dual of [`Self::includes`].
    pub fn is_included_in(&self, id: StateId, state: &S) -> bool {
        let node = &self.nodes[id.0];
        node.state == *state
            || node
                .superstate
                .is_some_and(|parent| self.is_included_in(parent, state))
    }

    /// The handler declared locally on `id` for `trigger`, if any.
    pub(crate) fn local_handler(&self, id: StateId, trigger: &T) -> Option<&InternalHandler<S, T, A>> {
        self.nodes[id.0].internal_handlers.get(trigger)
    }

    /// Walk from `id` toward the root looking for an internal handler.
    pub(crate) fn find_handler(
        &self,
        id: StateId,
        trigger: &T,
    ) -> Option<(StateId, &InternalHandler<S, T, A>)> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(handler) = self.local_handler(current, trigger) {
                return Some((current, handler));
            }
            cursor = self.nodes[current.0].superstate;
        }
        None
    }

    fn fail(
        &self,
        id: StateId,
        phase: ActionPhase,
        action: &ActionDescription,
        err: ActionError,
    ) -> TraversalError {
        TraversalError::ActionFailed {
            phase,
            action: action.name().to_string(),
            state: self.nodes[id.0].state.name().to_string(),
            message: err.to_string(),
        }
    }
}

impl<S, T, A> StateTree<S, T, A>
where
    S: State + 'static,
    T: Trigger + 'static,
    A: Clone + Send + Sync + 'static,
{
    /// Activate this representation: ancestors first, then, if the state
    /// was inactive, its activate actions in declaration order, then mark
    /// it active. Already-active states are a no-op, so repeated activation
    /// runs each state's actions exactly once.
    pub fn activate(&mut self, id: StateId) -> BoxFuture<'_, Result<(), TraversalError>> {
        Box::pin(async move {
            if let Some(superstate) = self.nodes[id.0].superstate {
                self.activate(superstate).await?;
            }

            if self.nodes[id.0].active {
                return Ok(());
            }

            trace!(state = self.nodes[id.0].state.name(), "activating state");
            self.run_activate_actions(id).await?;
            self.nodes[id.0].active = true;
            Ok(())
        })
    }

    /// Deactivate this representation: if the state is active, run its
    /// deactivate actions, mark it inactive, then deactivate the
    /// superstate (leaf-to-root).
    pub fn deactivate(&mut self, id: StateId) -> BoxFuture<'_, Result<(), TraversalError>> {
        Box::pin(async move {
            if !self.nodes[id.0].active {
                return Ok(());
            }

            trace!(state = self.nodes[id.0].state.name(), "deactivating state");
            self.run_deactivate_actions(id).await?;
            self.nodes[id.0].active = false;

            if let Some(superstate) = self.nodes[id.0].superstate {
                self.deactivate(superstate).await?;
            }
            Ok(())
        })
    }

    /// Enter this representation for `transition`.
    ///
    /// Reentry runs this state's entry then activate actions without
    /// touching ancestors. Otherwise, when this state does not already
    /// include the transition's source, the superstate is entered first and
    /// then this state's entry and activate actions run, yielding strict
    /// root-to-leaf ordering from below the least common ancestor down to
    /// the destination. A state that already includes the source was never
    /// left, so entering it again is a no-op.
    pub fn enter<'a>(
        &'a self,
        id: StateId,
        transition: &'a Transition<S, T>,
        args: &'a A,
    ) -> BoxFuture<'a, Result<(), TraversalError>> {
        Box::pin(async move {
            if transition.is_reentry() {
                trace!(state = self.nodes[id.0].state.name(), "reentering state");
                self.run_entry_actions(id, transition, args).await?;
                self.run_activate_actions(id).await?;
            } else if !self.includes(id, transition.source()) {
                if let Some(superstate) = self.nodes[id.0].superstate {
                    self.enter(superstate, transition, args).await?;
                }

                trace!(state = self.nodes[id.0].state.name(), "entering state");
                self.run_entry_actions(id, transition, args).await?;
                self.run_activate_actions(id).await?;
            }
            Ok(())
        })
    }

    /// Exit this representation for `transition`, yielding the transition
    /// the subsequent enter call must use.
    ///
    /// Reentry runs this state's deactivate then exit actions and returns
    /// the transition unchanged. Otherwise, when this state does not
    /// include the transition's destination it is left entirely: its
    /// deactivate and exit actions run, and the walk continues into the
    /// superstate with the source rewritten to the superstate's own state.
    /// A state that includes the destination is a common ancestor and must
    /// not be exited; the transition comes back untouched with zero actions
    /// run. The returned transition's source names the ancestor at which
    /// the walk stopped.
    pub fn exit(
        &self,
        id: StateId,
        transition: Transition<S, T>,
    ) -> BoxFuture<'_, Result<Transition<S, T>, TraversalError>> {
        Box::pin(async move {
            if transition.is_reentry() {
                trace!(state = self.nodes[id.0].state.name(), "exiting state for reentry");
                self.run_deactivate_actions(id).await?;
                self.run_exit_actions(id, &transition).await?;
                Ok(transition)
            } else if !self.includes(id, transition.destination()) {
                trace!(state = self.nodes[id.0].state.name(), "exiting state");
                self.run_deactivate_actions(id).await?;
                self.run_exit_actions(id, &transition).await?;

                match self.nodes[id.0].superstate {
                    Some(superstate) => {
                        let rewritten =
                            transition.retarget_source(self.nodes[superstate.0].state.clone());
                        self.exit(superstate, rewritten).await
                    }
                    None => Ok(transition),
                }
            } else {
                Ok(transition)
            }
        })
    }

    /// Dispatch an internal trigger: walk from this representation toward
    /// the root, execute the first handler declared for the trigger, and
    /// stop. Reaching the root without a handler completes as a no-op; the
    /// upstream handler table is trusted to make that unreachable.
    pub async fn internal_action(
        &self,
        id: StateId,
        transition: &Transition<S, T>,
        args: &A,
    ) -> Result<(), TraversalError> {
        match self.find_handler(id, transition.trigger()) {
            Some((owner, handler)) => handler
                .execute(transition, args)
                .await
                .map_err(|e| self.fail(owner, ActionPhase::Internal, handler.description(), e)),
            None => {
                debug!(
                    trigger = transition.trigger().name(),
                    state = self.nodes[id.0].state.name(),
                    "no internal handler found up the superstate chain; ignoring trigger"
                );
                Ok(())
            }
        }
    }

    async fn run_entry_actions(
        &self,
        id: StateId,
        transition: &Transition<S, T>,
        args: &A,
    ) -> Result<(), TraversalError> {
        for action in &self.nodes[id.0].entry_actions {
            action
                .execute(transition, args)
                .await
                .map_err(|e| self.fail(id, ActionPhase::Entry, action.description(), e))?;
        }
        Ok(())
    }

    async fn run_exit_actions(
        &self,
        id: StateId,
        transition: &Transition<S, T>,
    ) -> Result<(), TraversalError> {
        for action in &self.nodes[id.0].exit_actions {
            action
                .execute(transition)
                .await
                .map_err(|e| self.fail(id, ActionPhase::Exit, action.description(), e))?;
        }
        Ok(())
    }

    async fn run_activate_actions(&self, id: StateId) -> Result<(), TraversalError> {
        for action in &self.nodes[id.0].activate_actions {
            action
                .execute()
                .await
                .map_err(|e| self.fail(id, ActionPhase::Activate, action.description(), e))?;
        }
        Ok(())
    }

    async fn run_deactivate_actions(&self, id: StateId) -> Result<(), TraversalError> {
        for action in &self.nodes[id.0].deactivate_actions {
            action
                .execute()
                .await
                .map_err(|e| self.fail(id, ActionPhase::Deactivate, action.description(), e))?;
        }
        Ok(())
    }
}
