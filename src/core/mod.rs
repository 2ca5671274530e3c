//! Core execution engine: state representations and traversal.
//!
//! This module contains the algorithmic heart of the crate:
//! - Label traits for states and triggers
//! - Resolved [`Transition`] values
//! - Lifecycle action behaviours and their unit-of-work execution
//! - The arena-backed [`StateTree`] with the enter/exit and
//!   activate/deactivate traversal algorithms
//!
//! Everything here executes transitions; deciding them (guards, trigger
//! resolution) is the caller's concern.

mod action;
mod representation;
mod state;
mod transition;

pub use action::{
    ActionDescription, ActionError, ActionPhase, ActionResult, ActivateAction, DeactivateAction,
    EntryAction, ExitAction, ExitCallback, InternalHandler, LifecycleCallback, TraversalError,
    TriggeredCallback,
};
pub use representation::{StateId, StateTree};
pub use state::{State, Trigger};
pub use transition::Transition;
