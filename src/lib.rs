//! Substate: a hierarchical state machine execution core.
//!
//! Substate executes transitions against a tree of states: every state may
//! nest substates, and the engine guarantees a deterministic order of
//! lifecycle callbacks across the hierarchy: exit and deactivate run
//! leaf-to-root, entry and activate run root-to-leaf, and every callback's
//! unit-of-work completes before the next one starts, even when the
//! callback suspends on asynchronous work.
//!
//! The crate deliberately stops at execution: deciding *which* transition
//! to fire (guards, trigger tables, parameter binding) belongs to the
//! caller, who hands the engine an already resolved [`Transition`].
//!
//! # Core Concepts
//!
//! - **State tree**: states declared with [`StateTreeBuilder`], nested via
//!   superstate/substate links
//! - **Lifecycle actions**: per-state entry, exit, activate, and deactivate
//!   callbacks, run in declaration order
//! - **Internal triggers**: handlers that run without a state change,
//!   resolved by walking up the superstate chain
//! - **Machine**: a built tree plus a current-state cursor, executing one
//!   resolved transition at a time
//!
//! # Example
//!
//! ```rust
//! use substate::{state_enum, trigger_enum, Machine, StateTreeBuilder};
//!
//! state_enum! {
//!     enum Phone {
//!         Idle,
//!         Connected,
//!         OnHold,
//!         Talking,
//!     }
//! }
//!
//! trigger_enum! {
//!     enum Call {
//!         Dialed,
//!         PlacedOnHold,
//!     }
//! }
//!
//! let tree = StateTreeBuilder::<Phone, Call>::new()
//!     .state(Phone::Idle)
//!     .state(Phone::Connected)
//!     .substate(Phone::Talking, Phone::Connected)
//!     .substate(Phone::OnHold, Phone::Connected)
//!     .build()
//!     .unwrap();
//!
//! // Talking and OnHold are nested inside Connected.
//! let talking = tree.id_of(&Phone::Talking).unwrap();
//! assert!(tree.is_included_in(talking, &Phone::Connected));
//!
//! let machine = Machine::new(tree, &Phone::Idle).unwrap();
//! assert!(machine.is_in(&Phone::Idle));
//! ```
//!
//! Transitions and lifecycle actions are async; see [`Machine::execute`]
//! and the [`builder`] module for registering callbacks.

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateTreeBuilder};
pub use core::{
    ActionDescription, ActionError, ActionResult, State, StateId, StateTree, Transition,
    TraversalError, Trigger,
};
pub use machine::{ExecutionError, Machine};
