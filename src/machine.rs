//! Machine composition: executing resolved transitions against the tree.
//!
//! The machine does not decide transitions; trigger selection, guard
//! evaluation, and parameter binding live upstream. Given an already
//! resolved [`Transition`], [`Machine::execute`] drives the exit walk on the
//! current representation, feeds the rewritten transition into the enter
//! walk on the destination, and moves the current-state cursor.

use crate::core::{State, StateId, StateTree, Transition, TraversalError, Trigger};
use thiserror::Error;
use tracing::trace;

/// Errors raised when executing transitions against a machine.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A transition named a state label the tree does not declare.
    #[error("state '{0}' is not declared in this machine")]
    UnknownState(String),

    /// An action failed mid-traversal. The machine may be left with
    /// partially applied lifecycle state; see [`Machine::execute`].
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

/// A state machine instance: a built [`StateTree`] plus the current state.
///
/// One instance processes one transition at a time; the `&mut self`
/// receivers on the mutating operations make concurrent firing a compile
/// error rather than a data race.
pub struct Machine<S: State, T: Trigger, A = ()> {
    tree: StateTree<S, T, A>,
    current: StateId,
}

impl<S, T, A> Machine<S, T, A>
where
    S: State + 'static,
    T: Trigger + 'static,
    A: Clone + Send + Sync + 'static,
{
    /// Create a machine positioned at `initial`.
    pub fn new(tree: StateTree<S, T, A>, initial: &S) -> Result<Self, ExecutionError> {
        let current = tree
            .id_of(initial)
            .ok_or_else(|| ExecutionError::UnknownState(initial.name().to_string()))?;
        Ok(Self { tree, current })
    }

    /// The current state label.
    pub fn state(&self) -> &S {
        self.tree.state(self.current)
    }

    /// True when the machine is in `state`, directly or via a substate:
    /// the current state and all of its ancestors count.
    pub fn is_in(&self, state: &S) -> bool {
        self.tree.is_included_in(self.current, state)
    }

    /// The underlying state tree.
    pub fn tree(&self) -> &StateTree<S, T, A> {
        &self.tree
    }

    /// Execute a resolved transition: exit the current representation,
    /// enter the destination with the rewritten transition the exit walk
    /// produced, then move the cursor to the destination.
    ///
    /// If an action fails, the error surfaces unchanged, the cursor does
    /// not move, and any actions already run are not rolled back; the
    /// `active` flags and the caller's own side effects may reflect a
    /// partially applied transition. Treating that as fatal to the machine
    /// instance is the caller's decision.
    pub async fn execute(
        &mut self,
        transition: Transition<S, T>,
        args: A,
    ) -> Result<(), ExecutionError> {
        let destination = self.tree.id_of(transition.destination()).ok_or_else(|| {
            ExecutionError::UnknownState(transition.destination().name().to_string())
        })?;

        trace!(
            source = transition.source().name(),
            destination = transition.destination().name(),
            trigger = transition.trigger().name(),
            "executing transition"
        );

        let rewritten = self.tree.exit(self.current, transition).await?;
        self.tree.enter(destination, &rewritten, &args).await?;
        self.current = destination;
        Ok(())
    }

    /// Dispatch an internal trigger at the current state: the handler walk
    /// goes up the superstate chain and the state never changes.
    pub async fn fire_internal(&self, trigger: T, args: A) -> Result<(), ExecutionError> {
        let state = self.tree.state(self.current).clone();
        let transition = Transition::new(state.clone(), state, trigger);
        self.tree
            .internal_action(self.current, &transition, &args)
            .await?;
        Ok(())
    }

    /// Activate the current state and its ancestors, root first.
    pub async fn activate(&mut self) -> Result<(), ExecutionError> {
        let current = self.current;
        self.tree.activate(current).await?;
        Ok(())
    }

    /// Deactivate the current state and its ancestors, leaf first.
    pub async fn deactivate(&mut self) -> Result<(), ExecutionError> {
        let current = self.current;
        self.tree.deactivate(current).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateTreeBuilder;
    use crate::core::ActionResult;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};

    crate::state_enum! {
        enum Media {
            Player,
            Stopped,
            Active,
            Playing,
            Paused,
        }
    }

    crate::trigger_enum! {
        enum Control {
            Play,
            Pause,
            Stop,
            VolumeUp,
        }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn log_entry(
        log: &Log,
        label: &str,
    ) -> impl Fn(Transition<Media, Control>, ()) -> futures::future::BoxFuture<'static, ActionResult>
           + Send
           + Sync
           + 'static {
        let log = Arc::clone(log);
        let label = label.to_string();
        move |_transition, _args| {
            let log = Arc::clone(&log);
            let label = label.clone();
            async move {
                log.lock().unwrap().push(label);
                Ok(())
            }
            .boxed()
        }
    }

    fn log_exit(
        log: &Log,
        label: &str,
    ) -> impl Fn(Transition<Media, Control>) -> futures::future::BoxFuture<'static, ActionResult>
           + Send
           + Sync
           + 'static {
        let log = Arc::clone(log);
        let label = label.to_string();
        move |_transition| {
            let log = Arc::clone(&log);
            let label = label.clone();
            async move {
                log.lock().unwrap().push(label);
                Ok(())
            }
            .boxed()
        }
    }

    /// Player -> { Stopped, Active -> { Playing, Paused } }
    fn media_machine(log: &Log) -> Machine<Media, Control> {
        let mut builder = StateTreeBuilder::new()
            .state(Media::Player)
            .substate(Media::Stopped, Media::Player)
            .substate(Media::Active, Media::Player)
            .substate(Media::Playing, Media::Active)
            .substate(Media::Paused, Media::Active);

        let all = [
            (Media::Player, "Player"),
            (Media::Stopped, "Stopped"),
            (Media::Active, "Active"),
            (Media::Playing, "Playing"),
            (Media::Paused, "Paused"),
        ];
        for (state, name) in all {
            builder = builder
                .on_entry(
                    state.clone(),
                    log_entry(log, &format!("enter {name}")),
                    "log entry",
                )
                .on_exit(state, log_exit(log, &format!("exit {name}")), "log exit");
        }

        Machine::new(builder.build().unwrap(), &Media::Stopped).unwrap()
    }

    #[tokio::test]
    async fn execute_moves_the_cursor() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut machine = media_machine(&log);
        assert_eq!(machine.state(), &Media::Stopped);

        machine
            .execute(
                Transition::new(Media::Stopped, Media::Playing, Control::Play),
                (),
            )
            .await
            .unwrap();

        assert_eq!(machine.state(), &Media::Playing);
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["exit Stopped", "enter Active", "enter Playing"]
        );
    }

    #[tokio::test]
    async fn transition_within_a_superstate_leaves_it_alone() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut machine = media_machine(&log);

        machine
            .execute(
                Transition::new(Media::Stopped, Media::Playing, Control::Play),
                (),
            )
            .await
            .unwrap();
        log.lock().unwrap().clear();

        machine
            .execute(
                Transition::new(Media::Playing, Media::Paused, Control::Pause),
                (),
            )
            .await
            .unwrap();

        // Active contains both Playing and Paused, so it is neither exited
        // nor re-entered.
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["exit Playing", "enter Paused"]
        );
        assert!(machine.is_in(&Media::Active));
    }

    #[tokio::test]
    async fn is_in_counts_ancestors() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let machine = media_machine(&log);

        assert!(machine.is_in(&Media::Stopped));
        assert!(machine.is_in(&Media::Player));
        assert!(!machine.is_in(&Media::Active));
    }

    #[tokio::test]
    async fn unknown_destination_is_rejected_before_any_action_runs() {
        let tree = StateTreeBuilder::<Media, Control>::new()
            .state(Media::Player)
            .substate(Media::Stopped, Media::Player)
            .build()
            .unwrap();
        let mut machine = Machine::new(tree, &Media::Stopped).unwrap();

        let err = machine
            .execute(
                Transition::new(Media::Stopped, Media::Playing, Control::Play),
                (),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::UnknownState(name) if name == "Playing"));
        assert_eq!(machine.state(), &Media::Stopped);
    }

    #[tokio::test]
    async fn unknown_initial_state_is_rejected() {
        let tree = StateTreeBuilder::<Media, Control>::new()
            .state(Media::Player)
            .build()
            .unwrap();

        let result = Machine::new(tree, &Media::Playing);
        assert!(matches!(result, Err(ExecutionError::UnknownState(name)) if name == "Playing"));
    }

    #[tokio::test]
    async fn fire_internal_never_changes_state() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let volume = Arc::clone(&log);
        let tree = StateTreeBuilder::<Media, Control>::new()
            .state(Media::Player)
            .substate(Media::Active, Media::Player)
            .substate(Media::Playing, Media::Active)
            .on_entry(
                Media::Playing,
                log_entry(&log, "enter Playing"),
                "log entry",
            )
            .on_internal(
                Media::Active,
                Control::VolumeUp,
                move |_transition, _args| {
                    let volume = Arc::clone(&volume);
                    async move {
                        volume.lock().unwrap().push("volume up".to_string());
                        Ok(())
                    }
                    .boxed()
                },
                "volume handler",
            )
            .build()
            .unwrap();
        let machine = Machine::new(tree, &Media::Playing).unwrap();

        machine.fire_internal(Control::VolumeUp, ()).await.unwrap();

        assert_eq!(machine.state(), &Media::Playing);
        assert_eq!(log.lock().unwrap().as_slice(), ["volume up"]);
    }

    #[tokio::test]
    async fn activate_and_deactivate_follow_the_current_state() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut machine = media_machine(&log);

        machine.activate().await.unwrap();
        let stopped = machine.tree().id_of(&Media::Stopped).unwrap();
        let player = machine.tree().id_of(&Media::Player).unwrap();
        assert!(machine.tree().is_active(stopped));
        assert!(machine.tree().is_active(player));

        machine.deactivate().await.unwrap();
        assert!(!machine.tree().is_active(stopped));
        assert!(!machine.tree().is_active(player));
    }
}
