//! Lifecycle event interpreter
//!
//! An explicit state machine over one session's event stream:
//!
//! ```text
//! Subscribed -> Pulling -> Started -> Finished(outcome) -> Terminated(outcome)
//! ```
//!
//! `apply` is pure over the machine's state and returns the transition the
//! executor must act on, which keeps every step independently testable.
//! The terminal `session_terminated` event always fires last; when it
//! arrives without a preceding success or failure the run counts as failed.

use gantry_core::domain::session::SessionEvent;

/// Final outcome of one session run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

/// Where one subscription currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Subscribed,
    Pulling,
    Started,
    /// A terminal event arrived; waiting for `session_terminated`
    Finished(RunOutcome),
    /// The session is fully torn down
    Terminated(RunOutcome),
}

/// Effect the executor must perform after feeding the machine an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Informational only; show the message
    Notify(String),
    /// The run succeeded: mark the node executed and persist the graph
    MarkExecuted,
    /// The session is gone: archive logs, close the subscription and
    /// advance or clear the run queue
    ///
    /// `session_name` is the authoritative name carried by the terminal
    /// event; it is absent when the stream broke before delivering one.
    Finalize {
        outcome: RunOutcome,
        session_name: Option<String>,
    },
    /// Nothing to do
    Ignored,
}

/// State machine for one session subscription
#[derive(Debug)]
pub struct LifecycleMachine {
    state: RunState,
}

impl LifecycleMachine {
    pub fn new() -> Self {
        Self {
            state: RunState::Subscribed,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether the machine has consumed its terminal event
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, RunState::Terminated(_))
    }

    /// Feed one event and get the transition to perform
    pub fn apply(&mut self, event: &SessionEvent) -> Transition {
        if self.is_terminated() {
            return Transition::Ignored;
        }

        match event {
            SessionEvent::KernelPulling { session_name } => {
                self.state = RunState::Pulling;
                Transition::Notify(format!("Session {} is pulling its image", session_name))
            }
            SessionEvent::SessionStarted { session_name } => {
                self.state = RunState::Started;
                Transition::Notify(format!("Session {} started", session_name))
            }
            SessionEvent::SessionSuccess { .. } => {
                self.state = RunState::Finished(RunOutcome::Succeeded);
                Transition::MarkExecuted
            }
            SessionEvent::SessionFailure { session_name } => {
                self.state = RunState::Finished(RunOutcome::Failed);
                Transition::Notify(format!("Session {} reported a failure", session_name))
            }
            SessionEvent::SessionTerminated { session_name } => {
                let outcome = match self.state {
                    RunState::Finished(outcome) => outcome,
                    _ => RunOutcome::Failed,
                };
                self.state = RunState::Terminated(outcome);
                Transition::Finalize {
                    outcome,
                    session_name: Some(session_name.clone()),
                }
            }
        }
    }

    /// The stream broke or closed before `session_terminated`
    ///
    /// Treated as a terminated run with a failed outcome.
    pub fn interrupt(&mut self) -> Transition {
        if self.is_terminated() {
            return Transition::Ignored;
        }
        self.state = RunState::Terminated(RunOutcome::Failed);
        Transition::Finalize {
            outcome: RunOutcome::Failed,
            session_name: None,
        }
    }
}

impl Default for LifecycleMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> SessionEvent {
        SessionEvent::from_wire(name, "sess".to_string()).unwrap()
    }

    #[test]
    fn test_success_path() {
        let mut machine = LifecycleMachine::new();

        assert!(matches!(
            machine.apply(&event("kernel_pulling")),
            Transition::Notify(_)
        ));
        assert_eq!(machine.state(), RunState::Pulling);

        assert!(matches!(
            machine.apply(&event("session_started")),
            Transition::Notify(_)
        ));
        assert_eq!(machine.state(), RunState::Started);

        assert_eq!(machine.apply(&event("session_success")), Transition::MarkExecuted);
        assert_eq!(machine.state(), RunState::Finished(RunOutcome::Succeeded));

        assert_eq!(
            machine.apply(&event("session_terminated")),
            Transition::Finalize {
                outcome: RunOutcome::Succeeded,
                session_name: Some("sess".to_string()),
            }
        );
        assert!(machine.is_terminated());
    }

    #[test]
    fn test_failure_path() {
        let mut machine = LifecycleMachine::new();
        machine.apply(&event("session_started"));

        assert!(matches!(
            machine.apply(&event("session_failure")),
            Transition::Notify(_)
        ));
        assert!(matches!(
            machine.apply(&event("session_terminated")),
            Transition::Finalize {
                outcome: RunOutcome::Failed,
                ..
            }
        ));
    }

    #[test]
    fn test_terminated_without_verdict_counts_as_failed() {
        let mut machine = LifecycleMachine::new();

        assert!(matches!(
            machine.apply(&event("session_terminated")),
            Transition::Finalize {
                outcome: RunOutcome::Failed,
                ..
            }
        ));
    }

    #[test]
    fn test_events_after_termination_are_ignored() {
        let mut machine = LifecycleMachine::new();
        machine.apply(&event("session_success"));
        machine.apply(&event("session_terminated"));

        assert_eq!(machine.apply(&event("session_started")), Transition::Ignored);
        assert_eq!(machine.state(), RunState::Terminated(RunOutcome::Succeeded));
    }

    #[test]
    fn test_interrupt_before_termination_fails_the_run() {
        let mut machine = LifecycleMachine::new();
        machine.apply(&event("session_started"));

        assert_eq!(
            machine.interrupt(),
            Transition::Finalize {
                outcome: RunOutcome::Failed,
                session_name: None,
            }
        );
        assert!(machine.is_terminated());
        assert_eq!(machine.interrupt(), Transition::Ignored);
    }
}
