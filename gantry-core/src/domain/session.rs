//! Session lifecycle events
//!
//! One compute session emits a stream of named notifications while it
//! boots, runs and tears down. The engine only consumes the five listed
//! here; anything else on the wire is skipped by the subscriber.

/// A lifecycle notification delivered on a session's event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The service is pulling the container image
    KernelPulling { session_name: String },
    /// The session entered the running state
    SessionStarted { session_name: String },
    /// The batch task finished with a zero exit status
    SessionSuccess { session_name: String },
    /// The batch task finished with a non-zero exit status
    SessionFailure { session_name: String },
    /// The session is fully torn down; always the last event of a run
    SessionTerminated { session_name: String },
}

impl SessionEvent {
    /// Wire name of this event on the event stream
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::KernelPulling { .. } => "kernel_pulling",
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::SessionSuccess { .. } => "session_success",
            SessionEvent::SessionFailure { .. } => "session_failure",
            SessionEvent::SessionTerminated { .. } => "session_terminated",
        }
    }

    /// The session name carried by the event
    pub fn session_name(&self) -> &str {
        match self {
            SessionEvent::KernelPulling { session_name }
            | SessionEvent::SessionStarted { session_name }
            | SessionEvent::SessionSuccess { session_name }
            | SessionEvent::SessionFailure { session_name }
            | SessionEvent::SessionTerminated { session_name } => session_name,
        }
    }

    /// Build an event from its wire name, if it is one the engine consumes
    pub fn from_wire(event: &str, session_name: String) -> Option<Self> {
        match event {
            "kernel_pulling" => Some(SessionEvent::KernelPulling { session_name }),
            "session_started" => Some(SessionEvent::SessionStarted { session_name }),
            "session_success" => Some(SessionEvent::SessionSuccess { session_name }),
            "session_failure" => Some(SessionEvent::SessionFailure { session_name }),
            "session_terminated" => Some(SessionEvent::SessionTerminated { session_name }),
            _ => None,
        }
    }
}
