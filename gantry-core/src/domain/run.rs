//! Run bookkeeping types
//!
//! `RunQueue` is the ordered backlog of components awaiting launch during a
//! whole-pipeline run; `ExecutionContext` is the ephemeral handle for one
//! in-flight session. Neither type is ever persisted.

use std::collections::VecDeque;
use uuid::Uuid;

/// Ordered backlog of component ids still to be launched
///
/// Consumed one id at a time, and only after the previous launch's terminal
/// event has fired.
#[derive(Debug, Clone, Default)]
pub struct RunQueue {
    ids: VecDeque<Uuid>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents with the given ids, in order
    pub fn seed(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.ids = ids.into_iter().collect();
    }

    /// Take the next id to launch
    pub fn pop(&mut self) -> Option<Uuid> {
        self.ids.pop_front()
    }

    /// Drop every remaining id
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Ephemeral handle for one running session
///
/// Created when a session is requested and discarded once its terminal
/// event has been fully handled.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub session_id: String,
    pub session_name: String,
    /// Session-internal kernel id, used to fetch task logs
    pub kernel_id: String,
    /// Array index of the component this session runs
    pub node_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_pops_in_seed_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut queue = RunQueue::new();
        queue.seed([a, b]);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(a));
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_clear() {
        let mut queue = RunQueue::new();
        queue.seed([Uuid::new_v4(), Uuid::new_v4()]);
        queue.clear();
        assert!(queue.is_empty());
    }
}
