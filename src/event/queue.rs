use std::collections::VecDeque;

use crate::event::Event;
use crate::tool::ToolId;

/// FIFO of events waiting to be applied, each addressed to one tool.
///
/// A single queue keeps generation order across all tools, which implies
/// per-tool FIFO order.
pub struct EventQueue {
    pending: VecDeque<(ToolId, Event)>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &format!("<{} events>", self.pending.len()))
            .finish()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Queue an event for a tool
    pub fn push(&mut self, target: ToolId, event: Event) {
        self.pending.push_back((target, event));
    }

    /// Take the oldest queued event
    pub fn pop(&mut self) -> Option<(ToolId, Event)> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything still queued for `target`
    pub fn discard_for(&mut self, target: ToolId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(tool, _)| *tool != target);
        before - self.pending.len()
    }

    /// Events still queued for `target`, oldest first
    pub fn pending_for(&self, target: ToolId) -> impl Iterator<Item = &Event> + '_ {
        self.pending
            .iter()
            .filter(move |(tool, _)| *tool == target)
            .map(|(_, event)| event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_per_tool() {
        let mut queue = EventQueue::new();
        let a = ToolId(0);
        let b = ToolId(1);
        queue.push(a, Event::mouse_moved(1, 1, 1, 1));
        queue.push(b, Event::mouse_moved(9, 9, 0, 0));
        queue.push(a, Event::mouse_moved(2, 2, 1, 1));

        let for_a: Vec<_> = queue.pending_for(a).copied().collect();
        assert_eq!(
            for_a,
            vec![Event::mouse_moved(1, 1, 1, 1), Event::mouse_moved(2, 2, 1, 1)]
        );

        assert_eq!(queue.pop(), Some((a, Event::mouse_moved(1, 1, 1, 1))));
        assert_eq!(queue.pop(), Some((b, Event::mouse_moved(9, 9, 0, 0))));
        assert_eq!(queue.pop(), Some((a, Event::mouse_moved(2, 2, 1, 1))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_discard_for_tool() {
        let mut queue = EventQueue::new();
        queue.push(ToolId(0), Event::NoEvent);
        queue.push(ToolId(1), Event::NoEvent);
        queue.push(ToolId(0), Event::NoEvent);

        assert_eq!(queue.discard_for(ToolId(0)), 2);
        assert_eq!(queue.len(), 1);
    }
}
