//! Fixed-capacity, time-sorted queue of pending action-list dispatches.

use antares_core::action::ActionId;
use antares_core::handle::Handle;
use tracing::warn;

pub const QUEUE_CAPACITY: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedDispatch {
    pub scheduled_time: i64,
    pub actions: [Option<ActionId>; 1],
    pub subject: Handle,
    pub subject_id_at_enqueue: u16,
    pub direct: Handle,
    pub direct_id_at_enqueue: u16,
}

pub struct ActionQueue {
    slots: Vec<Option<QueuedDispatch>>,
}

impl ActionQueue {
    pub fn new() -> ActionQueue {
        ActionQueue { slots: vec![None; QUEUE_CAPACITY] }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a dispatch; returns false (no effect) if the queue is full.
    pub fn enqueue(&mut self, dispatch: QueuedDispatch) -> bool {
        match self.slots.iter().position(|s| s.is_none()) {
            Some(idx) => {
                self.slots[idx] = Some(dispatch);
                true
            }
            None => {
                warn!("action queue full ({} slots); dropping dispatch", QUEUE_CAPACITY);
                false
            }
        }
    }

    /// Decrement every slot's `scheduledTime`, then drain (in
    /// non-decreasing `scheduledTime` order) every entry whose time has
    /// come. A dispatch whose recorded subject/direct id no longer
    /// matches the live object is dropped silently.
    pub fn advance_and_drain(
        &mut self,
        units_to_do: i64,
        live_id: impl Fn(Handle) -> Option<u16>,
    ) -> Vec<QueuedDispatch> {
        for slot in self.slots.iter_mut().flatten() {
            slot.scheduled_time -= units_to_do;
        }
        let mut due_indices: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.filter(|d| d.scheduled_time <= 0).map(|_| i))
            .collect();
        due_indices.sort_by_key(|&i| self.slots[i].unwrap().scheduled_time);

        let mut due = Vec::new();
        for idx in due_indices {
            let dispatch = self.slots[idx].take().unwrap();
            let subject_alive = live_id(dispatch.subject) == Some(dispatch.subject_id_at_enqueue)
                || dispatch.subject.is_none();
            let direct_alive = live_id(dispatch.direct) == Some(dispatch.direct_id_at_enqueue)
                || dispatch.direct.is_none();
            if subject_alive && direct_alive {
                due.push(dispatch);
            }
        }
        due
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        ActionQueue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(time: i64, action: u32) -> QueuedDispatch {
        QueuedDispatch {
            scheduled_time: time,
            actions: [Some(ActionId(action))],
            subject: Handle::NONE,
            subject_id_at_enqueue: 0,
            direct: Handle::NONE,
            direct_id_at_enqueue: 0,
        }
    }

    #[test]
    fn drains_in_non_decreasing_scheduled_time_order() {
        let mut q = ActionQueue::new();
        q.enqueue(dispatch(5, 1));
        q.enqueue(dispatch(1, 2));
        q.enqueue(dispatch(3, 3));
        let due = q.advance_and_drain(10, |_| None);
        let order: Vec<u32> = due.iter().map(|d| d.actions[0].unwrap().0).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn id_mismatch_at_dispatch_suppresses_execution() {
        let mut q = ActionQueue::new();
        let mut d = dispatch(1, 1);
        d.subject = Handle { slot: 0, id: 5 };
        d.subject_id_at_enqueue = 5;
        q.enqueue(d);
        let due = q.advance_and_drain(10, |_| Some(6));
        assert!(due.is_empty());
    }

    #[test]
    fn queue_full_rejects_new_dispatch() {
        let mut q = ActionQueue::new();
        for i in 0..QUEUE_CAPACITY {
            assert!(q.enqueue(dispatch(100, i as u32)));
        }
        assert!(!q.enqueue(dispatch(100, 999)));
    }
}
