//! Fixed-capacity slab of space objects, with `(slot, id)` handles and
//! an intrusive doubly-linked active list.
//!
//! Objects reference each other cyclically (target, destination, beam
//! endpoints), so slots carry a generation id and stale handles resolve
//! to `None` rather than leaning on an ECS or reference counting.

use antares_core::flags::AttributeFlags;
use antares_core::handle::Handle;
use antares_core::object::{Active, SpaceObject};
use tracing::warn;

pub const MAX_SPACE_OBJECT: usize = 250;

pub struct Arena {
    slots: Vec<SpaceObject>,
    active_head: Option<u16>,
    active_tail: Option<u16>,
    count_in_use: usize,
    count_to_be_freed: usize,
}

impl Arena {
    pub fn new() -> Arena {
        let mut slots = Vec::with_capacity(MAX_SPACE_OBJECT);
        for slot in 0..MAX_SPACE_OBJECT {
            let mut obj = SpaceObject::nil_target();
            obj.slot = slot as u16;
            obj.id = 0;
            obj.active = Active::Available;
            slots.push(obj);
        }
        Arena {
            slots,
            active_head: None,
            active_tail: None,
            count_in_use: 0,
            count_to_be_freed: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn count_in_use(&self) -> usize {
        self.count_in_use
    }

    pub fn count_to_be_freed(&self) -> usize {
        self.count_to_be_freed
    }

    fn resolve(&self, handle: Handle) -> Option<usize> {
        if handle.is_none() {
            return None;
        }
        let idx = handle.slot as usize;
        let slot = self.slots.get(idx)?;
        if slot.id == handle.id && slot.is_in_use() {
            Some(idx)
        } else {
            None
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&SpaceObject> {
        self.resolve(handle).map(|idx| &self.slots[idx])
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut SpaceObject> {
        let idx = self.resolve(handle)?;
        Some(&mut self.slots[idx])
    }

    pub fn by_slot(&self, slot: u16) -> Option<&SpaceObject> {
        self.slots.get(slot as usize).filter(|o| o.is_in_use())
    }

    pub fn by_slot_mut(&mut self, slot: u16) -> Option<&mut SpaceObject> {
        if self.slots.get(slot as usize).map_or(false, |o| o.is_in_use()) {
            self.slots.get_mut(slot as usize)
        } else {
            None
        }
    }

    pub fn handle_of(&self, slot: u16) -> Handle {
        Handle { slot, id: self.slots[slot as usize].id }
    }

    /// Linear probe from slot 0 for the first `Available` slot — never
    /// lowest-age-first.
    fn first_available(&self) -> Option<usize> {
        self.slots.iter().position(|o| matches!(o.active, Active::Available))
    }

    /// Create a new object in the first available slot, re-randomizing
    /// its id so stale handles into this slot can never resolve to the
    /// new occupant. Returns `None` when the arena is full.
    pub fn create(&mut self, mut template: SpaceObject, id_seed: u16) -> Option<Handle> {
        let idx = match self.first_available() {
            Some(idx) => idx,
            None => {
                warn!("arena exhausted: all {} slots occupied", self.slots.len());
                return None;
            }
        };
        let new_id = self.slots[idx].id.wrapping_add(id_seed).wrapping_add(1).max(1);
        template.slot = idx as u16;
        template.id = new_id;
        template.active = Active::InUse;
        template.prev_active = None;
        template.next_active = self.active_head;
        self.slots[idx] = template;

        if let Some(head) = self.active_head {
            self.slots[head as usize].prev_active = Some(idx as u16);
        } else {
            self.active_tail = Some(idx as u16);
        }
        self.active_head = Some(idx as u16);
        self.count_in_use += 1;
        Some(Handle { slot: idx as u16, id: new_id })
    }

    /// Mark `ToBeFreed`. Fields remain readable until the next `sweep`.
    pub fn destroy(&mut self, handle: Handle) {
        if let Some(idx) = self.resolve(handle) {
            self.slots[idx].active = Active::ToBeFreed;
            self.count_in_use -= 1;
            self.count_to_be_freed += 1;
        }
    }

    fn unlink_active(&mut self, idx: u16) {
        let (prev, next) = {
            let obj = &self.slots[idx as usize];
            (obj.prev_active, obj.next_active)
        };
        match prev {
            Some(p) => self.slots[p as usize].next_active = next,
            None => self.active_head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev_active = prev,
            None => self.active_tail = prev,
        }
    }

    /// Run after every tick: unlink every `ToBeFreed` slot, clear its
    /// attributes, and mark it `Available`.
    pub fn sweep(&mut self) -> Vec<u16> {
        let to_free: Vec<u16> = self
            .slots
            .iter()
            .filter(|o| matches!(o.active, Active::ToBeFreed))
            .map(|o| o.slot)
            .collect();
        for &slot in &to_free {
            self.unlink_active(slot);
            let id = self.slots[slot as usize].id;
            let mut fresh = SpaceObject::nil_target();
            fresh.slot = slot;
            fresh.id = id;
            fresh.attributes = AttributeFlags::empty();
            self.slots[slot as usize] = fresh;
            self.count_to_be_freed -= 1;
        }
        to_free
    }

    /// Iterate the active list newest-first (stable across runs given
    /// identical inputs, per the replay contract).
    pub fn iter_active(&self) -> ActiveIter<'_> {
        ActiveIter { arena: self, cursor: self.active_head }
    }

    pub fn active_slots(&self) -> Vec<u16> {
        self.iter_active().map(|o| o.slot).collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

pub struct ActiveIter<'a> {
    arena: &'a Arena,
    cursor: Option<u16>,
}

impl<'a> Iterator for ActiveIter<'a> {
    type Item = &'a SpaceObject;
    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let obj = &self.arena.slots[idx as usize];
        self.cursor = obj.next_active;
        Some(obj)
    }
}
