//! Stale-safe references into the space-object arena.
//!
//! An arena slot is reused the moment it frees; `id` is re-randomized on
//! every reuse so a `Handle` captured before a reuse can be told apart
//! from one captured after it, without reference counting.

use serde::{Deserialize, Serialize};

/// A reference to an arena slot, valid only while the slot's live `id`
/// still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub slot: u16,
    pub id: u16,
}

impl Handle {
    pub const NONE: Handle = Handle { slot: u16::MAX, id: 0 };

    pub fn is_none(self) -> bool {
        self.slot == u16::MAX
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NONE
    }
}
