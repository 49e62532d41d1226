//! The input boundary the tick scheduler pulls from each step.

use crate::flags::KeysDown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCommand {
    pub target_slot: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseClick {
    pub screen_h: i32,
    pub screen_v: i32,
}

/// One tick's worth of player intent. A replay source must yield
/// bit-identical frames given the same `(global_seed, chapter_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub keys_down: KeysDown,
    pub selection: Option<SelectionCommand>,
    pub mouse_click: Option<MouseClick>,
}
