//! The event stream consumed by the host UI: sound cues, messages,
//! score changes, winner declarations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    PlaySound { id: u32 },
    DisplayMessage { id: u32, text: Option<String> },
    ChangeScore { admiral: i32, which: i32, delta: i32 },
    DeclareWinner { admiral: i32, next_chapter: Option<u32> },
    ColorFlash { color: u8, shade: u8 },
    ZoomChanged { level: i32 },
    ObjectDestroyed { slot: u16, remaining: i32 },
}

/// Per-tick outcome returned by `SimulationStep`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOutcome {
    pub game_over: bool,
    pub winner: Option<i32>,
    pub next_level: Option<u32>,
    pub events: Vec<Event>,
}
