//! Replay envelope and input-source abstraction. Playback must be
//! bit-identical given the same `(global_seed, chapter_id, frames)`.

use antares_core::input::InputFrame;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub global_seed: u32,
    pub chapter_id: u16,
    pub frames: Vec<InputFrame>,
}

/// Anything the tick scheduler can pull one `InputFrame` from per step.
pub trait InputSource {
    fn next_frame(&mut self) -> Option<InputFrame>;
}

/// Replays a recorded `Replay` frame-by-frame.
pub struct ReplaySource {
    replay: Replay,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(replay: Replay) -> ReplaySource {
        ReplaySource { replay, cursor: 0 }
    }

    pub fn global_seed(&self) -> u32 {
        self.replay.global_seed
    }

    pub fn chapter_id(&self) -> u16 {
        self.replay.chapter_id
    }
}

impl InputSource for ReplaySource {
    fn next_frame(&mut self) -> Option<InputFrame> {
        let frame = self.replay.frames.get(self.cursor).copied();
        self.cursor += 1;
        frame
    }
}

/// Test-only input source driven by a closure, for scripting scenarios
/// without constructing a full `Replay`.
pub struct ScriptedSource<F: FnMut(usize) -> Option<InputFrame>> {
    script: F,
    tick: usize,
}

impl<F: FnMut(usize) -> Option<InputFrame>> ScriptedSource<F> {
    pub fn new(script: F) -> ScriptedSource<F> {
        ScriptedSource { script, tick: 0 }
    }
}

impl<F: FnMut(usize) -> Option<InputFrame>> InputSource for ScriptedSource<F> {
    fn next_frame(&mut self) -> Option<InputFrame> {
        let frame = (self.script)(self.tick);
        self.tick += 1;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_source_yields_frames_in_order_then_none() {
        let replay = Replay {
            global_seed: 1,
            chapter_id: 1,
            frames: vec![InputFrame::default(), InputFrame::default()],
        };
        let mut src = ReplaySource::new(replay);
        assert!(src.next_frame().is_some());
        assert!(src.next_frame().is_some());
        assert!(src.next_frame().is_none());
    }

    #[test]
    fn scripted_source_calls_closure_with_increasing_tick() {
        let mut seen = Vec::new();
        let mut src = ScriptedSource::new(|tick| {
            seen.push(tick);
            Some(InputFrame::default())
        });
        src.next_frame();
        src.next_frame();
        assert_eq!(seen, vec![0, 1]);
    }
}
