//! Pure decision functions for non-player ship think.
//!
//! Nothing here touches the arena directly: `antares_sim::systems::ai_think`
//! builds a `ThinkContext` snapshot from the live arena once per major
//! tick per thinking object, calls `decide`, and applies the returned
//! `ThinkOutput` back — mirroring the split between an ECS-independent
//! FSM crate and its engine glue elsewhere in the corpus.

pub mod think;

pub use think::{decide, ThinkContext, ThinkOutput, TargetCandidate};
