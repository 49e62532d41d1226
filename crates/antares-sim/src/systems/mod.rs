//! Engine glue that adapts arena-shaped state to the pure decision
//! functions living in other crates, mirroring the split between
//! `deterrence-threat-ai` (pure FSM) and
//! `deterrence-sim::systems::threat_ai` (ECS glue) in the corpus.

pub mod ai_think;
