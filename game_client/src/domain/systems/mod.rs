// Per-tick systems. Each operates on plain entity slices so the orchestrator
// controls ordering.

pub mod camera;
pub mod collision;
pub mod movement;
pub mod progression;
pub mod skills;
pub mod spawner;
