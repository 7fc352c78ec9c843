// Use cases: the tick orchestrator, host/follower state sync and the session
// loop that ties a simulation to the party link.

pub mod session;
pub mod simulation;
pub mod sync;

pub use session::{SessionConfig, SessionOutcome, run_session};
pub use simulation::{Authority, SimConfig, SimEvent, Simulation};
