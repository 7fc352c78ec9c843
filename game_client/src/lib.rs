pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::runner::{RunError, run, run_with_config};
pub use interface_adapters::BrokerClient;
pub use use_cases::{SessionConfig, SessionOutcome, SimConfig, Simulation, run_session};
