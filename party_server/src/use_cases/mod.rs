// Use cases layer: party workflows and the state relay.

pub mod broker;
pub mod relay;
pub mod types;

pub use broker::PartyBroker;
pub use types::{CreatedParty, Delivery, Outbox, OutboxReceiver, PartyEvent, RemotePlayer};
