use crate::use_cases::PartyBroker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    // Party registry plus per-connection outboxes.
    pub broker: Arc<Mutex<PartyBroker>>,
    // Capacity of each connection's outbound event queue.
    pub outbox_capacity: usize,
}
