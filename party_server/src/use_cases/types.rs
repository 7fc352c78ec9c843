// Use-case level outputs pushed from the broker to connected clients.

use crate::domain::{ConnId, Party, PlayerState, SharedGameState};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Avatar state of another member, as relayed to the party.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub id: ConnId,
    pub name: String,
    pub state: PlayerState,
}

#[derive(Debug, Clone)]
pub enum PartyEvent {
    PartyUpdated(Party),
    GameStarted { is_host: bool },
    // Shared so one snapshot fans out to every non-host without copying.
    GameStateTick(Arc<SharedGameState>),
    PlayerUpdate(RemotePlayer),
    ReceiveXp { amount: f32, from_player: String },
    PlayerDisconnected { player_id: ConnId },
}

impl PartyEvent {
    /// Periodic updates that the next one supersedes. Only these may be shed
    /// when a connection falls behind.
    pub fn is_droppable(&self) -> bool {
        matches!(
            self,
            PartyEvent::GameStateTick(_) | PartyEvent::PlayerUpdate(_)
        )
    }
}

/// Sending half of a connection's event queues. Control events go through an
/// unbounded queue; streamed updates through a bounded one.
#[derive(Debug, Clone)]
pub struct Outbox {
    control: mpsc::UnboundedSender<PartyEvent>,
    stream: mpsc::Sender<PartyEvent>,
}

#[derive(Debug)]
pub struct OutboxReceiver {
    pub control: mpsc::UnboundedReceiver<PartyEvent>,
    pub stream: mpsc::Receiver<PartyEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Stream queue full; the update was shed.
    Dropped,
    Closed,
}

impl Outbox {
    pub fn channel(stream_capacity: usize) -> (Outbox, OutboxReceiver) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (stream_tx, stream_rx) = mpsc::channel(stream_capacity);
        (
            Outbox {
                control: control_tx,
                stream: stream_tx,
            },
            OutboxReceiver {
                control: control_rx,
                stream: stream_rx,
            },
        )
    }

    pub fn deliver(&self, event: PartyEvent) -> Delivery {
        if !event.is_droppable() {
            return match self.control.send(event) {
                Ok(()) => Delivery::Sent,
                Err(_) => Delivery::Closed,
            };
        }
        match self.stream.try_send(event) {
            Ok(()) => Delivery::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Successful reply to a create request.
#[derive(Debug, Clone)]
pub struct CreatedParty {
    pub code: String,
    pub party: Party,
}
