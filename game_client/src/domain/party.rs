use super::snapshot::{AuthoritativeState, AvatarState};

#[derive(Debug, Clone, PartialEq)]
pub struct PartyPlayerView {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: f32,
    pub is_host: bool,
}

/// Client-side copy of a party record, as last pushed by the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyView {
    pub code: String,
    pub host: String,
    pub players: Vec<PartyPlayerView>,
    pub game_started: bool,
}

impl PartyView {
    pub fn is_host(&self, player_id: &str) -> bool {
        self.host == player_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayerView {
    pub id: String,
    pub name: String,
    pub state: AvatarState,
}

/// Broker pushes, translated for the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PartyNotice {
    PartyUpdated(PartyView),
    GameStarted { is_host: bool },
    GameStateTick(AuthoritativeState),
    PlayerUpdate(RemotePlayerView),
    ReceiveXp { amount: f32, from_player: String },
    PlayerDisconnected { player_id: String },
    /// The broker connection ended; no further notices follow.
    Closed,
}

impl PartyNotice {
    /// Periodic pushes the next one supersedes; the only kind a lagging
    /// reader may shed.
    pub fn is_droppable(&self) -> bool {
        matches!(
            self,
            PartyNotice::GameStateTick(_) | PartyNotice::PlayerUpdate(_)
        )
    }
}
