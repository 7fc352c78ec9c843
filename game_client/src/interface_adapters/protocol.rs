// Wire protocol DTOs for the broker websocket, client side, and conversions to
// domain types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthoritativeEnemy, AuthoritativeState, AvatarState, Element, EnemyKind, PartyNotice,
    PartyPlayerView, PartyView, RemotePlayerView, SkillSummary,
};

/// Messages sent to the broker. Requests carry a `request_id` echoed on the
/// reply.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    CreateParty {
        request_id: u64,
        player_name: String,
    },
    JoinParty {
        request_id: u64,
        party_code: String,
        player_name: String,
    },
    LeaveParty,
    StartGame {
        request_id: u64,
    },
    PlayerUpdate(PlayerStateDto),
    RequestPlayerStates {
        request_id: u64,
    },
    HostGameState(GameStateDto),
    ShareXp {
        amount: f32,
    },
}

/// Messages received from the broker.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    Identity {
        player_id: String,
    },
    PartyCreated {
        request_id: u64,
        party_code: String,
        party: PartyDto,
    },
    PartyJoined {
        request_id: u64,
        party: PartyDto,
    },
    GameStartAccepted {
        request_id: u64,
    },
    PlayerStates {
        request_id: u64,
        players: Vec<RemotePlayerDto>,
    },
    RequestFailed {
        request_id: u64,
        error: String,
    },
    PartyUpdated(PartyDto),
    GameStarted {
        is_host: bool,
    },
    GameStateTick(GameStateDto),
    PlayerUpdate(RemotePlayerDto),
    ReceiveXp {
        amount: f32,
        from_player: String,
    },
    PlayerDisconnected {
        player_id: String,
    },
}

impl ServerMessage {
    /// The request this message answers, if it is a reply.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::PartyCreated { request_id, .. }
            | ServerMessage::PartyJoined { request_id, .. }
            | ServerMessage::GameStartAccepted { request_id }
            | ServerMessage::PlayerStates { request_id, .. }
            | ServerMessage::RequestFailed { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Unsolicited pushes, translated for the session loop.
    pub fn into_notice(self) -> Option<PartyNotice> {
        let notice = match self {
            ServerMessage::PartyUpdated(party) => PartyNotice::PartyUpdated(party.into()),
            ServerMessage::GameStarted { is_host } => PartyNotice::GameStarted { is_host },
            ServerMessage::GameStateTick(state) => PartyNotice::GameStateTick(state.into()),
            ServerMessage::PlayerUpdate(player) => PartyNotice::PlayerUpdate(player.into()),
            ServerMessage::ReceiveXp {
                amount,
                from_player,
            } => PartyNotice::ReceiveXp {
                amount,
                from_player,
            },
            ServerMessage::PlayerDisconnected { player_id } => {
                PartyNotice::PlayerDisconnected { player_id }
            }
            _ => return None,
        };
        Some(notice)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec2Dto {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2Dto> for Vec2 {
    fn from(v: Vec2Dto) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Vec2Dto {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyPlayerDto {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: f32,
    pub is_host: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyDto {
    pub code: String,
    pub host: String,
    pub players: Vec<PartyPlayerDto>,
    pub game_started: bool,
}

impl From<PartyDto> for PartyView {
    fn from(dto: PartyDto) -> Self {
        Self {
            code: dto.code,
            host: dto.host,
            players: dto
                .players
                .into_iter()
                .map(|p| PartyPlayerView {
                    id: p.id,
                    name: p.name,
                    level: p.level,
                    health: p.health,
                    is_host: p.is_host,
                })
                .collect(),
            game_started: dto.game_started,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSummaryDto {
    pub id: String,
    pub level: u32,
    #[serde(default)]
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStateDto {
    pub position: Vec2Dto,
    pub health: f32,
    pub level: u32,
    #[serde(default)]
    pub skills: Vec<SkillSummaryDto>,
}

impl From<AvatarState> for PlayerStateDto {
    fn from(state: AvatarState) -> Self {
        Self {
            position: state.position.into(),
            health: state.health,
            level: state.level,
            skills: state
                .skills
                .into_iter()
                .map(|s| SkillSummaryDto {
                    id: s.id,
                    level: s.level,
                    elements: s.elements.iter().map(|e| e.as_str().to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl From<PlayerStateDto> for AvatarState {
    fn from(dto: PlayerStateDto) -> Self {
        Self {
            position: dto.position.into(),
            health: dto.health,
            level: dto.level,
            skills: dto
                .skills
                .into_iter()
                .map(|s| SkillSummary {
                    id: s.id,
                    level: s.level,
                    // Unknown element names from newer peers are skipped.
                    elements: s.elements.iter().filter_map(|e| e.parse::<Element>().ok()).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePlayerDto {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub state: PlayerStateDto,
}

impl From<RemotePlayerDto> for RemotePlayerView {
    fn from(dto: RemotePlayerDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            state: dto.state.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyKindDto {
    Zombie,
    Ghost,
    Demon,
}

impl From<EnemyKindDto> for EnemyKind {
    fn from(kind: EnemyKindDto) -> Self {
        match kind {
            EnemyKindDto::Zombie => EnemyKind::Zombie,
            EnemyKindDto::Ghost => EnemyKind::Ghost,
            EnemyKindDto::Demon => EnemyKind::Demon,
        }
    }
}

impl From<EnemyKind> for EnemyKindDto {
    fn from(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Zombie => EnemyKindDto::Zombie,
            EnemyKind::Ghost => EnemyKindDto::Ghost,
            EnemyKind::Demon => EnemyKindDto::Demon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDto {
    pub id: String,
    pub position: Vec2Dto,
    pub health: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_health: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EnemyKindDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_value: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateDto {
    #[serde(default)]
    pub enemies: Vec<EnemyDto>,
    #[serde(default)]
    pub game_time: f32,
}

impl From<GameStateDto> for AuthoritativeState {
    fn from(dto: GameStateDto) -> Self {
        Self {
            enemies: dto
                .enemies
                .into_iter()
                .map(|e| AuthoritativeEnemy {
                    id: e.id,
                    position: e.position.into(),
                    health: e.health,
                    max_health: e.max_health,
                    kind: e.kind.map(EnemyKind::from),
                    radius: e.radius,
                    speed: e.speed,
                    damage: e.damage,
                    xp_value: e.xp_value,
                })
                .collect(),
            game_time: dto.game_time,
        }
    }
}

impl From<AuthoritativeState> for GameStateDto {
    fn from(state: AuthoritativeState) -> Self {
        Self {
            enemies: state
                .enemies
                .into_iter()
                .map(|e| EnemyDto {
                    id: e.id,
                    position: e.position.into(),
                    health: e.health,
                    max_health: e.max_health,
                    kind: e.kind.map(EnemyKindDto::from),
                    radius: e.radius,
                    speed: e.speed,
                    damage: e.damage,
                    xp_value: e.xp_value,
                })
                .collect(),
            game_time: state.game_time,
        }
    }
}
