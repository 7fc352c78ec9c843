// Wire protocol DTOs and conversions for broker websocket messages.

use crate::domain::{
    EnemyKind, EnemySnapshot, Party, PartyMember, PlayerState, Position,
    SharedGameState, SkillSummary,
};
use crate::use_cases::{PartyEvent, RemotePlayer};
use serde::{Deserialize, Serialize};

/// Messages clients send to the broker. Requests that expect a reply carry a
/// `request_id` which the broker echoes back.
#[derive(Debug, Clone, Deserialize)]
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
    // Fire-and-forget avatar state, relayed to the party.
    PlayerUpdate(PlayerStateDto),
    RequestPlayerStates {
        request_id: u64,
    },
    // Host-only authoritative enemy snapshot.
    HostGameState(GameStateDto),
    ShareXp {
        amount: f32,
    },
}

/// Messages the broker sends to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned connection identity, sent once on connect.
    Identity { player_id: String },
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
    GameStarted { is_host: bool },
    GameStateTick(GameStateDto),
    PlayerUpdate(RemotePlayerDto),
    ReceiveXp { amount: f32, from_player: String },
    PlayerDisconnected { player_id: String },
}

impl From<PartyEvent> for ServerMessage {
    fn from(event: PartyEvent) -> Self {
        match event {
            PartyEvent::PartyUpdated(party) => ServerMessage::PartyUpdated(PartyDto::from(&party)),
            PartyEvent::GameStarted { is_host } => ServerMessage::GameStarted { is_host },
            PartyEvent::GameStateTick(state) => {
                ServerMessage::GameStateTick(GameStateDto::from(state.as_ref()))
            }
            PartyEvent::PlayerUpdate(player) => {
                ServerMessage::PlayerUpdate(RemotePlayerDto::from(player))
            }
            PartyEvent::ReceiveXp {
                amount,
                from_player,
            } => ServerMessage::ReceiveXp {
                amount,
                from_player,
            },
            PartyEvent::PlayerDisconnected { player_id } => ServerMessage::PlayerDisconnected {
                player_id: player_id.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec2Dto {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2Dto> for Position {
    fn from(v: Vec2Dto) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Position> for Vec2Dto {
    fn from(p: Position) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Party roster entry as seen by clients.
#[derive(Debug, Clone, Serialize)]
pub struct PartyPlayerDto {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: f32,
    pub is_host: bool,
}

impl From<&PartyMember> for PartyPlayerDto {
    fn from(member: &PartyMember) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            level: member.state.level,
            health: member.state.health,
            is_host: member.is_host,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartyDto {
    pub code: String,
    pub host: String,
    pub players: Vec<PartyPlayerDto>,
    pub game_started: bool,
}

impl From<&Party> for PartyDto {
    fn from(party: &Party) -> Self {
        Self {
            code: party.code.clone(),
            host: party.host.to_string(),
            players: party.members.iter().map(PartyPlayerDto::from).collect(),
            game_started: party.is_started(),
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

impl From<PlayerStateDto> for PlayerState {
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
                    elements: s.elements,
                })
                .collect(),
        }
    }
}

impl From<PlayerState> for PlayerStateDto {
    fn from(state: PlayerState) -> Self {
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
                    elements: s.elements,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemotePlayerDto {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub state: PlayerStateDto,
}

impl From<RemotePlayer> for RemotePlayerDto {
    fn from(player: RemotePlayer) -> Self {
        Self {
            id: player.id.to_string(),
            name: player.name,
            state: player.state.into(),
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

/// Enemy entry of the host snapshot. Only `id`, `position` and `health` are
/// required; omitted fields are relayed as omitted.
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

impl From<GameStateDto> for SharedGameState {
    fn from(dto: GameStateDto) -> Self {
        Self {
            enemies: dto
                .enemies
                .into_iter()
                .map(|e| EnemySnapshot {
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

impl From<&SharedGameState> for GameStateDto {
    fn from(state: &SharedGameState) -> Self {
        Self {
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyDto {
                    id: e.id.clone(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_state_with_only_required_enemy_fields_parses() {
        let raw = r#"{"type":"HostGameState","data":{"enemies":[{"id":"e1","position":{"x":10,"y":10},"health":5}],"game_time":2.5}}"#;
        let Ok(ClientMessage::HostGameState(dto)) = serde_json::from_str::<ClientMessage>(raw)
        else {
            panic!("expected host game state");
        };
        let state = SharedGameState::from(dto);
        assert_eq!(state.enemies[0].position, Position { x: 10.0, y: 10.0 });
        assert_eq!(state.enemies[0].max_health, None);
        assert_eq!(state.game_time, 2.5);
    }

    #[test]
    fn leave_party_needs_no_payload() {
        let parsed = serde_json::from_str::<ClientMessage>(r#"{"type":"LeaveParty"}"#);
        assert!(matches!(parsed, Ok(ClientMessage::LeaveParty)));
    }

    #[test]
    fn remote_player_state_is_flattened() {
        let dto = RemotePlayerDto::from(RemotePlayer {
            id: 7,
            name: "Rin".into(),
            state: PlayerState::default(),
        });
        let value = serde_json::to_value(ServerMessage::PlayerUpdate(dto)).unwrap();
        assert_eq!(value["type"], "PlayerUpdate");
        assert_eq!(value["data"]["id"], "7");
        assert_eq!(value["data"]["level"], 1);
        assert_eq!(value["data"]["position"]["x"], 0.0);
    }
}
