// Party records: membership, host designation and the host-owned game state.

use super::errors::PartyError;
use rand::Rng;

/// Broker-assigned identity of a websocket connection.
pub type ConnId = u64;

pub const MAX_PARTY_SIZE: usize = 4;
pub const PARTY_CODE_LEN: usize = 6;
/// Code alphabet without the visually confusable `I`, `O`, `0` and `1`.
pub const PARTY_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 20;
const STARTING_HEALTH: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillSummary {
    pub id: String,
    pub level: u32,
    pub elements: Vec<String>,
}

/// Last avatar state reported by a member.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Position,
    pub health: f32,
    pub level: u32,
    pub skills: Vec<SkillSummary>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Position::default(),
            health: STARTING_HEALTH,
            level: 1,
            skills: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Zombie,
    Ghost,
    Demon,
}

/// Enemy entry of the host's authoritative snapshot. Everything except the
/// id, position and health is optional on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySnapshot {
    pub id: String,
    pub position: Position,
    pub health: f32,
    pub max_health: Option<f32>,
    pub kind: Option<EnemyKind>,
    pub radius: Option<f32>,
    pub speed: Option<f32>,
    pub damage: Option<f32>,
    pub xp_value: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedGameState {
    pub enemies: Vec<EnemySnapshot>,
    pub game_time: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyMember {
    pub id: ConnId,
    pub name: String,
    pub is_host: bool,
    pub state: PlayerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyPhase {
    Lobby,
    Active,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub code: String,
    pub host: ConnId,
    /// Members in join order; host migration walks this order.
    pub members: Vec<PartyMember>,
    pub phase: PartyPhase,
    pub shared_state: Option<SharedGameState>,
}

/// Result of removing a member from a party.
#[derive(Debug)]
pub struct Departure {
    pub member: PartyMember,
    /// Set when the leaving member was host and someone else was promoted.
    pub new_host: Option<ConnId>,
}

impl Party {
    pub fn new(code: String, host: ConnId, host_name: String) -> Self {
        Self {
            code,
            host,
            members: vec![PartyMember {
                id: host,
                name: host_name,
                is_host: true,
                state: PlayerState::default(),
            }],
            phase: PartyPhase::Lobby,
            shared_state: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase == PartyPhase::Active
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, id: ConnId) -> Option<&PartyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Whether a new member could be added right now.
    pub fn check_admission(&self) -> Result<(), PartyError> {
        if self.is_started() {
            return Err(PartyError::InProgress);
        }
        if self.members.len() >= MAX_PARTY_SIZE {
            return Err(PartyError::Full);
        }
        Ok(())
    }

    pub fn add_member(&mut self, id: ConnId, name: String) -> Result<(), PartyError> {
        self.check_admission()?;

        self.members.push(PartyMember {
            id,
            name,
            is_host: false,
            state: PlayerState::default(),
        });
        Ok(())
    }

    pub fn remove_member(&mut self, id: ConnId) -> Option<Departure> {
        let index = self.members.iter().position(|m| m.id == id)?;
        let member = self.members.remove(index);

        let mut new_host = None;
        if self.host == id {
            if let Some(next) = self.members.first_mut() {
                next.is_host = true;
                self.host = next.id;
                new_host = Some(next.id);
            }
        }

        Some(Departure { member, new_host })
    }

    /// Moves the party to `Active`. Only the host may start, and only once.
    pub fn start(&mut self, requester: ConnId) -> Result<(), PartyError> {
        if self.host != requester {
            return Err(PartyError::NotHost);
        }
        if self.is_started() {
            return Err(PartyError::InProgress);
        }

        self.phase = PartyPhase::Active;
        self.shared_state = Some(SharedGameState::default());
        for member in &mut self.members {
            member.state = PlayerState::default();
        }
        Ok(())
    }

    /// Stores the host's snapshot. Returns false (and changes nothing) for
    /// any sender that is not the current host of a started party.
    pub fn record_host_state(&mut self, sender: ConnId, state: SharedGameState) -> bool {
        if !self.is_started() || self.host != sender {
            return false;
        }
        self.shared_state = Some(state);
        true
    }

    pub fn record_player_state(&mut self, id: ConnId, state: PlayerState) -> bool {
        match self.members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                member.state = state;
                true
            }
            None => false,
        }
    }

    pub fn others(&self, id: ConnId) -> impl Iterator<Item = &PartyMember> {
        self.members.iter().filter(move |m| m.id != id)
    }

    pub fn non_host_members(&self) -> impl Iterator<Item = &PartyMember> {
        self.others(self.host)
    }
}

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PARTY_CODE_LEN)
        .map(|_| {
            let index = rng.gen_range(0..PARTY_CODE_ALPHABET.len());
            PARTY_CODE_ALPHABET[index] as char
        })
        .collect()
}

/// Codes are case-insensitive on input and stored uppercase.
pub fn normalize_code(input: &str) -> Result<String, PartyError> {
    let code = input.trim().to_ascii_uppercase();
    if code.len() != PARTY_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PartyError::InvalidCode);
    }
    Ok(code)
}

pub fn validate_player_name(input: &str) -> Result<String, PartyError> {
    let name = input.trim();
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(PartyError::InvalidName);
    }
    Ok(name.to_string())
}
