// Domain layer: party records and the rules that guard them.

pub mod errors;
pub mod party;

pub use errors::PartyError;
pub use party::{
    ConnId, EnemyKind, EnemySnapshot, MAX_PARTY_SIZE, Party, PartyMember, PartyPhase,
    PlayerState, Position, SharedGameState, SkillSummary,
};
