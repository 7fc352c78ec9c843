// Domain layer: simulation entities, tuning, per-tick systems and ports.

pub mod effects;
pub mod entities;
pub mod errors;
pub mod party;
pub mod ports;
pub mod roster;
pub mod snapshot;
pub mod systems;
pub mod tuning;

pub use effects::{EffectKind, StatusEffectEvent};
pub use entities::{
    Body, BurnStatus, Character, Element, Elements, Enemy, EnemyKind, MoveInput, Player,
    Projectile, Skill, SkillKind,
};
pub use errors::{ChoiceError, ClientError};
pub use party::{PartyNotice, PartyPlayerView, PartyView, RemotePlayerView};
pub use ports::{Frontend, PartyLink};
pub use roster::{RemoteAvatar, RemoteRoster};
pub use snapshot::{
    AuthoritativeEnemy, AuthoritativeState, AvatarState, RenderFrame, SimPhase, SkillSummary,
};
