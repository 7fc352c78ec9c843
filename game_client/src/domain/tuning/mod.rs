// Gameplay tuning, kept separate from runtime configuration.

pub mod enemy;
pub mod player;
pub mod skills;

pub use enemy::{EnemyStats, EnemyTuning, SpawnTuning};
pub use player::PlayerTuning;
pub use skills::{
    ChainTuning, EffectTuning, FireballTuning, LightningTuning, OrbitTuning, SkillTuning,
    StatusTuning,
};

/// Every gameplay knob one simulation needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameTuning {
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub spawn: SpawnTuning,
    pub skills: SkillTuning,
}
