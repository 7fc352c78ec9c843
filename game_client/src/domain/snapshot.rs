use glam::Vec2;

use super::effects::StatusEffectEvent;
use super::entities::{Element, Enemy, EnemyKind, Player, Projectile};

/// Simulation lifecycle. `GameOver` is terminal for the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimPhase {
    #[default]
    Running,
    Paused,
    LevelingUp,
    GameOver,
}

/// Read-only view handed to the renderer once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub player: Player,
    /// Top-left corner of the viewport in world units.
    pub camera: Vec2,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub orbiting: Vec<Projectile>,
    pub status_effects: Vec<StatusEffectEvent>,
    pub game_time: f32,
    pub phase: SimPhase,
}

/// One enemy as published by the host. Only `id`, `position` and `health`
/// are guaranteed; the rest may be missing from older or partial payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoritativeEnemy {
    pub id: String,
    pub position: Vec2,
    pub health: f32,
    pub max_health: Option<f32>,
    pub kind: Option<EnemyKind>,
    pub radius: Option<f32>,
    pub speed: Option<f32>,
    pub damage: Option<f32>,
    pub xp_value: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthoritativeState {
    pub enemies: Vec<AuthoritativeEnemy>,
    pub game_time: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillSummary {
    pub id: String,
    pub level: u32,
    pub elements: Vec<Element>,
}

/// What every client broadcasts about its own player for avatar rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarState {
    pub position: Vec2,
    pub health: f32,
    pub level: u32,
    pub skills: Vec<SkillSummary>,
}

impl Default for AvatarState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            health: 100.0,
            level: 1,
            skills: Vec::new(),
        }
    }
}
