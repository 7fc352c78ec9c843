use glam::Vec2;
use rand::Rng;

use super::camera::Viewport;
use crate::domain::entities::{Enemy, EnemyKind};
use crate::domain::tuning::{EnemyTuning, SpawnTuning};

/// Seconds between waves at `level`.
pub fn spawn_interval(level: u32, tuning: &SpawnTuning) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    (tuning.base_interval - steps * tuning.interval_step).max(tuning.min_interval)
}

/// Enemies per wave at `level`.
pub fn spawn_rate(level: u32, tuning: &SpawnTuning) -> u32 {
    tuning.base_rate + level / 2
}

pub fn scaled_health(base: f32, level: u32, tuning: &SpawnTuning) -> f32 {
    let multiplier = 1.0 + level.saturating_sub(1) as f32 * tuning.health_ramp;
    (base * multiplier).floor()
}

/// Mints enemy ids unique to one simulation instance. The salt keeps ids from
/// different instances (e.g. before and after a host migration) apart.
#[derive(Debug, Clone)]
pub struct EnemyIds {
    salt: u32,
    next: u64,
}

impl EnemyIds {
    pub fn new(salt: u32) -> Self {
        Self { salt, next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("e{:08x}-{}", self.salt, self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnState {
    pub timer: f32,
}

pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, tuning: &SpawnTuning) -> EnemyKind {
    if rng.gen_bool(tuning.zombie_chance) {
        EnemyKind::Zombie
    } else if rng.gen_bool(0.5) {
        EnemyKind::Ghost
    } else {
        EnemyKind::Demon
    }
}

/// Uniform point on one of the four viewport edges, `margin` outside it.
pub fn edge_position<R: Rng + ?Sized>(
    rng: &mut R,
    camera: Vec2,
    viewport: Viewport,
    margin: f32,
) -> Vec2 {
    let along_x = camera.x + rng.gen_range(0.0..viewport.width);
    let along_y = camera.y + rng.gen_range(0.0..viewport.height);
    match rng.gen_range(0..4) {
        0 => Vec2::new(along_x, camera.y - margin),
        1 => Vec2::new(camera.x + viewport.width + margin, along_y),
        2 => Vec2::new(along_x, camera.y + viewport.height + margin),
        _ => Vec2::new(camera.x - margin, along_y),
    }
}

pub fn make_enemy(
    ids: &mut EnemyIds,
    kind: EnemyKind,
    position: Vec2,
    level: u32,
    enemies: &EnemyTuning,
    spawn: &SpawnTuning,
) -> Enemy {
    let stats = enemies.stats(kind);
    let health = scaled_health(stats.health, level, spawn);
    Enemy::new(ids.next_id(), kind, position, health, stats)
}

/// Advances the wave timer and returns the enemies due this tick, if any.
#[allow(clippy::too_many_arguments)]
pub fn tick_spawner<R: Rng + ?Sized>(
    state: &mut SpawnState,
    rng: &mut R,
    ids: &mut EnemyIds,
    level: u32,
    camera: Vec2,
    viewport: Viewport,
    dt: f32,
    enemies: &EnemyTuning,
    spawn: &SpawnTuning,
) -> Vec<Enemy> {
    state.timer += dt;
    if state.timer < spawn_interval(level, spawn) {
        return Vec::new();
    }
    state.timer = 0.0;

    (0..spawn_rate(level, spawn))
        .map(|_| {
            let position = edge_position(rng, camera, viewport, spawn.margin);
            let kind = roll_kind(rng, spawn);
            make_enemy(ids, kind, position, level, enemies, spawn)
        })
        .collect()
}

/// Debug helper: `count` random enemies evenly spaced on a ring around `center`.
pub fn spawn_ring<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut EnemyIds,
    center: Vec2,
    count: usize,
    level: u32,
    enemies: &EnemyTuning,
    spawn: &SpawnTuning,
) -> Vec<Enemy> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let distance = spawn.ring_min_distance + rng.gen_range(0.0..spawn.ring_spread);
            let position = center + Vec2::from_angle(angle) * distance;
            let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
            make_enemy(ids, kind, position, level, enemies, spawn)
        })
        .collect()
}
