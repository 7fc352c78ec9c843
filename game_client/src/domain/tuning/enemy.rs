use crate::domain::entities::EnemyKind;

/// Base stats for one enemy kind before level scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    pub radius: f32,
    /// Chase speed in units per second.
    pub speed: f32,
    /// Contact damage per second.
    pub damage: f32,
    pub xp_value: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    pub zombie: EnemyStats,
    pub ghost: EnemyStats,
    pub demon: EnemyStats,

    /// Speed multiplier while slowed.
    pub slow_factor: f32,
}

impl EnemyTuning {
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Zombie => &self.zombie,
            EnemyKind::Ghost => &self.ghost,
            EnemyKind::Demon => &self.demon,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            zombie: EnemyStats {
                health: 10.0,
                radius: 12.0,
                speed: 80.0,
                damage: 10.0,
                xp_value: 2.0,
            },
            ghost: EnemyStats {
                health: 15.0,
                radius: 12.0,
                speed: 100.0,
                damage: 8.0,
                xp_value: 3.0,
            },
            demon: EnemyStats {
                health: 30.0,
                radius: 20.0,
                speed: 60.0,
                damage: 15.0,
                xp_value: 5.0,
            },
            slow_factor: 0.5,
        }
    }
}

/// Wave pacing. Interval and batch size scale with the player's level.
#[derive(Debug, Clone, Copy)]
pub struct SpawnTuning {
    pub base_interval: f32,
    pub min_interval: f32,
    /// Seconds shaved off the interval per level above 1.
    pub interval_step: f32,
    pub base_rate: u32,
    /// Distance outside the viewport edge where enemies appear.
    pub margin: f32,
    pub zombie_chance: f64,
    /// Health bonus per level above 1, as a fraction of base health.
    pub health_ramp: f32,
    /// Radius band used by the debug ring spawn.
    pub ring_min_distance: f32,
    pub ring_spread: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_interval: 2.0,
            min_interval: 0.5,
            interval_step: 0.1,
            base_rate: 1,
            margin: 50.0,
            zombie_chance: 0.7,
            health_ramp: 0.15,
            ring_min_distance: 200.0,
            ring_spread: 100.0,
        }
    }
}
