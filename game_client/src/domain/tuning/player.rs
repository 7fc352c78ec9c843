/// Gameplay tuning for the local player.
///
/// Keep this separate from runtime/client configuration (tick rates, timeouts, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Movement speed in units per second.
    pub speed: f32,

    /// Collision radius in world units.
    pub radius: f32,

    pub max_health: f32,

    /// XP needed to go from level 1 to level 2.
    pub xp_to_first_level: f32,

    /// Multiplier applied to the requirement after each level-up (result floored).
    pub xp_growth: f32,

    /// Camera dead-zone half extent around the viewport center.
    pub camera_dead_zone: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 200.0,
            radius: 15.0,
            max_health: 100.0,
            xp_to_first_level: 10.0,
            xp_growth: 1.2,
            camera_dead_zone: 100.0,
        }
    }
}
