use crate::domain::entities::SkillKind;

#[derive(Debug, Clone, Copy)]
pub struct FireballTuning {
    pub base_cooldown: f32,
    pub min_cooldown: f32,
    /// Cooldown reduction per skill level.
    pub cooldown_step: f32,
    pub speed: f32,
    pub base_damage: f32,
    pub damage_per_level: f32,
    pub radius: f32,
    pub lifetime: f32,
    /// Piercing granted by the Water element.
    pub water_piercing: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct LightningTuning {
    pub base_cooldown: f32,
    pub radius: f32,
    pub max_targets: usize,
    pub base_damage: f32,
    pub damage_per_level: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitTuning {
    pub base_count: usize,
    /// Damage per second while an orb overlaps an enemy.
    pub base_damage: f32,
    pub damage_per_level: f32,
    pub radius: f32,
    pub orbit_radius: f32,
    /// Ring rotation in radians per second.
    pub angular_speed: f32,
    /// Per-hit probability that a Lightning orb chains.
    pub chain_chance: f64,
    pub chain_factor: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainTuning {
    pub range: f32,
    /// Fraction of projectile damage carried by the chain.
    pub projectile_factor: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusTuning {
    pub burn_damage_per_second: f32,
    pub burn_seconds: f32,
    pub slow_seconds: f32,
}

/// How long visual status events stay in the render frame.
#[derive(Debug, Clone, Copy)]
pub struct EffectTuning {
    pub pulse_seconds: f32,
    pub projectile_chain_seconds: f32,
    pub orb_chain_seconds: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SkillTuning {
    pub fireball: FireballTuning,
    pub lightning: LightningTuning,
    pub orbit: OrbitTuning,
    pub chain: ChainTuning,
    pub status: StatusTuning,
    pub effects: EffectTuning,
    /// Skill levels per enhancement tier.
    pub tier_size: u32,
}

impl SkillTuning {
    pub fn base_cooldown(&self, kind: SkillKind) -> f32 {
        match kind {
            SkillKind::Fireball => self.fireball.base_cooldown,
            SkillKind::Lightning => self.lightning.base_cooldown,
            SkillKind::Orbit => 0.0,
        }
    }

    pub fn tier(&self, level: u32) -> usize {
        (level / self.tier_size) as usize
    }
}

impl Default for SkillTuning {
    fn default() -> Self {
        Self {
            fireball: FireballTuning {
                base_cooldown: 1.5,
                min_cooldown: 0.3,
                cooldown_step: 0.05,
                speed: 300.0,
                base_damage: 10.0,
                damage_per_level: 2.0,
                radius: 8.0,
                lifetime: 3.0,
                water_piercing: 2,
            },
            lightning: LightningTuning {
                base_cooldown: 2.0,
                radius: 200.0,
                max_targets: 3,
                base_damage: 20.0,
                damage_per_level: 3.0,
            },
            orbit: OrbitTuning {
                base_count: 2,
                base_damage: 8.0,
                damage_per_level: 2.0,
                radius: 10.0,
                orbit_radius: 60.0,
                angular_speed: 2.0,
                chain_chance: 0.05,
                chain_factor: 0.2,
            },
            chain: ChainTuning {
                range: 100.0,
                projectile_factor: 0.4,
            },
            status: StatusTuning {
                burn_damage_per_second: 2.0,
                burn_seconds: 3.0,
                slow_seconds: 2.0,
            },
            effects: EffectTuning {
                pulse_seconds: 0.3,
                projectile_chain_seconds: 0.2,
                orb_chain_seconds: 0.15,
            },
            tier_size: 10,
        }
    }
}
