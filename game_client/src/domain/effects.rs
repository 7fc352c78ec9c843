use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// Lightning pulse centered on the caster.
    Pulse { center: Vec2 },
    /// One-hop chain between two enemies.
    Chain { from: Vec2, to: Vec2 },
}

/// Short-lived visual event for the renderer. Has no gameplay effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffectEvent {
    pub kind: EffectKind,
    pub remaining: f32,
}

impl StatusEffectEvent {
    pub fn new(kind: EffectKind, duration: f32) -> Self {
        Self {
            kind,
            remaining: duration,
        }
    }
}

/// Ages every event by `dt` and drops the expired ones.
pub fn decay_effects(effects: &mut Vec<StatusEffectEvent>, dt: f32) {
    for effect in effects.iter_mut() {
        effect.remaining -= dt;
    }
    effects.retain(|e| e.remaining > 0.0);
}
