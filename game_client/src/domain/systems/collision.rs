use rand::Rng;

use crate::domain::effects::{EffectKind, StatusEffectEvent};
use crate::domain::entities::{BurnStatus, Element, Elements, Enemy, Player, Projectile};
use crate::domain::tuning::SkillTuning;

/// Outcome of one collision pass.
#[derive(Debug, Default)]
pub struct CollisionReport {
    /// XP from enemies killed during the pass.
    pub xp: f32,
    pub kills: u32,
    pub effects: Vec<StatusEffectEvent>,
}

impl CollisionReport {
    fn credit(&mut self, xp: Option<f32>) {
        if let Some(xp) = xp {
            self.xp += xp;
            self.kills += 1;
        }
    }
}

/// Applies damage and returns the enemy's XP value if this hit killed it.
/// Enemies already at or below zero never credit twice.
pub fn damage_enemy(enemy: &mut Enemy, amount: f32) -> Option<f32> {
    let was_alive = enemy.body.is_alive();
    enemy.body.health -= amount;
    (was_alive && !enemy.body.is_alive()).then_some(enemy.xp_value)
}

/// Status effects of a hit. Fire and Ice refresh their timers; Water and
/// Lightning act elsewhere.
pub fn apply_elements(enemy: &mut Enemy, elements: &Elements, now: f32, tuning: &SkillTuning) {
    for element in elements.iter() {
        match element {
            Element::Fire => {
                enemy.burn = Some(BurnStatus {
                    damage_per_second: tuning.status.burn_damage_per_second,
                    until: now + tuning.status.burn_seconds,
                });
            }
            Element::Ice => enemy.slowed_until = Some(now + tuning.status.slow_seconds),
            Element::Water | Element::Lightning => {}
        }
    }
}

/// Nearest live enemy strictly within `range` of `source`, excluding `source`.
fn chain_target(enemies: &[Enemy], source: usize, range: f32) -> Option<usize> {
    let origin = enemies[source].body.position;
    enemies
        .iter()
        .enumerate()
        .filter(|(i, e)| *i != source && e.body.is_alive())
        .map(|(i, e)| (i, e.body.position.distance(origin)))
        .filter(|(_, d)| *d < range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// One-hop lightning chain from `source`. Returns the visual event when a
/// target was found.
fn chain_lightning(
    enemies: &mut [Enemy],
    source: usize,
    damage: f32,
    range: f32,
    duration: f32,
    report: &mut CollisionReport,
) {
    let Some(target) = chain_target(enemies, source, range) else {
        return;
    };
    let from = enemies[source].body.position;
    let to = enemies[target].body.position;
    report.credit(damage_enemy(&mut enemies[target], damage));
    report
        .effects
        .push(StatusEffectEvent::new(EffectKind::Chain { from, to }, duration));
}

/// Ballistic projectiles against enemies. Each projectile hits every
/// overlapping live enemy in list order until its piercing runs out.
pub fn projectile_hits(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    now: f32,
    tuning: &SkillTuning,
    report: &mut CollisionReport,
) {
    projectiles.retain_mut(|projectile| {
        for i in 0..enemies.len() {
            let enemy = &enemies[i];
            if !enemy.body.is_alive()
                || !enemy.body.overlaps(projectile.position, projectile.radius)
            {
                continue;
            }

            report.credit(damage_enemy(&mut enemies[i], projectile.damage));
            apply_elements(&mut enemies[i], &projectile.elements, now, tuning);
            if projectile.elements.contains(Element::Lightning) {
                chain_lightning(
                    enemies,
                    i,
                    projectile.damage * tuning.chain.projectile_factor,
                    tuning.chain.range,
                    tuning.effects.projectile_chain_seconds,
                    report,
                );
            }

            projectile.piercing -= 1;
            if projectile.piercing < 0 {
                return false;
            }
        }
        true
    });
}

/// Orbs against enemies. Orb damage is a per-second rate; each enemy is hit by
/// at most one orb per tick.
pub fn orbit_hits<R: Rng + ?Sized>(
    orbiting: &[Projectile],
    enemies: &mut [Enemy],
    now: f32,
    dt: f32,
    rng: &mut R,
    tuning: &SkillTuning,
    report: &mut CollisionReport,
) {
    let mut hit = vec![false; enemies.len()];
    for orb in orbiting {
        for i in 0..enemies.len() {
            if hit[i] {
                continue;
            }
            let enemy = &enemies[i];
            if !enemy.body.is_alive() || !enemy.body.overlaps(orb.position, orb.radius) {
                continue;
            }
            hit[i] = true;

            report.credit(damage_enemy(&mut enemies[i], orb.damage * dt));
            apply_elements(&mut enemies[i], &orb.elements, now, tuning);
            if orb.elements.contains(Element::Lightning)
                && rng.gen_bool(tuning.orbit.chain_chance)
            {
                chain_lightning(
                    enemies,
                    i,
                    orb.damage * tuning.orbit.chain_factor,
                    tuning.chain.range,
                    tuning.effects.orb_chain_seconds,
                    report,
                );
            }
        }
    }
}

/// Contact damage: every overlapping live enemy drains `damage` per second.
pub fn contact_damage(player: &mut Player, enemies: &[Enemy], dt: f32) {
    for enemy in enemies {
        if enemy.body.is_alive() && player.body.overlaps(enemy.body.position, enemy.body.radius) {
            player.body.health -= enemy.damage * dt;
        }
    }
}

pub fn burn_ticks(enemies: &mut [Enemy], now: f32, dt: f32, report: &mut CollisionReport) {
    for enemy in enemies.iter_mut() {
        let Some(burn) = enemy.burn else {
            continue;
        };
        if now < burn.until {
            report.credit(damage_enemy(enemy, burn.damage_per_second * dt));
        }
    }
}

/// Full collision pass in its fixed order, ending with the purge of dead
/// enemies.
#[allow(clippy::too_many_arguments)]
pub fn resolve_collisions<R: Rng + ?Sized>(
    player: &mut Player,
    enemies: &mut Vec<Enemy>,
    projectiles: &mut Vec<Projectile>,
    orbiting: &[Projectile],
    now: f32,
    dt: f32,
    rng: &mut R,
    tuning: &SkillTuning,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    projectile_hits(projectiles, enemies, now, tuning, &mut report);
    orbit_hits(orbiting, enemies, now, dt, rng, tuning, &mut report);
    contact_damage(player, enemies, dt);
    burn_ticks(enemies, now, dt, &mut report);
    enemies.retain(|e| e.body.is_alive());
    report
}
