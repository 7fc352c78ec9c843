use glam::Vec2;

use super::collision::{CollisionReport, apply_elements, damage_enemy};
use crate::domain::effects::{EffectKind, StatusEffectEvent};
use crate::domain::entities::{Element, Elements, Enemy, Player, Projectile, Skill, SkillKind};
use crate::domain::tuning::SkillTuning;

/// Shared rotation of the orbit ring. Owned by one simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitState {
    pub angle: f32,
}

pub fn fireball_count(level: u32, tuning: &SkillTuning) -> usize {
    1 + tuning.tier(level)
}

pub fn fireball_damage(level: u32, tuning: &SkillTuning) -> f32 {
    tuning.fireball.base_damage + level as f32 * tuning.fireball.damage_per_level
}

pub fn fireball_cooldown(skill: &Skill, tuning: &SkillTuning) -> f32 {
    (skill.cooldown - skill.level as f32 * tuning.fireball.cooldown_step)
        .max(tuning.fireball.min_cooldown)
}

pub fn lightning_damage(level: u32, tuning: &SkillTuning) -> f32 {
    tuning.lightning.base_damage + level as f32 * tuning.lightning.damage_per_level
}

pub fn orb_count(level: u32, tuning: &SkillTuning) -> usize {
    tuning.orbit.base_count + tuning.tier(level)
}

pub fn orb_damage(level: u32, tuning: &SkillTuning) -> f32 {
    tuning.orbit.base_damage + level as f32 * tuning.orbit.damage_per_level
}

/// One ballistic projectile toward each of the `count` nearest live enemies.
pub fn cast_fireballs(
    origin: Vec2,
    enemies: &[Enemy],
    level: u32,
    elements: &Elements,
    tuning: &SkillTuning,
) -> Vec<Projectile> {
    let mut targets: Vec<(f32, Vec2)> = enemies
        .iter()
        .filter(|e| e.body.is_alive())
        .map(|e| (e.body.position.distance(origin), e.body.position))
        .collect();
    targets.sort_by(|a, b| a.0.total_cmp(&b.0));

    let piercing = if elements.contains(Element::Water) {
        tuning.fireball.water_piercing
    } else {
        0
    };

    targets
        .into_iter()
        .take(fireball_count(level, tuning))
        .filter(|(distance, _)| *distance > 0.0)
        .map(|(_, target)| Projectile {
            position: origin,
            velocity: (target - origin).normalize() * tuning.fireball.speed,
            damage: fireball_damage(level, tuning),
            radius: tuning.fireball.radius,
            lifetime: tuning.fireball.lifetime,
            piercing,
            elements: elements.clone(),
        })
        .collect()
}

/// Instant pulse around `origin` hitting the first live enemies in range, up
/// to the target cap. Returns how many were hit.
pub fn lightning_pulse(
    origin: Vec2,
    enemies: &mut [Enemy],
    level: u32,
    elements: &Elements,
    now: f32,
    tuning: &SkillTuning,
    report: &mut CollisionReport,
) -> usize {
    let damage = lightning_damage(level, tuning);
    let radius_sq = tuning.lightning.radius * tuning.lightning.radius;
    let mut hit = 0;

    for enemy in enemies.iter_mut() {
        if hit >= tuning.lightning.max_targets {
            break;
        }
        if !enemy.body.is_alive() || enemy.body.position.distance_squared(origin) > radius_sq {
            continue;
        }
        if let Some(xp) = damage_enemy(enemy, damage) {
            report.xp += xp;
            report.kills += 1;
        }
        apply_elements(enemy, elements, now, tuning);
        hit += 1;
    }

    if hit > 0 {
        report.effects.push(StatusEffectEvent::new(
            EffectKind::Pulse { center: origin },
            tuning.effects.pulse_seconds,
        ));
    }
    hit
}

fn any_in_range(origin: Vec2, enemies: &[Enemy], radius: f32) -> bool {
    enemies
        .iter()
        .any(|e| e.body.is_alive() && e.body.position.distance(origin) <= radius)
}

/// Keeps the ring at the size the orbit level asks for, regenerating it with
/// even spacing when the size changes, and keeps orb damage and elements in
/// step with the skill.
pub fn sync_orbit_ring(
    orbiting: &mut Vec<Projectile>,
    skill: Option<&Skill>,
    tuning: &SkillTuning,
) {
    let Some(skill) = skill.filter(|s| s.is_unlocked()) else {
        orbiting.clear();
        return;
    };

    let count = orb_count(skill.level, tuning);
    let damage = orb_damage(skill.level, tuning);
    if orbiting.len() != count {
        *orbiting = (0..count)
            .map(|_| Projectile {
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                damage,
                radius: tuning.orbit.radius,
                lifetime: f32::INFINITY,
                piercing: 0,
                elements: skill.elements.clone(),
            })
            .collect();
    }
    for orb in orbiting.iter_mut() {
        orb.damage = damage;
        orb.elements = skill.elements.clone();
    }
}

/// Advances the shared ring angle and places each orb at
/// `slot + shared angle` around `center`.
pub fn advance_orbit(
    orbiting: &mut [Projectile],
    state: &mut OrbitState,
    center: Vec2,
    dt: f32,
    tuning: &SkillTuning,
) {
    state.angle = (state.angle + dt * tuning.orbit.angular_speed) % std::f32::consts::TAU;
    let count = orbiting.len();
    for (i, orb) in orbiting.iter_mut().enumerate() {
        let slot = i as f32 / count as f32 * std::f32::consts::TAU;
        orb.position = center + Vec2::from_angle(slot + state.angle) * tuning.orbit.orbit_radius;
    }
}

/// Counts every skill's cooldown down and casts the ready ones. New
/// projectiles land in `projectiles`; pulse kills and visual events land in
/// the returned report.
#[allow(clippy::too_many_arguments)]
pub fn tick_skills(
    player: &mut Player,
    enemies: &mut [Enemy],
    projectiles: &mut Vec<Projectile>,
    orbiting: &mut Vec<Projectile>,
    orbit: &mut OrbitState,
    now: f32,
    dt: f32,
    tuning: &SkillTuning,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let origin = player.body.position;

    for skill in player.skills.iter_mut() {
        if !skill.is_unlocked() {
            continue;
        }
        skill.current_cooldown = (skill.current_cooldown - dt).max(0.0);
        if skill.current_cooldown > 0.0 {
            continue;
        }

        match skill.kind {
            SkillKind::Fireball => {
                let cast = cast_fireballs(origin, enemies, skill.level, &skill.elements, tuning);
                if !cast.is_empty() {
                    projectiles.extend(cast);
                    skill.current_cooldown = fireball_cooldown(skill, tuning);
                }
            }
            SkillKind::Lightning => {
                if any_in_range(origin, enemies, tuning.lightning.radius) {
                    lightning_pulse(
                        origin,
                        enemies,
                        skill.level,
                        &skill.elements,
                        now,
                        tuning,
                        &mut report,
                    );
                    skill.current_cooldown = skill.cooldown;
                }
            }
            SkillKind::Orbit => {}
        }
    }

    sync_orbit_ring(orbiting, player.skill(SkillKind::Orbit), tuning);
    advance_orbit(orbiting, orbit, origin, dt, tuning);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EnemyKind;
    use crate::domain::tuning::{EnemyTuning, PlayerTuning};

    fn enemy_at(id: &str, x: f32, y: f32) -> Enemy {
        let tuning = EnemyTuning::default();
        Enemy::new(
            id.into(),
            EnemyKind::Demon,
            Vec2::new(x, y),
            100.0,
            tuning.stats(EnemyKind::Demon),
        )
    }

    fn player_with(kind: SkillKind, level: u32) -> Player {
        let mut player = Player::new(&PlayerTuning::default(), &SkillTuning::default(), kind);
        if let Some(skill) = player.skill_mut(kind) {
            skill.level = level;
        }
        player
    }

    /// Projectile and orbit buffers threaded through `tick_skills`.
    #[derive(Default)]
    struct Rig {
        projectiles: Vec<Projectile>,
        orbiting: Vec<Projectile>,
        orbit: OrbitState,
    }

    impl Rig {
        fn tick(&mut self, player: &mut Player, enemies: &mut [Enemy], dt: f32) -> CollisionReport {
            tick_skills(
                player,
                enemies,
                &mut self.projectiles,
                &mut self.orbiting,
                &mut self.orbit,
                0.0,
                dt,
                &SkillTuning::default(),
            )
        }
    }

    #[test]
    fn fireball_targets_nearest_enemies_per_tier() {
        let tuning = SkillTuning::default();
        let enemies = vec![
            enemy_at("far", 300.0, 0.0),
            enemy_at("near", 0.0, 50.0),
            enemy_at("mid", -100.0, 0.0),
        ];

        let single = cast_fireballs(Vec2::ZERO, &enemies, 9, &Elements::new(), &tuning);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].velocity, Vec2::new(0.0, 300.0));
        assert_eq!(single[0].damage, 28.0);
        assert_eq!(single[0].piercing, 0);

        let water: Elements = [Element::Water].into_iter().collect();
        let double = cast_fireballs(Vec2::ZERO, &enemies, 10, &water, &tuning);
        assert_eq!(double.len(), 2);
        assert_eq!(double[1].velocity, Vec2::new(-300.0, 0.0));
        assert_eq!(double[1].piercing, 2);
    }

    #[test]
    fn fireball_without_enemies_keeps_cooldown_ready() {
        let mut player = player_with(SkillKind::Fireball, 1);
        let mut rig = Rig::default();

        rig.tick(&mut player, &mut [], 0.016);

        assert!(rig.projectiles.is_empty());
        assert_eq!(
            player.skill(SkillKind::Fireball).map(|s| s.current_cooldown),
            Some(0.0)
        );
    }

    #[test]
    fn fireball_cast_resets_scaled_cooldown() {
        let mut player = player_with(SkillKind::Fireball, 4);
        let mut enemies = vec![enemy_at("a", 100.0, 0.0)];
        let mut rig = Rig::default();

        rig.tick(&mut player, &mut enemies, 0.016);

        assert_eq!(rig.projectiles.len(), 1);
        let cooldown = player
            .skill(SkillKind::Fireball)
            .map(|s| s.current_cooldown)
            .unwrap_or_default();
        assert!((cooldown - 1.3).abs() < 1e-6);
    }

    #[test]
    fn lightning_hits_at_most_three_in_range() {
        let tuning = SkillTuning::default();
        let mut enemies = vec![
            enemy_at("a", 10.0, 0.0),
            enemy_at("out", 250.0, 0.0),
            enemy_at("b", 0.0, 199.0),
            enemy_at("c", -50.0, 0.0),
            enemy_at("d", 0.0, -20.0),
        ];
        let mut report = CollisionReport::default();

        let hit = lightning_pulse(
            Vec2::ZERO,
            &mut enemies,
            1,
            &Elements::new(),
            0.0,
            &tuning,
            &mut report,
        );

        assert_eq!(hit, 3);
        let damaged: Vec<&str> = enemies
            .iter()
            .filter(|e| e.body.health < 100.0)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(damaged, vec!["a", "b", "c"]);
        assert_eq!(enemies[0].body.health, 77.0);
        assert_eq!(report.effects.len(), 1);
    }

    #[test]
    fn lightning_out_of_range_neither_fires_nor_resets() {
        let mut player = player_with(SkillKind::Lightning, 1);
        let mut enemies = vec![enemy_at("out", 400.0, 0.0)];

        let report = Rig::default().tick(&mut player, &mut enemies, 0.016);

        assert!(report.effects.is_empty());
        assert_eq!(enemies[0].body.health, 100.0);
        assert_eq!(
            player.skill(SkillKind::Lightning).map(|s| s.current_cooldown),
            Some(0.0)
        );
    }

    #[test]
    fn orbit_ring_regenerates_when_tier_changes() {
        let mut player = player_with(SkillKind::Orbit, 9);
        let mut rig = Rig::default();

        rig.tick(&mut player, &mut [], 0.0);
        assert_eq!(rig.orbiting.len(), 2);
        assert_eq!(rig.orbiting[0].damage, 26.0);
        assert!((rig.orbiting[0].position - Vec2::new(60.0, 0.0)).length() < 1e-4);
        assert!((rig.orbiting[1].position - Vec2::new(-60.0, 0.0)).length() < 1e-4);

        if let Some(skill) = player.skill_mut(SkillKind::Orbit) {
            skill.level = 10;
        }
        rig.tick(&mut player, &mut [], 0.0);
        assert_eq!(rig.orbiting.len(), 3);
        assert!(rig.orbiting.iter().all(|o| o.is_orbiting()));
    }

    #[test]
    fn orbit_angle_is_per_simulation_state() {
        let tuning = SkillTuning::default();
        let mut ring = vec![Projectile {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            damage: 10.0,
            radius: 10.0,
            lifetime: f32::INFINITY,
            piercing: 0,
            elements: Elements::new(),
        }];
        let mut a = OrbitState::default();
        let b = OrbitState::default();

        advance_orbit(&mut ring, &mut a, Vec2::ZERO, 0.25, &tuning);
        assert!((a.angle - 0.5).abs() < 1e-6);
        assert_eq!(b.angle, 0.0);
        let expected = Vec2::from_angle(0.5) * 60.0;
        assert!((ring[0].position - expected).length() < 1e-4);
    }

    #[test]
    fn locked_orbit_has_no_ring() {
        let tuning = SkillTuning::default();
        let player = player_with(SkillKind::Fireball, 1);
        let mut orbiting = vec![];
        sync_orbit_ring(&mut orbiting, player.skill(SkillKind::Orbit), &tuning);
        assert!(orbiting.is_empty());
    }
}
