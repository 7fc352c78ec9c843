use glam::Vec2;

use crate::domain::entities::{Enemy, MoveInput, Player, Projectile};

/// Velocity from directional input: normalized, then scaled to `speed`.
/// Opposing inputs cancel; no input means standing still.
pub fn input_velocity(input: MoveInput, speed: f32) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if input.up {
        dir.y -= 1.0;
    }
    if input.down {
        dir.y += 1.0;
    }
    if input.left {
        dir.x -= 1.0;
    }
    if input.right {
        dir.x += 1.0;
    }
    dir.normalize_or_zero() * speed
}

pub fn tick_player(player: &mut Player, input: MoveInput, dt: f32) {
    player.body.velocity = input_velocity(input, player.speed);
    player.body.position += player.body.velocity * dt;
}

/// Enemies chase `target` in a straight line; slowed ones at reduced speed.
pub fn tick_enemies(enemies: &mut [Enemy], target: Vec2, now: f32, slow_factor: f32, dt: f32) {
    for enemy in enemies.iter_mut() {
        let to_target = target - enemy.body.position;
        if to_target.length_squared() <= f32::EPSILON {
            continue;
        }
        let speed = if enemy.is_slowed(now) {
            enemy.speed * slow_factor
        } else {
            enemy.speed
        };
        enemy.body.velocity = to_target.normalize() * speed;
        enemy.body.position += enemy.body.velocity * dt;
    }
}

/// Integrates ballistic projectiles and drops the expired ones.
pub fn tick_projectiles(projectiles: &mut Vec<Projectile>, dt: f32) {
    for p in projectiles.iter_mut() {
        p.position += p.velocity * dt;
        p.lifetime -= dt;
    }
    projectiles.retain(|p| p.lifetime > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Elements, EnemyKind};
    use crate::domain::tuning::EnemyTuning;

    fn all_inputs() -> impl Iterator<Item = MoveInput> {
        (0u8..16).map(|bits| MoveInput {
            up: bits & 1 != 0,
            down: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
        })
    }

    #[test]
    fn nonzero_input_moves_at_exactly_player_speed() {
        for input in all_inputs() {
            let v = input_velocity(input, 200.0);
            let cancels = input.up == input.down && input.left == input.right;
            if cancels {
                assert_eq!(v, Vec2::ZERO, "{input:?}");
            } else {
                assert!((v.length() - 200.0).abs() < 1e-3, "{input:?} -> {v}");
            }
        }
    }

    #[test]
    fn zero_input_yields_zero_velocity() {
        assert_eq!(input_velocity(MoveInput::default(), 200.0), Vec2::ZERO);
    }

    #[test]
    fn slowed_enemies_move_at_half_speed() {
        let tuning = EnemyTuning::default();
        let mut enemies = vec![Enemy::new(
            "e1".into(),
            EnemyKind::Zombie,
            Vec2::new(100.0, 0.0),
            10.0,
            tuning.stats(EnemyKind::Zombie),
        )];
        enemies[0].slowed_until = Some(5.0);

        tick_enemies(&mut enemies, Vec2::ZERO, 1.0, tuning.slow_factor, 0.5);
        assert_eq!(enemies[0].body.velocity, Vec2::new(-40.0, 0.0));
        assert_eq!(enemies[0].body.position, Vec2::new(80.0, 0.0));

        tick_enemies(&mut enemies, Vec2::ZERO, 6.0, tuning.slow_factor, 0.5);
        assert_eq!(enemies[0].body.velocity, Vec2::new(-80.0, 0.0));
    }

    #[test]
    fn projectiles_expire_with_their_lifetime() {
        let mut projectiles = vec![Projectile {
            position: Vec2::ZERO,
            velocity: Vec2::new(300.0, 0.0),
            damage: 12.0,
            radius: 8.0,
            lifetime: 0.1,
            piercing: 0,
            elements: Elements::new(),
        }];
        tick_projectiles(&mut projectiles, 0.05);
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].position, Vec2::new(15.0, 0.0));
        tick_projectiles(&mut projectiles, 0.05);
        assert!(projectiles.is_empty());
    }
}
