use std::collections::HashMap;

use crate::domain::entities::{Enemy, EnemyKind, Player};
use crate::domain::snapshot::{AuthoritativeEnemy, AuthoritativeState, AvatarState, SkillSummary};
use crate::domain::tuning::EnemyTuning;

/// Host-side snapshot of the enemy population. Positions and health are
/// rounded to whole units and the clock to a tenth of a second.
pub fn capture_authoritative(enemies: &[Enemy], game_time: f32) -> AuthoritativeState {
    AuthoritativeState {
        enemies: enemies
            .iter()
            .map(|e| AuthoritativeEnemy {
                id: e.id.clone(),
                position: e.body.position.round(),
                health: e.body.health.round(),
                max_health: Some(e.body.max_health),
                kind: Some(e.kind),
                radius: Some(e.body.radius),
                speed: Some(e.speed),
                damage: Some(e.damage),
                xp_value: Some(e.xp_value),
            })
            .collect(),
        game_time: (game_time * 10.0).round() / 10.0,
    }
}

/// Follower-side merge: the incoming list defines which enemies exist and
/// where; local motion and status effects survive by id. Missing fields fall
/// back to the local copy, then to the kind's table entry.
pub fn reconcile_enemies(
    local: Vec<Enemy>,
    incoming: &[AuthoritativeEnemy],
    tuning: &EnemyTuning,
) -> Vec<Enemy> {
    let mut known: HashMap<String, Enemy> = local.into_iter().map(|e| (e.id.clone(), e)).collect();

    incoming
        .iter()
        .map(|auth| {
            let previous = known.remove(&auth.id);
            let kind = auth
                .kind
                .or(previous.as_ref().map(|e| e.kind))
                .unwrap_or(EnemyKind::Zombie);
            let stats = tuning.stats(kind);

            match previous {
                Some(mut enemy) => {
                    enemy.kind = kind;
                    enemy.body.position = auth.position;
                    enemy.body.health = auth.health;
                    enemy.body.max_health = auth.max_health.unwrap_or(enemy.body.max_health);
                    enemy.body.radius = auth.radius.unwrap_or(enemy.body.radius);
                    enemy.speed = auth.speed.unwrap_or(enemy.speed);
                    enemy.damage = auth.damage.unwrap_or(enemy.damage);
                    enemy.xp_value = auth.xp_value.unwrap_or(enemy.xp_value);
                    enemy
                }
                None => {
                    let mut enemy =
                        Enemy::new(auth.id.clone(), kind, auth.position, auth.health, stats);
                    enemy.body.max_health = auth.max_health.unwrap_or(stats.health);
                    enemy.body.radius = auth.radius.unwrap_or(stats.radius);
                    enemy.speed = auth.speed.unwrap_or(stats.speed);
                    enemy.damage = auth.damage.unwrap_or(stats.damage);
                    enemy.xp_value = auth.xp_value.unwrap_or(stats.xp_value);
                    enemy
                }
            }
        })
        .collect()
}

pub fn avatar_state(player: &Player) -> AvatarState {
    AvatarState {
        position: player.body.position,
        health: player.body.health,
        level: player.level,
        skills: player
            .skills
            .iter()
            .map(|s| SkillSummary {
                id: s.id.clone(),
                level: s.level,
                elements: s.elements.iter().collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BurnStatus, SkillKind};
    use crate::domain::tuning::{PlayerTuning, SkillTuning};
    use glam::Vec2;

    fn bare(id: &str, x: f32, y: f32, health: f32) -> AuthoritativeEnemy {
        AuthoritativeEnemy {
            id: id.into(),
            position: Vec2::new(x, y),
            health,
            max_health: None,
            kind: None,
            radius: None,
            speed: None,
            damage: None,
            xp_value: None,
        }
    }

    #[test]
    fn merge_keeps_local_velocity_and_status() {
        let tuning = EnemyTuning::default();
        let mut local = Enemy::new(
            "e1".into(),
            EnemyKind::Ghost,
            Vec2::new(8.0, 9.0),
            15.0,
            tuning.stats(EnemyKind::Ghost),
        );
        local.body.velocity = Vec2::new(3.0, 0.0);
        local.slowed_until = Some(4.0);
        local.burn = Some(BurnStatus {
            damage_per_second: 2.0,
            until: 5.0,
        });

        let merged = reconcile_enemies(vec![local], &[bare("e1", 10.0, 10.0, 5.0)], &tuning);
        assert_eq!(merged.len(), 1);
        let e = &merged[0];
        assert_eq!(e.body.position, Vec2::new(10.0, 10.0));
        assert_eq!(e.body.health, 5.0);
        assert_eq!(e.body.velocity, Vec2::new(3.0, 0.0));
        assert_eq!(e.kind, EnemyKind::Ghost);
        assert_eq!(e.slowed_until, Some(4.0));
        assert!(e.burn.is_some());
    }

    #[test]
    fn unknown_enemies_get_kind_defaults_and_vanished_ones_go() {
        let tuning = EnemyTuning::default();
        let stale = Enemy::new(
            "gone".into(),
            EnemyKind::Zombie,
            Vec2::ZERO,
            10.0,
            tuning.stats(EnemyKind::Zombie),
        );
        let mut fresh = bare("new", 1.0, 2.0, 20.0);
        fresh.kind = Some(EnemyKind::Demon);

        let incoming = [fresh, bare("plain", 0.0, 0.0, 3.0)];
        let merged = reconcile_enemies(vec![stale], &incoming, &tuning);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["new", "plain"]);

        let demon = tuning.stats(EnemyKind::Demon);
        assert_eq!(merged[0].body.radius, demon.radius);
        assert_eq!(merged[0].body.max_health, demon.health);
        assert_eq!(merged[0].body.velocity, Vec2::ZERO);
        assert_eq!(merged[1].kind, EnemyKind::Zombie);
    }

    #[test]
    fn capture_rounds_for_the_wire() {
        let tuning = EnemyTuning::default();
        let mut e = Enemy::new(
            "e1".into(),
            EnemyKind::Zombie,
            Vec2::new(10.4, -3.6),
            10.0,
            tuning.stats(EnemyKind::Zombie),
        );
        e.body.health = 6.7;
        let state = capture_authoritative(&[e], 12.34);
        assert_eq!(state.enemies[0].position, Vec2::new(10.0, -4.0));
        assert_eq!(state.enemies[0].health, 7.0);
        assert_eq!(state.enemies[0].kind, Some(EnemyKind::Zombie));
        assert!((state.game_time - 12.3).abs() < 1e-4);
    }

    #[test]
    fn avatar_lists_every_skill() {
        let player = Player::new(
            &PlayerTuning::default(),
            &SkillTuning::default(),
            SkillKind::Lightning,
        );
        let avatar = avatar_state(&player);
        assert_eq!(avatar.level, 1);
        assert_eq!(avatar.skills.len(), 3);
        let lightning = avatar
            .skills
            .iter()
            .find(|s| s.id == SkillKind::Lightning.id())
            .unwrap();
        assert_eq!(lightning.level, 1);
    }
}
