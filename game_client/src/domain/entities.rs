use glam::Vec2;
use std::fmt;
use std::str::FromStr;

use super::tuning::{EnemyStats, PlayerTuning, SkillTuning};

/// Directional input sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Capability fields shared by every simulated body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
}

impl Body {
    pub fn new(position: Vec2, radius: f32, health: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            health,
            max_health: health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Circle overlap test, strict so touching edges do not collide.
    pub fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        self.position.distance(position) < self.radius + radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub xp: f32,
    pub level: u32,
    pub xp_to_next_level: f32,
    pub skills: Vec<Skill>,
}

impl Player {
    /// Fresh player at the origin with `starting` unlocked and every other
    /// skill present but locked.
    pub fn new(tuning: &PlayerTuning, skills: &SkillTuning, starting: SkillKind) -> Self {
        let skills = SkillKind::ALL
            .iter()
            .map(|&kind| {
                let mut skill = Skill::locked(kind, skills);
                if kind == starting {
                    skill.level = 1;
                }
                skill
            })
            .collect();

        Self {
            body: Body::new(Vec2::ZERO, tuning.radius, tuning.max_health),
            speed: tuning.speed,
            xp: 0.0,
            level: 1,
            xp_to_next_level: tuning.xp_to_first_level,
            skills,
        }
    }

    pub fn skill(&self, kind: SkillKind) -> Option<&Skill> {
        self.skills.iter().find(|s| s.kind == kind)
    }

    pub fn skill_mut(&mut self, kind: SkillKind) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Zombie,
    Ghost,
    Demon,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Zombie, EnemyKind::Ghost, EnemyKind::Demon];
}

/// Damage-over-time status. Re-applying refreshes `until`; it never stacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnStatus {
    pub damage_per_second: f32,
    pub until: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: String,
    pub body: Body,
    pub speed: f32,
    pub damage: f32,
    pub xp_value: f32,
    pub kind: EnemyKind,
    /// Absolute sim time at which the slow wears off.
    pub slowed_until: Option<f32>,
    pub burn: Option<BurnStatus>,
}

impl Enemy {
    pub fn new(
        id: String,
        kind: EnemyKind,
        position: Vec2,
        health: f32,
        stats: &EnemyStats,
    ) -> Self {
        Self {
            id,
            body: Body::new(position, stats.radius, health),
            speed: stats.speed,
            damage: stats.damage,
            xp_value: stats.xp_value,
            kind,
            slowed_until: None,
            burn: None,
        }
    }

    pub fn is_slowed(&self, now: f32) -> bool {
        self.slowed_until.is_some_and(|until| now < until)
    }

    pub fn is_burning(&self, now: f32) -> bool {
        self.burn.is_some_and(|burn| now < burn.until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Fire,
    Water,
    Lightning,
    Ice,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Water, Element::Lightning, Element::Ice];

    pub fn as_str(self) -> &'static str {
        match self {
            Element::Fire => "FIRE",
            Element::Water => "WATER",
            Element::Lightning => "LIGHTNING",
            Element::Ice => "ICE",
        }
    }
}

impl FromStr for Element {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIRE" => Ok(Element::Fire),
            "WATER" => Ok(Element::Water),
            "LIGHTNING" => Ok(Element::Lightning),
            "ICE" => Ok(Element::Ice),
            _ => Err(()),
        }
    }
}

/// Ordered set of elements. Insertion keeps the first occurrence only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elements(Vec<Element>);

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the element was already present.
    pub fn insert(&mut self, element: Element) -> bool {
        if self.contains(element) {
            return false;
        }
        self.0.push(element);
        true
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0.contains(&element)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Element> for Elements {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        let mut elements = Elements::new();
        for element in iter {
            elements.insert(element);
        }
        elements
    }
}

/// A ballistic projectile (finite lifetime, integrates velocity) or an orb
/// (infinite lifetime, placed around the player every tick).
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub lifetime: f32,
    /// Remaining extra hits; the projectile retires once this goes negative.
    pub piercing: i32,
    pub elements: Elements,
}

impl Projectile {
    pub fn is_orbiting(&self) -> bool {
        self.lifetime.is_infinite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillKind {
    Fireball,
    Lightning,
    Orbit,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Fireball, SkillKind::Lightning, SkillKind::Orbit];

    pub fn id(self) -> &'static str {
        match self {
            SkillKind::Fireball => "fireball",
            SkillKind::Lightning => "lightning",
            SkillKind::Orbit => "orbit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        SkillKind::ALL.into_iter().find(|k| k.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: String,
    /// 0 means locked; a locked skill never casts.
    pub level: u32,
    pub cooldown: f32,
    pub current_cooldown: f32,
    pub kind: SkillKind,
    pub elements: Elements,
}

impl Skill {
    pub fn locked(kind: SkillKind, tuning: &SkillTuning) -> Self {
        Self {
            id: kind.id().to_string(),
            level: 0,
            cooldown: tuning.base_cooldown(kind),
            current_cooldown: 0.0,
            kind,
            elements: Elements::new(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.level > 0
    }
}

/// Playable characters; each starts with one skill unlocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Character {
    #[default]
    Warrior,
    Mage,
    Ranger,
}

impl Character {
    pub fn starting_skill(self) -> SkillKind {
        match self {
            Character::Warrior => SkillKind::Orbit,
            Character::Mage => SkillKind::Lightning,
            Character::Ranger => SkillKind::Fireball,
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Character::Warrior => "warrior",
            Character::Mage => "mage",
            Character::Ranger => "ranger",
        };
        f.write_str(name)
    }
}

impl FromStr for Character {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warrior" => Ok(Character::Warrior),
            "mage" => Ok(Character::Mage),
            "ranger" => Ok(Character::Ranger),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn characters_unlock_their_starting_skill_only() {
        let player = Player::new(
            &PlayerTuning::default(),
            &SkillTuning::default(),
            Character::Mage.starting_skill(),
        );
        assert_eq!(player.skills.len(), 3);
        assert_eq!(player.skill(SkillKind::Lightning).map(|s| s.level), Some(1));
        assert_eq!(player.skill(SkillKind::Fireball).map(|s| s.level), Some(0));
        assert_eq!(player.skill(SkillKind::Orbit).map(|s| s.level), Some(0));
        assert_eq!(player.body.health, 100.0);
        assert_eq!(player.xp_to_next_level, 10.0);
    }

    #[test]
    fn elements_deduplicate() {
        let mut elements = Elements::new();
        assert!(elements.insert(Element::Fire));
        assert!(!elements.insert(Element::Fire));
        assert!(elements.insert(Element::Ice));
        assert_eq!(elements.iter().collect::<Vec<_>>(), vec![Element::Fire, Element::Ice]);
    }

    #[test]
    fn character_names_parse_case_insensitively() {
        assert_eq!("Ranger".parse::<Character>(), Ok(Character::Ranger));
        assert!("bard".parse::<Character>().is_err());
    }
}
