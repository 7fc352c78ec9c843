use crate::domain::entities::{Element, Player, SkillKind};
use crate::domain::errors::ChoiceError;
use crate::domain::tuning::{PlayerTuning, SkillTuning};

/// Enhancement picked when a skill crosses into a new tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    /// One more projectile or orb. The tier bump of the level-up provides it.
    ExtraProjectile,
    Element(Element),
}

/// One resolved level-up prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillChoice {
    pub kind: SkillKind,
    pub enhancement: Option<Enhancement>,
}

impl SkillChoice {
    pub fn plain(kind: SkillKind) -> Self {
        Self {
            kind,
            enhancement: None,
        }
    }
}

/// What the level-up prompt offers for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillOffer {
    pub kind: SkillKind,
    pub current_level: u32,
    pub enhancement_required: bool,
}

/// True when taking the next level of a skill at `level` crosses into a new
/// tier. Unlocking (level 0) never does.
pub fn requires_enhancement(level: u32, tuning: &SkillTuning) -> bool {
    level > 0 && (level + 1) % tuning.tier_size == 0
}

/// Credits `amount` and processes every level-up it pays for. Returns how many
/// levels were gained; each one is a separate pending choice.
pub fn gain_xp(player: &mut Player, amount: f32, tuning: &PlayerTuning) -> u32 {
    player.xp += amount;
    let mut levels = 0;
    while player.xp >= player.xp_to_next_level {
        player.level += 1;
        player.xp -= player.xp_to_next_level;
        player.xp_to_next_level = (player.xp_to_next_level * tuning.xp_growth).floor();
        levels += 1;
    }
    levels
}

pub fn offers(player: &Player, tuning: &SkillTuning) -> Vec<SkillOffer> {
    player
        .skills
        .iter()
        .map(|skill| SkillOffer {
            kind: skill.kind,
            current_level: skill.level,
            enhancement_required: requires_enhancement(skill.level, tuning),
        })
        .collect()
}

/// Unlocks or levels the chosen skill. Tier-crossing levels must carry an
/// enhancement and other levels must not.
pub fn apply_choice(
    player: &mut Player,
    choice: SkillChoice,
    tuning: &SkillTuning,
) -> Result<(), ChoiceError> {
    let skill = player
        .skill_mut(choice.kind)
        .ok_or(ChoiceError::UnknownSkill)?;

    match (requires_enhancement(skill.level, tuning), choice.enhancement) {
        (true, None) => return Err(ChoiceError::EnhancementRequired),
        (false, Some(_)) => return Err(ChoiceError::UnexpectedEnhancement),
        _ => {}
    }

    skill.level += 1;
    if let Some(Enhancement::Element(element)) = choice.enhancement {
        skill.elements.insert(element);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&PlayerTuning::default(), &SkillTuning::default(), SkillKind::Fireball)
    }

    #[test]
    fn exact_threshold_levels_once_with_no_remainder() {
        let mut p = player();
        assert_eq!(gain_xp(&mut p, 10.0, &PlayerTuning::default()), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0.0);
        assert_eq!(p.xp_to_next_level, 12.0);
    }

    #[test]
    fn large_gain_levels_repeatedly_with_compounding_requirement() {
        let mut p = player();
        // 25 XP: 10 -> level 2 (15 left, need 12) -> level 3 (3 left, need 14).
        assert_eq!(gain_xp(&mut p, 25.0, &PlayerTuning::default()), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 3.0);
        assert_eq!(p.xp_to_next_level, 14.0);
        assert!(p.xp < p.xp_to_next_level);
    }

    #[test]
    fn below_threshold_does_nothing() {
        let mut p = player();
        assert_eq!(gain_xp(&mut p, 9.5, &PlayerTuning::default()), 0);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn unlocking_a_locked_skill() {
        let tuning = SkillTuning::default();
        let mut p = player();
        apply_choice(&mut p, SkillChoice::plain(SkillKind::Orbit), &tuning).unwrap();
        assert_eq!(p.skill(SkillKind::Orbit).map(|s| s.level), Some(1));
    }

    #[test]
    fn tier_boundary_demands_an_enhancement() {
        let tuning = SkillTuning::default();
        let mut p = player();
        if let Some(skill) = p.skill_mut(SkillKind::Fireball) {
            skill.level = 9;
        }
        let offer = offers(&p, &tuning)
            .into_iter()
            .find(|o| o.kind == SkillKind::Fireball)
            .unwrap();
        assert!(offer.enhancement_required);

        assert_eq!(
            apply_choice(&mut p, SkillChoice::plain(SkillKind::Fireball), &tuning),
            Err(ChoiceError::EnhancementRequired)
        );
        assert_eq!(p.skill(SkillKind::Fireball).map(|s| s.level), Some(9));

        let choice = SkillChoice {
            kind: SkillKind::Fireball,
            enhancement: Some(Enhancement::Element(Element::Water)),
        };
        apply_choice(&mut p, choice, &tuning).unwrap();
        let skill = p.skill(SkillKind::Fireball).unwrap();
        assert_eq!(skill.level, 10);
        assert!(skill.elements.contains(Element::Water));
    }

    #[test]
    fn enhancement_outside_a_boundary_is_rejected() {
        let tuning = SkillTuning::default();
        let mut p = player();
        let choice = SkillChoice {
            kind: SkillKind::Fireball,
            enhancement: Some(Enhancement::ExtraProjectile),
        };
        assert_eq!(
            apply_choice(&mut p, choice, &tuning),
            Err(ChoiceError::UnexpectedEnhancement)
        );
        assert!(!requires_enhancement(0, &tuning));
        assert!(requires_enhancement(19, &tuning));
    }
}
