//! Upgrade selection offers
//!
//! The simulation builds the offer list and applies the choice; showing the
//! panels and collecting the click belongs to whatever implements
//! [`SelectionMenu`].

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::ability::Ability;

/// Which menu is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuKind {
    /// Game start: only abilities the player does not have yet
    NewPower,
    /// Player level-up: any ability that can still improve
    LevelUp,
}

/// One selectable panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelInfo {
    /// Index into the game's ability list
    pub ability: usize,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// "New!" for unlocks, "Level N" for upgrades
    pub level_label: String,
    /// Current value of the stat the next upgrade changes. None for unlocks
    /// and flag upgrades.
    pub current_value: Option<f32>,
}

impl PanelInfo {
    pub fn for_ability(index: usize, ability: &Ability) -> Self {
        let (description, level_label, current_value) = if ability.is_active() {
            let next = ability.catalog().get(ability.level());
            let description = next.map(|info| info.description.clone()).unwrap_or_default();
            let current_value = next
                .and_then(|info| ability.stats.stat(info.upgrade.kind))
                .map(|stat| stat.value());
            (description, format!("Level {}", ability.level() + 1), current_value)
        } else {
            (ability.description.clone(), "New!".to_string(), None)
        };
        Self {
            ability: index,
            name: ability.name.clone(),
            description,
            icon: ability.icon.clone(),
            level_label,
            current_value,
        }
    }

    pub fn is_new(&self) -> bool {
        self.level_label == "New!"
    }
}

/// Shuffled offers for `kind`, at most `max_offers` long. May be empty.
pub fn build_offers<R: Rng>(kind: MenuKind, abilities: &[Ability], max_offers: usize, rng: &mut R) -> Vec<PanelInfo> {
    let mut candidates: Vec<usize> = abilities
        .iter()
        .enumerate()
        .filter(|(_, a)| match kind {
            MenuKind::NewPower => !a.is_active(),
            MenuKind::LevelUp => !a.is_max_level(),
        })
        .map(|(i, _)| i)
        .collect();
    candidates.shuffle(rng);
    candidates.truncate(max_offers);

    candidates
        .into_iter()
        .map(|i| PanelInfo::for_ability(i, &abilities[i]))
        .collect()
}

/// Unlock or upgrade the chosen ability
pub fn apply_selection(ability: &mut Ability) -> bool {
    if ability.is_active() {
        ability.level_up()
    } else {
        ability.enable()
    }
}

/// Presentation side of the selection flow. Returns the index into
/// `offers` the player picked, or None to close without choosing.
pub trait SelectionMenu {
    fn choose(&mut self, kind: MenuKind, offers: &[PanelInfo]) -> Option<usize>;
}

/// Always takes the first offer
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOffer;

impl SelectionMenu for FirstOffer {
    fn choose(&mut self, _kind: MenuKind, offers: &[PanelInfo]) -> Option<usize> {
        (!offers.is_empty()).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ability::{AbilityDef, AbilityKind, AbilityStats};
    use crate::sim::upgrade::{Upgrade, UpgradeInfo, UpgradeKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ability_def(name: &str) -> AbilityDef {
        AbilityDef {
            name: name.into(),
            description: format!("{} description", name),
            icon: String::new(),
            kind: AbilityKind::Lightning,
            stats: AbilityStats::default(),
            upgrades: Default::default(),
            collision_tags: vec!["Enemy".into()],
            seek_target: false,
            bounces_off_camera_bounds: false,
        }
    }

    fn ability(name: &str, upgrades: usize) -> Ability {
        Ability::from_def(&AbilityDef {
            upgrades: (0..upgrades)
                .map(|i| UpgradeInfo::new(Upgrade::flat(UpgradeKind::Damage, 1.0), format!("upgrade {}", i)))
                .collect(),
            ..ability_def(name)
        })
    }

    #[test]
    fn test_panel_labels() {
        let mut a = ability("zap", 2);
        let panel = PanelInfo::for_ability(0, &a);
        assert_eq!(panel.level_label, "New!");
        assert_eq!(panel.description, "zap description");
        assert!(panel.is_new());
        assert_eq!(panel.current_value, None);

        a.enable();
        let panel = PanelInfo::for_ability(0, &a);
        assert_eq!(panel.level_label, "Level 1");
        assert_eq!(panel.description, "upgrade 0");
        // Next upgrade is +1 damage on a base of 1
        assert_eq!(panel.current_value, Some(1.0));

        a.level_up();
        let panel = PanelInfo::for_ability(0, &a);
        assert_eq!(panel.current_value, Some(2.0));
    }

    #[test]
    fn test_flag_upgrade_has_no_current_value() {
        let mut a = Ability::from_def(&AbilityDef {
            upgrades: [UpgradeInfo::new(Upgrade::flag(UpgradeKind::SeekTarget, true), "Seeks")]
                .into_iter()
                .collect(),
            ..ability_def("homing")
        });
        a.enable();
        let panel = PanelInfo::for_ability(0, &a);
        assert_eq!(panel.description, "Seeks");
        assert_eq!(panel.current_value, None);
    }

    #[test]
    fn test_new_power_offers_only_inactive() {
        let mut abilities = vec![ability("a", 1), ability("b", 1), ability("c", 1)];
        abilities[1].enable();
        let mut rng = Pcg32::seed_from_u64(5);
        let offers = build_offers(MenuKind::NewPower, &abilities, 5, &mut rng);
        assert_eq!(offers.len(), 2);
        assert!(offers.iter().all(|o| o.ability != 1));
    }

    #[test]
    fn test_level_up_skips_maxed_and_caps() {
        let mut abilities: Vec<Ability> = (0..8).map(|i| ability(&format!("p{}", i), 1)).collect();
        abilities[0].enable();
        abilities[0].level_up();
        assert!(abilities[0].is_max_level());

        let mut rng = Pcg32::seed_from_u64(5);
        let offers = build_offers(MenuKind::LevelUp, &abilities, 5, &mut rng);
        assert_eq!(offers.len(), 5);
        assert!(offers.iter().all(|o| o.ability != 0));
    }

    #[test]
    fn test_everything_maxed_gives_empty_menu() {
        let mut abilities = vec![ability("a", 0)];
        abilities[0].enable();
        let mut rng = Pcg32::seed_from_u64(5);
        assert!(build_offers(MenuKind::LevelUp, &abilities, 5, &mut rng).is_empty());
        assert!(build_offers(MenuKind::NewPower, &abilities, 5, &mut rng).is_empty());
        assert_eq!(FirstOffer.choose(MenuKind::LevelUp, &[]), None);
    }

    #[test]
    fn test_apply_selection_enables_then_levels() {
        let mut a = ability("a", 1);
        assert!(apply_selection(&mut a));
        assert_eq!(a.level(), 0);
        assert!(apply_selection(&mut a));
        assert_eq!(a.level(), 1);
        assert!(!apply_selection(&mut a));
    }
}
