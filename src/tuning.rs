//! Data-driven game balance
//!
//! Everything a designer tweaks lives in one serde document. Missing fields
//! fall back to the built-in defaults, so a JSON file only has to list what
//! it changes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::ability::{AbilityDef, AbilityKind, AbilityStats};
use crate::sim::camera::Camera;
use crate::sim::enemy::EnemyBehavior;
use crate::sim::progression::ProgressionTracker;
use crate::sim::spawner::{EnemyArchetype, SpawnDirector, SquadPolicy};
use crate::sim::stat::{FloatStat, IntStat};
use crate::sim::upgrade::{Upgrade, UpgradeInfo, UpgradeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub move_speed: f32,
    /// Fraction of the gap to the target velocity closed per 1/60 s
    pub lerp_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 15.0,
            lerp_speed: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    /// Population ceiling
    pub max_population: u32,
    pub spawns_per_second: f32,
    /// Recycle killed enemies instead of dropping them
    pub pooling: bool,
    pub pool_capacity: usize,
    pub squad_policy: SquadPolicy,
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        Self {
            max_population: 100,
            spawns_per_second: 1.0,
            pooling: true,
            pool_capacity: 128,
            squad_policy: SquadPolicy::Atomic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Hits are ignored this long after a non-lethal hit
    pub invincibility_duration: f32,
    pub flash_duration: f32,
    pub flash_steps: usize,
    /// Chase speed multiplier gained per second alive
    pub speed_growth: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            invincibility_duration: 0.1,
            flash_duration: 0.1,
            flash_steps: 2,
            speed_growth: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub score_per_kill: u32,
    pub level_threshold: u32,
    pub growth_factor: f32,
    /// Keep XP past the threshold instead of dropping it
    pub carry_overflow: bool,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            score_per_kill: 10,
            level_threshold: 100,
            growth_factor: 1.5,
            carry_overflow: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuTuning {
    pub max_offers: usize,
}

impl Default for MenuTuning {
    fn default() -> Self {
        Self { max_offers: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub camera: Camera,
    pub spawner: SpawnerTuning,
    pub enemy: EnemyTuning,
    pub progression: ProgressionTuning,
    pub menu: MenuTuning,
    pub archetypes: Vec<EnemyArchetype>,
    pub abilities: Vec<AbilityDef>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            camera: Camera::default(),
            spawner: SpawnerTuning::default(),
            enemy: EnemyTuning::default(),
            progression: ProgressionTuning::default(),
            menu: MenuTuning::default(),
            archetypes: default_archetypes(),
            abilities: default_abilities(),
        }
    }
}

impl Tuning {
    /// Parse and validate a balance document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject balance data that could not run
    pub fn validate(&self) -> Result<(), ConfigError> {
        SpawnDirector::new(&self.spawner, self.enemy, self.archetypes.clone())?;
        ProgressionTracker::new(&self.progression)?;
        for ability in &self.abilities {
            if ability.collision_tags.is_empty() {
                return Err(ConfigError::NoCollisionTags {
                    name: ability.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn default_archetypes() -> Vec<EnemyArchetype> {
    vec![
        EnemyArchetype {
            rarity: 6.0,
            xp: 1,
            health: 3,
            damage: 5,
            speed: 2.0,
            color: [0.85, 0.25, 0.25],
            ..EnemyArchetype::named("grunt")
        },
        EnemyArchetype {
            squad_count: 5,
            rarity: 3.0,
            xp: 1,
            size: 0.6,
            health: 1,
            damage: 2,
            speed: 3.5,
            color: [0.95, 0.75, 0.2],
            ..EnemyArchetype::named("swarmer")
        },
        EnemyArchetype {
            rarity: 1.0,
            xp: 3,
            size: 1.2,
            health: 5,
            damage: 8,
            speed: 1.5,
            color: [0.5, 0.3, 0.9],
            behavior: EnemyBehavior::Ranged {
                fire_range: 8.0,
                fire_cooldown: 2.0,
                shot_speed: 6.0,
                accuracy: 0.7,
            },
            ..EnemyArchetype::named("spitter")
        },
    ]
}

fn enemy_tags() -> Vec<String> {
    vec![EnemyArchetype::DEFAULT_TAG.to_string()]
}

fn default_abilities() -> Vec<AbilityDef> {
    vec![
        AbilityDef {
            name: "Magic Bolt".into(),
            description: "Fires bolts at the nearest enemy".into(),
            icon: "bolt".into(),
            kind: AbilityKind::AutoAim,
            stats: AbilityStats {
                cooldown: FloatStat::new(1.5),
                speed: FloatStat::new(12.0),
                interval_between_shots: FloatStat::new(0.1),
                knockback: FloatStat::new(2.0),
                ..AbilityStats::default()
            },
            upgrades: [
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Amount, 1.0), "Fire one more bolt"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::Cooldown, -0.2), "20% faster cooldown"),
                UpgradeInfo::new(Upgrade::flag(UpgradeKind::SeekTarget, true), "Bolts home in on their target"),
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::MaxCollisions, 1.0), "Bolts pierce one enemy"),
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Damage, 1.0), "+1 damage"),
                UpgradeInfo::new(Upgrade::flag(UpgradeKind::BouncesOffCameraBounds, true), "Bolts bounce off the screen edge"),
            ]
            .into_iter()
            .collect(),
            collision_tags: enemy_tags(),
            seek_target: false,
            bounces_off_camera_bounds: false,
        },
        AbilityDef {
            name: "Orbiting Blades".into(),
            description: "Blades circle around you".into(),
            icon: "blades".into(),
            kind: AbilityKind::Orbit { clockwise: true },
            stats: AbilityStats {
                area_radius: FloatStat::new(2.5),
                speed: FloatStat::new(180.0),
                amount: IntStat::new(2),
                knockback: FloatStat::new(4.0),
                ..AbilityStats::default()
            },
            upgrades: [
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Amount, 1.0), "One more blade"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::Speed, 0.25), "Blades spin 25% faster"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::AreaRadius, 0.2), "20% wider orbit"),
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Amount, 1.0), "One more blade"),
            ]
            .into_iter()
            .collect(),
            collision_tags: enemy_tags(),
            seek_target: false,
            bounces_off_camera_bounds: false,
        },
        AbilityDef {
            name: "Holy Beam".into(),
            description: "A beam sweeps out in front of you".into(),
            icon: "beam".into(),
            kind: AbilityKind::Beam { length: 12.0 },
            stats: AbilityStats {
                damage: FloatStat::new(2.0),
                cooldown: FloatStat::new(4.0),
                duration: FloatStat::new(0.75),
                knockback: FloatStat::new(0.0),
                ..AbilityStats::default()
            },
            upgrades: [
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Damage, 1.0), "+1 damage"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::Duration, 0.5), "Beam lasts 50% longer"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::Cooldown, -0.25), "25% faster cooldown"),
            ]
            .into_iter()
            .collect(),
            collision_tags: enemy_tags(),
            seek_target: false,
            bounces_off_camera_bounds: false,
        },
        AbilityDef {
            name: "Chain Lightning".into(),
            description: "Lightning strikes the closest enemy".into(),
            icon: "lightning".into(),
            kind: AbilityKind::Lightning,
            stats: AbilityStats {
                damage: FloatStat::new(3.0),
                cooldown: FloatStat::new(2.5),
                area_radius: FloatStat::new(8.0),
                knockback: FloatStat::new(0.0),
                ..AbilityStats::default()
            },
            upgrades: [
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Amount, 1.0), "Strike one more enemy"),
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::AreaRadius, 2.0), "+2 range"),
                UpgradeInfo::new(Upgrade::flat(UpgradeKind::Amount, 1.0), "Strike one more enemy"),
                UpgradeInfo::new(Upgrade::percentage(UpgradeKind::Damage, 0.5), "50% more damage"),
            ]
            .into_iter()
            .collect(),
            collision_tags: enemy_tags(),
            seek_target: false,
            bounces_off_camera_bounds: false,
        },
    ]
}
