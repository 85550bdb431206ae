//! Upgrade descriptors and per-ability catalogs

use serde::{Deserialize, Serialize};

/// Which ability property an upgrade touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    Cooldown,
    AreaRadius,
    Speed,
    Duration,
    Amount,
    MaxCollisions,
    Knockback,
    CritChance,
    CritMultiplier,
    LuckChance,
    IntervalBetweenShots,
    SeekTarget,
    BouncesOffCameraBounds,
}

impl UpgradeKind {
    /// Behavior flags are switched, not scaled
    pub fn is_flag(&self) -> bool {
        matches!(self, UpgradeKind::SeekTarget | UpgradeKind::BouncesOffCameraBounds)
    }
}

/// How the upgrade amount is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IncreaseMode {
    /// Added to the stat's base value
    #[default]
    Flat,
    /// Added onto the stat's multiplier (0.1 = +10%)
    Percentage,
    /// Sets a behavior flag to `bool_value`
    Boolean,
}

/// A single upgrade step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    #[serde(default)]
    pub mode: IncreaseMode,
    #[serde(default)]
    pub amount: f32,
    #[serde(default)]
    pub bool_value: bool,
}

impl Upgrade {
    pub fn flat(kind: UpgradeKind, amount: f32) -> Self {
        Self {
            kind,
            mode: IncreaseMode::Flat,
            amount,
            bool_value: false,
        }
    }

    pub fn percentage(kind: UpgradeKind, amount: f32) -> Self {
        Self {
            kind,
            mode: IncreaseMode::Percentage,
            amount,
            bool_value: false,
        }
    }

    pub fn flag(kind: UpgradeKind, value: bool) -> Self {
        Self {
            kind,
            mode: IncreaseMode::Boolean,
            amount: 0.0,
            bool_value: value,
        }
    }
}

/// Upgrade plus the text the selection menu shows for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeInfo {
    pub upgrade: Upgrade,
    #[serde(default)]
    pub description: String,
}

impl UpgradeInfo {
    pub fn new(upgrade: Upgrade, description: impl Into<String>) -> Self {
        Self {
            upgrade,
            description: description.into(),
        }
    }
}

/// Ordered upgrades for one ability. Entry `i` is applied when the ability
/// goes from level `i` to `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeCatalog {
    entries: Vec<UpgradeInfo>,
}

impl UpgradeCatalog {
    pub fn new(entries: Vec<UpgradeInfo>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upgrade unlocked at `level`, if the catalog goes that far
    pub fn get(&self, level: i32) -> Option<&UpgradeInfo> {
        usize::try_from(level).ok().and_then(|i| self.entries.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeInfo> {
        self.entries.iter()
    }
}

impl FromIterator<UpgradeInfo> for UpgradeCatalog {
    fn from_iter<I: IntoIterator<Item = UpgradeInfo>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
