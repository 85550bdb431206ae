//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod ability;
pub mod camera;
pub mod collision;
pub mod enemy;
pub mod menu;
pub mod progression;
pub mod schedule;
pub mod spawner;
pub mod stat;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use ability::{Ability, AbilityDef, AbilityKind, AbilityStats, Hit};
pub use camera::Camera;
pub use enemy::{DamageOutcome, Enemy, EnemyBehavior, EnemyState};
pub use menu::{FirstOffer, MenuKind, PanelInfo, SelectionMenu};
pub use progression::ProgressionTracker;
pub use schedule::{Cooldown, Countdown, StepSequence};
pub use spawner::{EnemyArchetype, KillReport, SpawnDirector, SquadPolicy};
pub use stat::{FloatStat, IntStat, Stat};
pub use state::{GameEvent, GamePhase, GameState, OpenMenu, Player};
pub use tick::{FixedStep, TickInput, tick};
pub use upgrade::{IncreaseMode, Upgrade, UpgradeCatalog, UpgradeInfo, UpgradeKind};
