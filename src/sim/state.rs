//! Game state and the selection flow
//!
//! `GameState` wires the spawner, abilities and progression together. The
//! components never write each other's fields: kills flow spawner ->
//! progression, level-ups flow progression -> menu -> abilities.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ability::Ability;
use super::camera::Camera;
use super::enemy::EnemyShot;
use super::menu::{MenuKind, PanelInfo, SelectionMenu, apply_selection, build_offers};
use super::progression::ProgressionTracker;
use super::spawner::{KillReport, SpawnDirector};
use crate::error::ConfigError;
use crate::tuning::{PlayerTuning, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// A selection menu is open; the simulation clock is stopped
    Selecting,
    Playing,
    Paused,
    /// Player died
    GameOver,
}

/// Notifications for presentation (HUD, sounds, menus)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted,
    MenuOpened(MenuKind),
    MenuClosed,
    AbilitySelected { name: String, level: i32 },
    LevelUp { level: u32 },
    EnemyKilled(KillReport),
    PlayerHit { damage: f32, health: f32 },
    GameEnded { score: u32, level: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Last non-zero movement direction
    pub facing: Vec2,
    pub health: f32,
    pub max_health: f32,
    move_speed: f32,
    lerp_speed: f32,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            facing: Vec2::Y,
            health: tuning.max_health,
            max_health: tuning.max_health,
            move_speed: tuning.move_speed,
            lerp_speed: tuning.lerp_speed,
        }
    }

    /// Ease velocity toward `dir * move_speed` and integrate
    pub fn update(&mut self, dt: f32, dir: Vec2) {
        let target = dir.clamp_length_max(1.0) * self.move_speed;
        // lerp_speed is per 1/60 s; keep the feel independent of dt
        let t = 1.0 - (1.0 - self.lerp_speed.clamp(0.0, 1.0)).powf(dt * 60.0);
        self.vel = self.vel.lerp(target, t);
        self.pos += self.vel * dt;
        if dir.length_squared() > f32::EPSILON {
            self.facing = dir.normalize();
        }
    }

    /// Returns true if this hit was fatal
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// An open selection menu
#[derive(Debug, Clone, PartialEq)]
pub struct OpenMenu {
    pub kind: MenuKind,
    pub offers: Vec<PanelInfo>,
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds of play
    pub elapsed: f32,
    pub player: Player,
    pub camera: Camera,
    pub spawner: SpawnDirector,
    pub abilities: Vec<Ability>,
    pub progression: ProgressionTracker,
    /// Shots fired by ranged enemies
    pub enemy_shots: Vec<EnemyShot>,
    pub(crate) rng: Pcg32,
    menu: Option<OpenMenu>,
    pending_level_ups: u32,
    max_offers: usize,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build every component from `tuning` and open the starting menu
    pub fn new(tuning: &Tuning, seed: u64) -> Result<Self, ConfigError> {
        let spawner = SpawnDirector::new(&tuning.spawner, tuning.enemy, tuning.archetypes.clone())?;
        let progression = ProgressionTracker::new(&tuning.progression)?;
        let abilities = tuning.abilities.iter().map(Ability::from_def).collect();

        let mut state = Self {
            seed,
            phase: GamePhase::Playing,
            time_ticks: 0,
            elapsed: 0.0,
            player: Player::new(&tuning.player),
            camera: tuning.camera,
            spawner,
            abilities,
            progression,
            enemy_shots: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            menu: None,
            pending_level_ups: 0,
            max_offers: tuning.menu.max_offers,
            events: Vec::new(),
        };

        log::info!("Game started with seed {}", seed);
        state.events.push(GameEvent::GameStarted);
        state.open_menu(MenuKind::NewPower);
        Ok(state)
    }

    pub fn menu(&self) -> Option<&OpenMenu> {
        self.menu.as_ref()
    }

    pub fn pending_level_ups(&self) -> u32 {
        self.pending_level_ups
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Show a menu and stop the clock. An empty offer list never opens.
    fn open_menu(&mut self, kind: MenuKind) -> bool {
        let offers = build_offers(kind, &self.abilities, self.max_offers, &mut self.rng);
        if offers.is_empty() {
            log::info!("No {:?} offers available; skipping menu", kind);
            return false;
        }
        log::info!("Opening {:?} menu with {} offers", kind, offers.len());
        self.menu = Some(OpenMenu { kind, offers });
        self.phase = GamePhase::Selecting;
        self.events.push(GameEvent::MenuOpened(kind));
        true
    }

    /// Record a player level-up; shown now or after the open menu closes
    pub(crate) fn queue_level_up(&mut self) {
        self.pending_level_ups += 1;
        self.events.push(GameEvent::LevelUp {
            level: self.progression.level(),
        });
        if self.menu.is_none() {
            self.show_next_level_up();
        }
    }

    fn show_next_level_up(&mut self) {
        while self.pending_level_ups > 0 {
            self.pending_level_ups -= 1;
            if self.open_menu(MenuKind::LevelUp) {
                return;
            }
        }
    }

    /// Apply the player's pick (an index into the open menu's offers) and
    /// close the menu. `None` closes without choosing.
    pub fn select_offer(&mut self, choice: Option<usize>) -> bool {
        let Some(menu) = self.menu.take() else {
            log::warn!("select_offer called with no menu open");
            return false;
        };

        let mut applied = false;
        if let Some(panel) = choice.and_then(|i| menu.offers.get(i)) {
            if let Some(ability) = self.abilities.get_mut(panel.ability) {
                applied = apply_selection(ability);
                log::info!("Selected '{}' (level {})", ability.name, ability.level());
                self.events.push(GameEvent::AbilitySelected {
                    name: ability.name.clone(),
                    level: ability.level(),
                });
            }
        }

        self.events.push(GameEvent::MenuClosed);
        if self.phase == GamePhase::Selecting {
            self.phase = GamePhase::Playing;
        }
        self.show_next_level_up();
        applied
    }

    /// Let `menu` answer every open menu, including queued level-ups
    pub fn resolve_menus(&mut self, menu: &mut impl SelectionMenu) {
        while let Some(open) = self.menu.as_ref() {
            let choice = menu.choose(open.kind, &open.offers);
            self.select_offer(choice);
        }
    }

    /// Confirmed kill: progression and events
    pub(crate) fn on_enemy_killed(&mut self, report: KillReport) {
        self.events.push(GameEvent::EnemyKilled(report));
        if self.progression.on_enemy_killed() {
            self.queue_level_up();
        }
    }

    pub(crate) fn end_game(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.menu = None;
        self.pending_level_ups = 0;
        log::info!(
            "Game over: score {}, level {}",
            self.progression.score(),
            self.progression.level()
        );
        self.events.push(GameEvent::GameEnded {
            score: self.progression.score(),
            level: self.progression.level(),
        });
    }
}
