//! Enemy entities and their behavior state machine
//!
//! Ready -> Active, with transient invincibility/flash and knockback windows,
//! until Dead. Death is terminal until the spawner readies the entity again.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::schedule::{Countdown, StepSequence};
use super::spawner::EnemyArchetype;
use crate::move_towards;
use crate::tuning::EnemyTuning;

/// Movement/attack pattern per archetype
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Walks straight at the player, slowly accelerating
    #[default]
    Chaser,
    /// Chases until within `fire_range`, then circles the player and shoots
    Ranged {
        fire_range: f32,
        fire_cooldown: f32,
        shot_speed: f32,
        /// 1.0 = perfect aim, 0.0 = widest spread
        accuracy: f32,
    },
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Freshly readied, not yet moved
    Ready,
    Active,
    Dead,
}

/// Result of a `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead or inside the invincibility window
    Ignored,
    /// Survived; invincibility and flash started
    Hurt,
    /// This hit was lethal. Reported exactly once per life.
    Killed,
}

/// A shot fired by a ranged enemy at the player
#[derive(Debug, Clone)]
pub struct EnemyShot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub lifespan: f32,
}

/// Shot spread at zero accuracy (degrees, each side)
const MAX_SHOT_SPREAD_DEG: f32 = 5.0;
/// Enemy shots expire after this long (seconds)
const SHOT_LIFESPAN: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    /// Index into the spawner's archetype list
    pub archetype: usize,
    /// Collision tag checked by abilities
    pub tag: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    /// Damage dealt to the player on contact / per shot
    pub damage: f32,
    pub xp: u32,
    pub color: [f32; 3],
    pub behavior: EnemyBehavior,
    pub state: EnemyState,
    pub collider_enabled: bool,
    move_speed: f32,
    move_speed_factor: f32,
    speed_multiplier: f32,
    invincible: Option<Countdown>,
    flash: Option<StepSequence>,
    knockback: Option<Countdown>,
    fire_timer: f32,
    invincibility_duration: f32,
    flash_duration: f32,
    flash_steps: usize,
}

impl Enemy {
    /// A blank, dead entity. Call [`Enemy::ready`] before use.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            archetype: 0,
            tag: String::new(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 1.0,
            health: 0.0,
            max_health: 0.0,
            damage: 0.0,
            xp: 0,
            color: [1.0, 1.0, 1.0],
            behavior: EnemyBehavior::Chaser,
            state: EnemyState::Dead,
            collider_enabled: false,
            move_speed: 0.0,
            move_speed_factor: 0.0,
            speed_multiplier: 1.0,
            invincible: None,
            flash: None,
            knockback: None,
            fire_timer: 0.0,
            invincibility_duration: 0.0,
            flash_duration: 0.0,
            flash_steps: 0,
        }
    }

    /// Reset to full health from an archetype (spawn or pool reuse)
    pub fn ready(&mut self, index: usize, archetype: &EnemyArchetype, tuning: &EnemyTuning) {
        self.archetype = index;
        self.tag = archetype.tag.clone();
        self.vel = Vec2::ZERO;
        self.size = archetype.size;
        self.max_health = archetype.health as f32;
        self.health = self.max_health;
        self.damage = archetype.damage as f32;
        self.xp = archetype.xp;
        self.color = archetype.color;
        self.behavior = archetype.behavior;
        self.state = EnemyState::Ready;
        self.collider_enabled = true;
        self.move_speed = archetype.speed;
        self.move_speed_factor = 0.0;
        self.speed_multiplier = 1.0;
        self.invincible = None;
        self.flash = None;
        self.knockback = None;
        self.fire_timer = 0.0;
        self.invincibility_duration = tuning.invincibility_duration;
        self.flash_duration = tuning.flash_duration;
        self.flash_steps = tuning.flash_steps;
    }

    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed;
    }

    pub fn set_move_speed_factor(&mut self, factor: f32) {
        self.move_speed_factor = factor;
    }

    /// Current effective chase speed
    pub fn current_speed(&self) -> f32 {
        self.move_speed * self.speed_multiplier
    }

    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible.is_some()
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback.is_some()
    }

    /// Flash color index currently showing, for presentation
    pub fn flash_step(&self) -> Option<usize> {
        self.flash.and_then(|f| f.current())
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.state == EnemyState::Dead || self.invincible.is_some() {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount).clamp(0.0, self.max_health);
        log::trace!("Enemy {} took {} damage, health {}", self.id, amount, self.health);

        if self.health <= 0.0 {
            self.die();
            DamageOutcome::Killed
        } else {
            self.invincible = Some(Countdown::new(self.invincibility_duration));
            self.flash = Some(StepSequence::new(self.flash_steps, self.flash_duration));
            DamageOutcome::Hurt
        }
    }

    /// Kill outright (e.g. on contact with the player). Returns false if
    /// already dead.
    pub fn kill(&mut self) -> bool {
        if self.state == EnemyState::Dead {
            return false;
        }
        self.health = 0.0;
        self.die();
        true
    }

    fn die(&mut self) {
        self.state = EnemyState::Dead;
        self.collider_enabled = false;
        self.vel = Vec2::ZERO;
        // Pending sequences must not outlive the entity
        self.invincible = None;
        self.flash = None;
        self.knockback = None;
    }

    /// Apply an impulse and suspend movement for `duration`
    pub fn knockback(&mut self, force: Vec2, duration: f32) -> bool {
        if self.health <= 0.0 || self.state == EnemyState::Dead {
            return false;
        }
        self.vel += force;
        self.knockback = Some(Countdown::new(duration));
        true
    }

    /// Movement pass (fixed timestep). Ranged enemies may return a shot.
    pub fn fixed_update<R: Rng>(&mut self, dt: f32, player_pos: Vec2, rng: &mut R) -> Option<EnemyShot> {
        match self.state {
            EnemyState::Dead => return None,
            EnemyState::Ready => self.state = EnemyState::Active,
            EnemyState::Active => {}
        }

        if self.knockback.is_some() {
            self.pos += self.vel * dt;
            return None;
        }

        match self.behavior {
            EnemyBehavior::Chaser => {
                self.chase(dt, player_pos);
                None
            }
            EnemyBehavior::Ranged {
                fire_range,
                fire_cooldown,
                shot_speed,
                accuracy,
            } => {
                if self.pos.distance(player_pos) <= fire_range {
                    // Circle the player at firing range
                    let away = (self.pos - player_pos).normalize_or_zero();
                    let strafe = away.perp();
                    let target = player_pos + strafe * fire_range;
                    self.pos = move_towards(self.pos, target, dt * self.move_speed);

                    if self.fire_timer <= 0.0 {
                        self.fire_timer = fire_cooldown;
                        return Some(self.fire_at(player_pos, shot_speed, accuracy, rng));
                    }
                    None
                } else {
                    self.chase(dt, player_pos);
                    None
                }
            }
        }
    }

    fn chase(&mut self, dt: f32, player_pos: Vec2) {
        self.speed_multiplier += dt * self.move_speed_factor;
        self.pos = move_towards(self.pos, player_pos, dt * self.current_speed());
    }

    fn fire_at<R: Rng>(&self, target: Vec2, shot_speed: f32, accuracy: f32, rng: &mut R) -> EnemyShot {
        let dir = (target - self.pos).normalize_or_zero();
        let spread = rng.random_range(-1.0f32..=1.0) * (1.0 - accuracy.clamp(0.0, 1.0)) * MAX_SHOT_SPREAD_DEG;
        let dir = crate::rotate_deg(dir, spread);
        EnemyShot {
            pos: self.pos,
            vel: dir * shot_speed,
            damage: self.damage,
            lifespan: SHOT_LIFESPAN,
        }
    }

    /// Timer pass: invincibility, flash, knockback and fire cooldown
    pub fn update_timers(&mut self, dt: f32) {
        if self.state == EnemyState::Dead {
            return;
        }
        if let Some(timer) = self.invincible.as_mut() {
            if timer.advance(dt) {
                self.invincible = None;
            }
        }
        if let Some(flash) = self.flash.as_mut() {
            if flash.advance(dt) {
                self.flash = None;
            }
        }
        if let Some(timer) = self.knockback.as_mut() {
            if timer.advance(dt) {
                self.knockback = None;
                self.vel = Vec2::ZERO;
            }
        }
        if self.fire_timer > 0.0 {
            self.fire_timer -= dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn archetype(health: u32) -> EnemyArchetype {
        EnemyArchetype {
            health,
            speed: 2.0,
            ..EnemyArchetype::named("grunt")
        }
    }

    fn ready_enemy(health: u32) -> Enemy {
        let mut enemy = Enemy::new(1);
        enemy.ready(0, &archetype(health), &EnemyTuning::default());
        enemy
    }

    #[test]
    fn test_damage_sequence_to_death() {
        let mut enemy = ready_enemy(100);
        let window = EnemyTuning::default().invincibility_duration;

        assert_eq!(enemy.take_damage(30.0), DamageOutcome::Hurt);
        enemy.update_timers(window + 0.01);
        assert_eq!(enemy.take_damage(30.0), DamageOutcome::Hurt);
        assert_eq!(enemy.health, 40.0);
        assert!(enemy.is_alive());

        enemy.update_timers(window + 0.01);
        assert_eq!(enemy.take_damage(50.0), DamageOutcome::Killed);
        assert_eq!(enemy.health, 0.0);
        assert_eq!(enemy.state, EnemyState::Dead);

        // Further hits never report a second kill
        assert_eq!(enemy.take_damage(50.0), DamageOutcome::Ignored);
        assert!(!enemy.kill());
    }

    #[test]
    fn test_invincibility_window_ignores_hits() {
        let mut enemy = ready_enemy(100);
        assert_eq!(enemy.take_damage(10.0), DamageOutcome::Hurt);
        assert!(enemy.is_invincible());
        assert_eq!(enemy.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(enemy.health, 90.0);
    }

    #[test]
    fn test_death_cancels_flash() {
        let mut enemy = ready_enemy(10);
        enemy.take_damage(5.0);
        assert!(enemy.flash_step().is_some());
        assert!(enemy.kill());
        assert!(enemy.flash_step().is_none());
        assert!(!enemy.is_invincible());
        assert!(!enemy.collider_enabled);
    }

    #[test]
    fn test_chaser_accelerates_toward_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = ready_enemy(10);
        enemy.pos = Vec2::new(100.0, 0.0);
        enemy.set_move_speed_factor(0.5);

        enemy.fixed_update(1.0, Vec2::ZERO, &mut rng);
        assert_eq!(enemy.state, EnemyState::Active);
        let first_step = 100.0 - enemy.pos.x;

        let before = enemy.pos.x;
        enemy.fixed_update(1.0, Vec2::ZERO, &mut rng);
        let second_step = before - enemy.pos.x;
        assert!(second_step > first_step);
    }

    #[test]
    fn test_knockback_suspends_movement_then_stops() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = ready_enemy(10);
        enemy.pos = Vec2::new(10.0, 0.0);

        assert!(enemy.knockback(Vec2::new(5.0, 0.0), 0.05));
        enemy.fixed_update(0.01, Vec2::ZERO, &mut rng);
        // Pushed away instead of chasing
        assert!(enemy.pos.x > 10.0);

        enemy.update_timers(0.06);
        assert!(!enemy.is_knocked_back());
        assert_eq!(enemy.vel, Vec2::ZERO);
    }

    #[test]
    fn test_ranged_enemy_fires_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut arch = archetype(10);
        arch.behavior = EnemyBehavior::Ranged {
            fire_range: 5.0,
            fire_cooldown: 1.0,
            shot_speed: 4.0,
            accuracy: 1.0,
        };
        let mut enemy = Enemy::new(3);
        enemy.ready(0, &arch, &EnemyTuning::default());
        enemy.pos = Vec2::new(3.0, 0.0);

        let shot = enemy.fixed_update(0.1, Vec2::ZERO, &mut rng).expect("should fire");
        assert!(shot.vel.x < 0.0);
        // Cooling down now
        assert!(enemy.fixed_update(0.1, Vec2::ZERO, &mut rng).is_none());
    }
}
