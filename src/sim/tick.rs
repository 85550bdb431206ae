//! Simulation tick - advances game state by one fixed timestep

use glam::Vec2;

use super::ability::{AbilityContext, Hit};
use super::collision::circles_overlap;
use super::enemy::DamageOutcome;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (length <= 1)
    pub move_dir: Vec2,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep.
///
/// A level-up reached mid-tick opens its menu right away, but the tick still
/// finishes: the rest of that tick's hits and the enemy timers are applied.
/// The clock stops from the next tick.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    // The clock only runs while playing
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    // Movement pass
    state.player.update(dt, input.move_dir);
    state.camera.pos = state.player.pos;

    let player_pos = state.player.pos;
    for enemy in state.spawner.enemies_mut() {
        if let Some(shot) = enemy.fixed_update(dt, player_pos, &mut state.rng) {
            state.enemy_shots.push(shot);
        }
    }
    update_enemy_shots(state, dt);
    resolve_contacts(state);

    // Spawning
    let spawned = state.spawner.tick(dt, &state.camera, &mut state.rng);
    if spawned > 0 {
        log::trace!("Tick {}: spawned {}", state.time_ticks, spawned);
    }

    // Abilities: cooldowns, effects, hits
    let mut hits = Vec::new();
    for ability in &mut state.abilities {
        let ctx = AbilityContext {
            player_pos: state.player.pos,
            player_facing: state.player.facing,
            camera: &state.camera,
            enemies: state.spawner.enemies(),
        };
        hits.extend(ability.update(dt, &ctx, &mut state.rng));
    }
    for hit in hits {
        apply_hit(state, hit);
    }

    // Timer pass
    for enemy in state.spawner.enemies_mut() {
        enemy.update_timers(dt);
    }

    if state.player.is_dead() {
        state.end_game();
    }
}

/// Damage an enemy, push it back if it survived, and confirm the kill
fn apply_hit(state: &mut GameState, hit: Hit) {
    let Some(enemy) = state.spawner.enemy_mut(hit.enemy_id) else {
        return;
    };
    match enemy.take_damage(hit.damage) {
        DamageOutcome::Ignored => {}
        DamageOutcome::Hurt => {
            if hit.knockback != Vec2::ZERO {
                enemy.knockback(hit.knockback, KNOCKBACK_DURATION);
            }
        }
        DamageOutcome::Killed => {
            if let Some(report) = state.spawner.enemy_killed(hit.enemy_id) {
                state.on_enemy_killed(report);
            }
        }
    }
}

/// Enemies touching the player hurt it and die; that death counts as a kill
fn resolve_contacts(state: &mut GameState) {
    let player_pos = state.player.pos;
    let touching: Vec<(u32, f32)> = state
        .spawner
        .enemies()
        .iter()
        .filter(|e| e.collider_enabled && circles_overlap(player_pos, PLAYER_RADIUS, e.pos, e.radius()))
        .map(|e| (e.id, e.damage))
        .collect();

    for (id, damage) in touching {
        damage_player(state, damage);
        if let Some(enemy) = state.spawner.enemy_mut(id) {
            enemy.kill();
        }
        if let Some(report) = state.spawner.enemy_killed(id) {
            state.on_enemy_killed(report);
        }
    }
}

fn update_enemy_shots(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let mut landed = Vec::new();
    state.enemy_shots.retain_mut(|shot| {
        shot.pos += shot.vel * dt;
        shot.lifespan -= dt;
        if circles_overlap(shot.pos, PROJECTILE_RADIUS, player_pos, PLAYER_RADIUS) {
            landed.push(shot.damage);
            return false;
        }
        shot.lifespan > 0.0
    });
    for damage in landed {
        damage_player(state, damage);
    }
}

fn damage_player(state: &mut GameState, damage: f32) {
    if state.player.is_dead() {
        return;
    }
    state.player.take_damage(damage);
    log::debug!("Player hit for {} ({} left)", damage, state.player.health);
    let health = state.player.health;
    state.push_event(GameEvent::PlayerHit { damage, health });
}

/// Fixed-timestep accumulator: turns variable frame time into whole
/// `SIM_DT` steps, at most `MAX_SUBSTEPS` per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `step` once per whole timestep in `frame_dt`. Returns the number
    /// of steps taken.
    pub fn advance(&mut self, frame_dt: f32, mut step: impl FnMut(f32)) -> u32 {
        // Long stalls (tab switch, debugger) are not replayed
        self.accumulator += if frame_dt.is_finite() { frame_dt.clamp(0.0, 0.1) } else { 0.0 };

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            step(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Drop leftover time, e.g. after unpausing
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
