//! Weighted enemy spawning with a population ceiling
//!
//! The director owns every live enemy plus a pool of recycled ones. Population
//! is the length of the live list, so spawn and kill accounting can never
//! drift apart.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::enemy::{Enemy, EnemyBehavior};
use crate::error::ConfigError;
use crate::tuning::{EnemyTuning, SpawnerTuning};

fn default_squad() -> u32 {
    1
}

fn default_size() -> f32 {
    1.0
}

/// Template for one enemy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub id: String,
    /// Collision tag abilities filter on
    #[serde(default = "EnemyArchetype::default_tag")]
    pub tag: String,
    #[serde(default = "default_squad")]
    pub squad_count: u32,
    /// Unnormalized selection weight
    pub rarity: f32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "default_size")]
    pub size: f32,
    pub health: u32,
    #[serde(default)]
    pub damage: u32,
    pub speed: f32,
    #[serde(default = "EnemyArchetype::default_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub behavior: EnemyBehavior,
}

impl EnemyArchetype {
    pub const DEFAULT_TAG: &'static str = "Enemy";

    fn default_tag() -> String {
        Self::DEFAULT_TAG.to_string()
    }

    fn default_color() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    /// Single-unit chaser with rarity 1, for building rosters by hand
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: Self::default_tag(),
            squad_count: 1,
            rarity: 1.0,
            xp: 1,
            size: 1.0,
            health: 1,
            damage: 1,
            speed: 1.0,
            color: Self::default_color(),
            behavior: EnemyBehavior::Chaser,
        }
    }
}

/// How a squad interacts with the population ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SquadPolicy {
    /// The ceiling is checked before a batch; a squad always spawns whole and
    /// may leave population above the ceiling until kills bring it down.
    #[default]
    Atomic,
    /// The squad is cut short at the ceiling.
    Clip,
}

/// Recycled enemy entities
#[derive(Debug, Clone, Default)]
pub struct UnitPool {
    free: Vec<Enemy>,
    capacity: usize,
}

impl UnitPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Reuse a released entity under a fresh id, or build a new one
    pub fn acquire(&mut self, id: u32) -> Enemy {
        match self.free.pop() {
            Some(mut enemy) => {
                enemy.id = id;
                enemy
            }
            None => Enemy::new(id),
        }
    }

    /// Returns false (and drops the entity) when the pool is full
    pub fn release(&mut self, enemy: Enemy) -> bool {
        if self.free.len() >= self.capacity {
            return false;
        }
        self.free.push(enemy);
        true
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

/// What the rest of the game needs to know about a confirmed kill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillReport {
    pub id: u32,
    pub archetype: usize,
    pub xp: u32,
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    archetypes: Vec<EnemyArchetype>,
    /// `rarity / Σ rarity`, computed once
    spawn_rates: Vec<f32>,
    total_rarity: f32,
    max_population: u32,
    spawns_per_second: f32,
    squad_policy: SquadPolicy,
    pooling: bool,
    enemy_tuning: EnemyTuning,
    /// Multiplier on archetype speed for newly spawned enemies
    speed_scale: f32,
    timer: f32,
    enemies: Vec<Enemy>,
    pool: UnitPool,
    next_id: u32,
    total_spawned: u64,
    total_killed: u64,
}

impl SpawnDirector {
    pub fn new(
        tuning: &SpawnerTuning,
        enemy_tuning: EnemyTuning,
        archetypes: Vec<EnemyArchetype>,
    ) -> Result<Self, ConfigError> {
        if archetypes.is_empty() {
            return Err(ConfigError::NoArchetypes);
        }
        for a in &archetypes {
            if !a.rarity.is_finite() || a.rarity < 0.0 {
                return Err(ConfigError::InvalidRarity {
                    id: a.id.clone(),
                    rarity: a.rarity,
                });
            }
            if a.squad_count == 0 {
                return Err(ConfigError::EmptySquad { id: a.id.clone() });
            }
        }
        if !(tuning.spawns_per_second.is_finite() && tuning.spawns_per_second > 0.0) {
            return Err(ConfigError::InvalidSpawnRate(tuning.spawns_per_second));
        }

        let total_rarity: f32 = archetypes.iter().map(|a| a.rarity).sum();
        if total_rarity <= 0.0 {
            return Err(ConfigError::ZeroTotalRarity);
        }
        let spawn_rates = archetypes.iter().map(|a| a.rarity / total_rarity).collect();

        log::info!(
            "Spawn director ready: {} archetypes, max population {}, {} spawns/s",
            archetypes.len(),
            tuning.max_population,
            tuning.spawns_per_second
        );

        Ok(Self {
            archetypes,
            spawn_rates,
            total_rarity,
            max_population: tuning.max_population,
            spawns_per_second: tuning.spawns_per_second,
            squad_policy: tuning.squad_policy,
            pooling: tuning.pooling,
            enemy_tuning,
            speed_scale: 1.0,
            timer: 0.0,
            enemies: Vec::new(),
            pool: UnitPool::new(if tuning.pooling { tuning.pool_capacity } else { 0 }),
            next_id: 1,
            total_spawned: 0,
            total_killed: 0,
        })
    }

    pub fn archetypes(&self) -> &[EnemyArchetype] {
        &self.archetypes
    }

    /// Normalized selection probability of archetype `index`
    pub fn spawn_rate(&self, index: usize) -> Option<f32> {
        self.spawn_rates.get(index).copied()
    }

    pub fn spawn_rates(&self) -> &[f32] {
        &self.spawn_rates
    }

    pub fn total_rarity(&self) -> f32 {
        self.total_rarity
    }

    /// Inverse-CDF lookup for a draw in `[0, total_rarity)`.
    ///
    /// Zero-weight archetypes are never returned. Rounding past the end
    /// falls back to the last selectable archetype.
    pub fn select_with_draw(&self, draw: f32) -> usize {
        let mut cumulative = 0.0;
        let mut last = 0;
        for (i, a) in self.archetypes.iter().enumerate() {
            if a.rarity <= 0.0 {
                continue;
            }
            cumulative += a.rarity;
            last = i;
            if cumulative >= draw {
                return i;
            }
        }
        last
    }

    pub fn select<R: Rng>(&self, rng: &mut R) -> usize {
        let draw = rng.random::<f32>() * self.total_rarity;
        self.select_with_draw(draw)
    }

    /// Advance the spawn timer and emit batches while below the ceiling.
    /// Returns the number of units spawned.
    pub fn tick<R: Rng>(&mut self, dt: f32, camera: &Camera, rng: &mut R) -> u32 {
        self.timer += dt;
        let interval = 1.0 / self.spawns_per_second;
        let mut spawned = 0;
        while self.timer > interval && self.population() < self.max_population {
            self.timer -= interval;
            spawned += self.spawn_batch(camera, rng);
        }
        spawned
    }

    fn spawn_batch<R: Rng>(&mut self, camera: &Camera, rng: &mut R) -> u32 {
        let index = self.select(rng);
        let squad = self.archetypes[index].squad_count;
        let count = match self.squad_policy {
            SquadPolicy::Atomic => squad,
            SquadPolicy::Clip => squad.min(self.max_population.saturating_sub(self.population())),
        };

        for _ in 0..count {
            let id = self.next_id;
            self.next_id += 1;
            let mut enemy = self.pool.acquire(id);
            let archetype = &self.archetypes[index];
            enemy.ready(index, archetype, &self.enemy_tuning);
            enemy.set_move_speed(archetype.speed * self.speed_scale);
            enemy.set_move_speed_factor(self.enemy_tuning.speed_growth);
            enemy.pos = camera.random_position_off_screen(rng);
            self.enemies.push(enemy);
        }
        self.total_spawned += u64::from(count);

        log::debug!(
            "Spawned {} x '{}' (population {})",
            count,
            self.archetypes[index].id,
            self.population()
        );
        count
    }

    /// Confirm a kill. Only the first call for a live id does anything;
    /// repeats and unknown ids return None.
    pub fn enemy_killed(&mut self, id: u32) -> Option<KillReport> {
        let slot = self.enemies.iter().position(|e| e.id == id)?;
        let mut enemy = self.enemies.swap_remove(slot);
        enemy.kill();
        self.total_killed += 1;

        let report = KillReport {
            id,
            archetype: enemy.archetype,
            xp: enemy.xp,
            pos: enemy.pos,
        };
        log::debug!("Enemy {} killed (population {})", id, self.population());

        if self.pooling {
            self.pool.release(enemy);
        }
        Some(report)
    }

    /// Live enemy count
    pub fn population(&self) -> u32 {
        self.enemies.len() as u32
    }

    pub fn max_population(&self) -> u32 {
        self.max_population
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn total_killed(&self) -> u64 {
        self.total_killed
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn spawns_per_second(&self) -> f32 {
        self.spawns_per_second
    }

    /// Add `delta` spawns per second. Changes that would stop spawning are
    /// rejected.
    pub fn adjust_spawn_rate(&mut self, delta: f32) -> bool {
        let next = self.spawns_per_second + delta;
        if !(next.is_finite() && next > 0.0) {
            log::warn!("Ignoring spawn rate change {} (would give {})", delta, next);
            return false;
        }
        self.spawns_per_second = next;
        log::info!("Enemy spawn rate now {} /s", next);
        true
    }

    /// Multiply the speed of future spawns by `factor`
    pub fn scale_enemy_speed(&mut self, factor: f32) {
        if !(factor.is_finite() && factor >= 0.0) {
            log::warn!("Ignoring enemy speed factor {}", factor);
            return;
        }
        self.speed_scale *= factor;
        log::info!("Enemy speed scale now {}", self.speed_scale);
    }

    pub fn speed_scale(&self) -> f32 {
        self.speed_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn roster(rarities: &[f32]) -> Vec<EnemyArchetype> {
        rarities
            .iter()
            .enumerate()
            .map(|(i, &rarity)| EnemyArchetype {
                rarity,
                ..EnemyArchetype::named(format!("e{}", i))
            })
            .collect()
    }

    fn spawner_tuning(max_population: u32) -> SpawnerTuning {
        SpawnerTuning {
            max_population,
            spawns_per_second: 10.0,
            ..SpawnerTuning::default()
        }
    }

    fn director(rarities: &[f32], max_population: u32) -> SpawnDirector {
        SpawnDirector::new(&spawner_tuning(max_population), EnemyTuning::default(), roster(rarities))
            .unwrap()
    }

    #[test]
    fn test_rarities_normalize() {
        let d = director(&[1.0, 2.0, 3.0], 10);
        let rates = d.spawn_rates();
        assert!((rates[0] - 1.0 / 6.0).abs() < 1e-6);
        assert!((rates[1] - 2.0 / 6.0).abs() < 1e-6);
        assert!((rates[2] - 3.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_draw_selects_by_cumulative_sum() {
        let d = director(&[1.0, 2.0, 3.0], 10);
        assert_eq!(d.select_with_draw(3.5), 2);
        assert_eq!(d.select_with_draw(0.5), 0);
        assert_eq!(d.select_with_draw(1.0), 0);
        assert_eq!(d.select_with_draw(2.9), 1);
        // Rounding past the total falls back to the last archetype
        assert_eq!(d.select_with_draw(6.0001), 2);
    }

    #[test]
    fn test_zero_rarity_never_selected() {
        let d = director(&[0.0, 1.0, 0.0], 10);
        assert_eq!(d.select_with_draw(0.0), 1);
        assert_eq!(d.select_with_draw(5.0), 1);
    }

    #[test]
    fn test_selection_frequency_converges() {
        let d = director(&[1.0, 2.0, 3.0], 10);
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut counts = [0u32; 3];
        let n = 60_000;
        for _ in 0..n {
            counts[d.select(&mut rng)] += 1;
        }
        for (i, &c) in counts.iter().enumerate() {
            let freq = c as f32 / n as f32;
            assert!((freq - d.spawn_rates()[i]).abs() < 0.01, "archetype {} freq {}", i, freq);
        }
    }

    #[test]
    fn test_invalid_rosters_fail_fast() {
        let tuning = spawner_tuning(10);
        let err = SpawnDirector::new(&tuning, EnemyTuning::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::NoArchetypes));

        let err = SpawnDirector::new(&tuning, EnemyTuning::default(), roster(&[0.0, 0.0])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTotalRarity));

        let err = SpawnDirector::new(&tuning, EnemyTuning::default(), roster(&[1.0, -1.0])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRarity { .. }));

        let bad_rate = SpawnerTuning {
            spawns_per_second: 0.0,
            ..tuning
        };
        let err = SpawnDirector::new(&bad_rate, EnemyTuning::default(), roster(&[1.0])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpawnRate(_)));
    }

    #[test]
    fn test_squad_spawns_whole() {
        let mut arch = roster(&[1.0]);
        arch[0].squad_count = 4;
        let mut d = SpawnDirector::new(&spawner_tuning(5), EnemyTuning::default(), arch).unwrap();
        let camera = Camera::default();
        let mut rng = Pcg32::seed_from_u64(3);

        // One interval (0.1 s) plus a bit
        assert_eq!(d.tick(0.11, &camera, &mut rng), 4);
        assert_eq!(d.population(), 4);

        // Still below the ceiling, so the next squad overshoots it
        assert_eq!(d.tick(0.1, &camera, &mut rng), 4);
        assert_eq!(d.population(), 8);

        // At/above ceiling: deferred
        assert_eq!(d.tick(1.0, &camera, &mut rng), 0);
    }

    #[test]
    fn test_clip_policy_respects_ceiling() {
        let mut arch = roster(&[1.0]);
        arch[0].squad_count = 4;
        let tuning = SpawnerTuning {
            squad_policy: SquadPolicy::Clip,
            ..spawner_tuning(5)
        };
        let mut d = SpawnDirector::new(&tuning, EnemyTuning::default(), arch).unwrap();
        let camera = Camera::default();
        let mut rng = Pcg32::seed_from_u64(3);

        d.tick(0.11, &camera, &mut rng);
        d.tick(0.1, &camera, &mut rng);
        assert_eq!(d.population(), 5);
    }

    #[test]
    fn test_kill_is_idempotent_and_pools() {
        let mut d = director(&[1.0], 10);
        let camera = Camera::default();
        let mut rng = Pcg32::seed_from_u64(9);
        d.tick(0.35, &camera, &mut rng);
        assert_eq!(d.population(), 3);

        let id = d.enemies()[0].id;
        assert!(d.enemy_killed(id).is_some());
        assert!(d.enemy_killed(id).is_none());
        assert_eq!(d.population(), 2);
        assert_eq!(d.pooled(), 1);

        // Reused entity comes back with a new id, so the stale id stays dead
        d.tick(0.1, &camera, &mut rng);
        assert_eq!(d.pooled(), 0);
        assert!(d.enemies().iter().all(|e| e.id != id));
        assert!(d.enemy_killed(id).is_none());
    }

    #[test]
    fn test_spawned_enemies_start_off_screen() {
        let mut d = director(&[1.0, 1.0], 20);
        let camera = Camera {
            pos: Vec2::new(50.0, 50.0),
            ..Camera::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        d.tick(1.05, &camera, &mut rng);
        let rect = camera.visible_rect();
        assert!(!d.enemies().is_empty());
        assert!(d.enemies().iter().all(|e| !rect.contains(e.pos)));
    }

    #[test]
    fn test_difficulty_knobs() {
        let mut d = director(&[1.0], 10);
        assert!(d.adjust_spawn_rate(2.0));
        assert_eq!(d.spawns_per_second(), 12.0);
        assert!(!d.adjust_spawn_rate(-20.0));
        assert_eq!(d.spawns_per_second(), 12.0);

        d.scale_enemy_speed(1.5);
        let camera = Camera::default();
        let mut rng = Pcg32::seed_from_u64(2);
        d.tick(0.1, &camera, &mut rng);
        assert!((d.enemies()[0].current_speed() - 1.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_spawn_rates_sum_to_one(rarities in prop::collection::vec(0.0f32..100.0, 1..12)) {
            prop_assume!(rarities.iter().sum::<f32>() > 0.0);
            let d = director(&rarities, 10);
            let sum: f32 = d.spawn_rates().iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_population_accounting(ops in prop::collection::vec((any::<bool>(), 0usize..64), 1..200)) {
            let mut d = director(&[1.0, 2.0], 30);
            let camera = Camera::default();
            let mut rng = Pcg32::seed_from_u64(77);
            let mut confirmed = 0u64;

            for (spawn, pick) in ops {
                if spawn {
                    d.tick(0.15, &camera, &mut rng);
                } else if !d.enemies().is_empty() {
                    let id = d.enemies()[pick % d.enemies().len()].id;
                    if d.enemy_killed(id).is_some() {
                        confirmed += 1;
                    }
                    // Second confirmation of the same kill never counts
                    prop_assert!(d.enemy_killed(id).is_none());
                }
                prop_assert_eq!(u64::from(d.population()), d.total_spawned() - confirmed);
            }
        }
    }
}
