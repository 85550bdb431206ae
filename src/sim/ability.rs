//! Player abilities: leveling, upgrades, cooldown-gated firing and the
//! effect entities each ability owns.
//!
//! An ability is Inactive at level -1, becomes Active at level 0 and gains
//! one catalog upgrade per level until `max_level`. Effect entities
//! (projectiles, orbs, beam, arcs) belong to their ability, so disabling it
//! drops anything still in flight.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::{capsule_circle_overlap, circles_overlap, reflect_velocity};
use super::enemy::Enemy;
use super::schedule::Cooldown;
use super::stat::{FloatStat, IntStat, Stat};
use super::upgrade::{IncreaseMode, Upgrade, UpgradeCatalog, UpgradeKind};
use crate::consts::*;
use crate::{polar_to_cartesian, rotate_deg};

/// Closed set of ability behaviors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Bursts of projectiles at the nearest enemy in range
    AutoAim,
    /// Orbs circling the player; always on
    Orbit {
        #[serde(default = "default_clockwise")]
        clockwise: bool,
    },
    /// Growing beam along the player's facing
    Beam { length: f32 },
    /// Instant strike on the nearest enemies in range
    Lightning,
}

fn default_clockwise() -> bool {
    true
}

impl AbilityKind {
    /// Orbit runs continuously; everything else fires on cooldown
    pub fn uses_cooldown(&self) -> bool {
        !matches!(self, AbilityKind::Orbit { .. })
    }
}

/// Every upgradeable number an ability carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityStats {
    pub damage: FloatStat,
    pub area_radius: FloatStat,
    pub speed: FloatStat,
    pub duration: FloatStat,
    pub amount: IntStat,
    pub crit_chance: FloatStat,
    pub crit_multiplier: FloatStat,
    pub knockback: FloatStat,
    pub luck_chance: FloatStat,
    pub cooldown: FloatStat,
    pub max_collisions: IntStat,
    pub interval_between_shots: FloatStat,
}

impl Default for AbilityStats {
    fn default() -> Self {
        Self {
            damage: FloatStat::new(1.0),
            area_radius: FloatStat::new(10.0),
            speed: FloatStat::new(5.0),
            duration: FloatStat::new(5.0),
            amount: IntStat::new(1),
            crit_chance: FloatStat::new(0.05),
            crit_multiplier: FloatStat::new(2.0),
            knockback: FloatStat::new(5.0),
            luck_chance: FloatStat::new(0.05),
            cooldown: FloatStat::new(6.0),
            max_collisions: IntStat::new(1),
            interval_between_shots: FloatStat::new(1.0),
        }
    }
}

impl AbilityStats {
    /// The stat an upgrade kind scales. Flags have none.
    pub fn stat(&self, kind: UpgradeKind) -> Option<&dyn Stat> {
        let stat: &dyn Stat = match kind {
            UpgradeKind::Damage => &self.damage,
            UpgradeKind::Cooldown => &self.cooldown,
            UpgradeKind::AreaRadius => &self.area_radius,
            UpgradeKind::Speed => &self.speed,
            UpgradeKind::Duration => &self.duration,
            UpgradeKind::Amount => &self.amount,
            UpgradeKind::MaxCollisions => &self.max_collisions,
            UpgradeKind::Knockback => &self.knockback,
            UpgradeKind::CritChance => &self.crit_chance,
            UpgradeKind::CritMultiplier => &self.crit_multiplier,
            UpgradeKind::LuckChance => &self.luck_chance,
            UpgradeKind::IntervalBetweenShots => &self.interval_between_shots,
            UpgradeKind::SeekTarget | UpgradeKind::BouncesOffCameraBounds => return None,
        };
        Some(stat)
    }

    fn float_mut(&mut self, kind: UpgradeKind) -> Option<&mut FloatStat> {
        match kind {
            UpgradeKind::Damage => Some(&mut self.damage),
            UpgradeKind::Cooldown => Some(&mut self.cooldown),
            UpgradeKind::AreaRadius => Some(&mut self.area_radius),
            UpgradeKind::Speed => Some(&mut self.speed),
            UpgradeKind::Duration => Some(&mut self.duration),
            UpgradeKind::Knockback => Some(&mut self.knockback),
            UpgradeKind::CritChance => Some(&mut self.crit_chance),
            UpgradeKind::CritMultiplier => Some(&mut self.crit_multiplier),
            UpgradeKind::LuckChance => Some(&mut self.luck_chance),
            UpgradeKind::IntervalBetweenShots => Some(&mut self.interval_between_shots),
            _ => None,
        }
    }

    fn int_mut(&mut self, kind: UpgradeKind) -> Option<&mut IntStat> {
        match kind {
            UpgradeKind::Amount => Some(&mut self.amount),
            UpgradeKind::MaxCollisions => Some(&mut self.max_collisions),
            _ => None,
        }
    }
}

/// Load-time description of an ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Presentation asset key
    #[serde(default)]
    pub icon: String,
    pub kind: AbilityKind,
    #[serde(default)]
    pub stats: AbilityStats,
    #[serde(default)]
    pub upgrades: UpgradeCatalog,
    #[serde(default)]
    pub collision_tags: Vec<String>,
    #[serde(default)]
    pub seek_target: bool,
    #[serde(default)]
    pub bounces_off_camera_bounds: bool,
}

/// Damage (and optional push) an ability landed on one enemy this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub enemy_id: u32,
    pub damage: f32,
    /// Zero when the ability has no knockback
    pub knockback: Vec2,
}

/// World state an ability reads while updating
#[derive(Debug, Clone, Copy)]
pub struct AbilityContext<'a> {
    pub player_pos: Vec2,
    pub player_facing: Vec2,
    pub camera: &'a Camera,
    pub enemies: &'a [Enemy],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Steered toward while seeking
    pub target: Option<u32>,
    hit_ids: Vec<u32>,
    lifespan: f32,
    offscreen: f32,
}

impl Projectile {
    pub fn set_target(&mut self, target: u32) {
        self.target = Some(target);
    }

    pub fn hits(&self) -> usize {
        self.hit_ids.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub pos: Vec2,
    /// Enemies currently overlapping; damage lands on entry only
    touching: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub origin: Vec2,
    pub dir: Vec2,
    /// Current collider length, growing toward `max_length`
    pub length: f32,
    pub max_length: f32,
    remaining: f32,
    hit_ids: Vec<u32>,
}

impl Beam {
    pub fn end(&self) -> Vec2 {
        self.origin + self.dir * self.length
    }
}

/// Visible lightning strike, for presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightningArc {
    pub from: Vec2,
    pub to: Vec2,
    pub remaining: f32,
}

/// Shots still owed from the current auto-aim activation
#[derive(Debug, Clone, Copy, PartialEq)]
struct Burst {
    remaining: u32,
    timer: f32,
    target: u32,
}

#[derive(Debug, Clone)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub kind: AbilityKind,
    pub stats: AbilityStats,
    catalog: UpgradeCatalog,
    level: i32,
    cooldown: Cooldown,
    seek_target: bool,
    can_pierce: bool,
    bounces_off_camera_bounds: bool,
    collision_tags: Vec<String>,
    orbit_angle: f32,
    burst: Option<Burst>,
    projectiles: Vec<Projectile>,
    orbs: Vec<Orb>,
    beam: Option<Beam>,
    arcs: Vec<LightningArc>,
}

impl Ability {
    pub fn from_def(def: &AbilityDef) -> Self {
        let can_pierce = def.stats.max_collisions.value() > 1.0;
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
            kind: def.kind,
            stats: def.stats.clone(),
            catalog: def.upgrades.clone(),
            level: -1,
            cooldown: Cooldown::new(),
            seek_target: def.seek_target,
            can_pierce,
            bounces_off_camera_bounds: def.bounces_off_camera_bounds,
            collision_tags: def.collision_tags.clone(),
            orbit_angle: 0.0,
            burst: None,
            projectiles: Vec::new(),
            orbs: Vec::new(),
            beam: None,
            arcs: Vec::new(),
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn max_level(&self) -> i32 {
        self.catalog.len() as i32
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    pub fn is_active(&self) -> bool {
        self.level >= 0
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level()
    }

    pub fn seeks_target(&self) -> bool {
        self.seek_target
    }

    pub fn can_pierce(&self) -> bool {
        self.can_pierce
    }

    pub fn bounces_off_camera_bounds(&self) -> bool {
        self.bounces_off_camera_bounds
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn accepts(&self, tag: &str) -> bool {
        self.collision_tags.iter().any(|t| t == tag)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn beam(&self) -> Option<&Beam> {
        self.beam.as_ref()
    }

    pub fn arcs(&self) -> &[LightningArc] {
        &self.arcs
    }

    /// Inactive -> Active. The first activation comes one full cooldown later.
    pub fn enable(&mut self) -> bool {
        if self.is_active() {
            log::warn!("Ability '{}' is already enabled", self.name);
            return false;
        }
        self.level = 0;
        self.cooldown.restart(self.stats.cooldown.value());
        log::info!("Ability '{}' enabled", self.name);
        true
    }

    /// Back to Inactive, dropping every pending shot and live effect
    pub fn disable(&mut self) {
        self.level = -1;
        self.cooldown.clear();
        self.burst = None;
        self.beam = None;
        self.projectiles.clear();
        self.orbs.clear();
        self.arcs.clear();
    }

    /// Apply the next catalog upgrade. No-op when inactive or maxed.
    pub fn level_up(&mut self) -> bool {
        if !self.is_active() {
            log::warn!("Cannot level up inactive ability '{}'", self.name);
            return false;
        }
        if self.is_max_level() {
            return false;
        }
        let Some(info) = self.catalog.get(self.level) else {
            return false;
        };
        let upgrade = info.upgrade.clone();
        self.apply_upgrade(&upgrade);
        self.level += 1;
        log::info!("Ability '{}' now level {}", self.name, self.level);
        true
    }

    /// Mutate the stat or flag an upgrade targets
    pub fn apply_upgrade(&mut self, upgrade: &Upgrade) {
        if upgrade.kind.is_flag() {
            if upgrade.mode != IncreaseMode::Boolean {
                log::warn!("Upgrade {:?} is a flag; treating {:?} as Boolean", upgrade.kind, upgrade.mode);
            }
            match upgrade.kind {
                UpgradeKind::SeekTarget => self.seek_target = upgrade.bool_value,
                UpgradeKind::BouncesOffCameraBounds => self.bounces_off_camera_bounds = upgrade.bool_value,
                _ => {}
            }
            log::debug!("'{}': {:?} = {}", self.name, upgrade.kind, upgrade.bool_value);
            return;
        }

        match upgrade.mode {
            IncreaseMode::Flat => {
                if let Some(stat) = self.stats.float_mut(upgrade.kind) {
                    stat.increment_base_value(upgrade.amount);
                } else if let Some(stat) = self.stats.int_mut(upgrade.kind) {
                    stat.increment_base_value(upgrade.amount as i32);
                }
            }
            IncreaseMode::Percentage => {
                if let Some(stat) = self.stats.float_mut(upgrade.kind) {
                    stat.add_modifier(upgrade.amount);
                } else if let Some(stat) = self.stats.int_mut(upgrade.kind) {
                    stat.add_modifier(upgrade.amount);
                }
            }
            IncreaseMode::Boolean => {
                log::warn!("Boolean upgrade on numeric stat {:?} ignored", upgrade.kind);
                return;
            }
        }

        if upgrade.kind == UpgradeKind::MaxCollisions && self.stats.max_collisions.value() > 1.0 {
            self.can_pierce = true;
        }
        log::debug!("'{}': {:?} {:?} {}", self.name, upgrade.kind, upgrade.mode, upgrade.amount);
    }

    /// Hit against `enemy` using current stats
    pub fn hit_on(&self, enemy: &Enemy, player_pos: Vec2) -> Hit {
        let push = self.stats.knockback.value();
        let knockback = if push > 0.0 {
            (enemy.pos - player_pos).normalize_or_zero() * push
        } else {
            Vec2::ZERO
        };
        Hit {
            enemy_id: enemy.id,
            damage: self.stats.damage.value(),
            knockback,
        }
    }

    fn targetable(&self, enemy: &Enemy) -> bool {
        enemy.is_alive() && enemy.collider_enabled && self.accepts(&enemy.tag)
    }

    /// Nearest accepted enemy within `radius` of `pos`, skipping `exclude`
    fn nearest<'a>(&self, enemies: &'a [Enemy], pos: Vec2, radius: f32, exclude: &[u32]) -> Option<&'a Enemy> {
        enemies
            .iter()
            .filter(|e| self.targetable(e) && !exclude.contains(&e.id))
            .map(|e| (e, e.pos.distance_squared(pos)))
            .filter(|(_, d)| *d <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }

    /// One simulation step. Returns every hit landed this step.
    pub fn update<R: Rng>(&mut self, dt: f32, ctx: &AbilityContext, rng: &mut R) -> Vec<Hit> {
        let mut hits = Vec::new();
        if !self.is_active() {
            return hits;
        }

        if self.kind.uses_cooldown() && self.cooldown.tick(dt, self.stats.cooldown.value()) {
            self.activate(ctx, &mut hits);
        }

        match self.kind {
            AbilityKind::AutoAim => {
                self.update_burst(dt, ctx, rng);
                self.update_projectiles(dt, ctx, &mut hits);
            }
            AbilityKind::Orbit { clockwise } => self.update_orbs(dt, clockwise, ctx, &mut hits),
            AbilityKind::Beam { .. } => self.update_beam(dt, ctx, &mut hits),
            AbilityKind::Lightning => {
                self.arcs.retain_mut(|arc| {
                    arc.remaining -= dt;
                    arc.remaining > 0.0
                });
            }
        }
        hits
    }

    fn activate(&mut self, ctx: &AbilityContext, hits: &mut Vec<Hit>) {
        match self.kind {
            AbilityKind::AutoAim => {
                let radius = self.stats.area_radius.value();
                if let Some(target) = self.nearest(ctx.enemies, ctx.player_pos, radius, &[]) {
                    self.burst = Some(Burst {
                        remaining: self.stats.amount.count() as u32,
                        timer: 0.0,
                        target: target.id,
                    });
                }
            }
            AbilityKind::Beam { length } => {
                self.beam = Some(Beam {
                    origin: ctx.player_pos,
                    dir: ctx.player_facing.normalize_or(Vec2::Y),
                    length: 0.0,
                    max_length: length,
                    remaining: self.stats.duration.value(),
                    hit_ids: Vec::new(),
                });
                log::trace!("'{}' beam fired", self.name);
            }
            AbilityKind::Lightning => {
                let radius = self.stats.area_radius.value();
                let mut struck = Vec::new();
                for _ in 0..self.stats.amount.count() {
                    let Some(enemy) = self.nearest(ctx.enemies, ctx.player_pos, radius, &struck) else {
                        break;
                    };
                    struck.push(enemy.id);
                    hits.push(self.hit_on(enemy, ctx.player_pos));
                    self.arcs.push(LightningArc {
                        from: ctx.player_pos,
                        to: enemy.pos,
                        remaining: LIGHTNING_ARC_TIME,
                    });
                }
            }
            AbilityKind::Orbit { .. } => {}
        }
    }

    fn update_burst<R: Rng>(&mut self, dt: f32, ctx: &AbilityContext, rng: &mut R) {
        let Some(mut burst) = self.burst.take() else {
            return;
        };
        let interval = self.stats.interval_between_shots.value().max(0.0);
        burst.timer -= dt;
        while burst.remaining > 0 && burst.timer <= 0.0 {
            // Re-target if the original target died mid-burst
            let target = ctx
                .enemies
                .iter()
                .find(|e| e.id == burst.target && self.targetable(e))
                .or_else(|| self.nearest(ctx.enemies, ctx.player_pos, self.stats.area_radius.value(), &[]));
            // Nothing in range: this shot is skipped, later ones still wait their turn
            if let Some(target) = target {
                burst.target = target.id;

                let dir = (target.pos - ctx.player_pos).normalize_or(ctx.player_facing);
                let spread = rng.random_range(-PROJECTILE_SPREAD_DEG..=PROJECTILE_SPREAD_DEG);
                let mut projectile = Projectile {
                    pos: ctx.player_pos,
                    vel: rotate_deg(dir, spread) * self.stats.speed.value(),
                    target: None,
                    hit_ids: Vec::new(),
                    lifespan: self.stats.duration.value(),
                    offscreen: 0.0,
                };
                if self.seek_target {
                    projectile.set_target(target.id);
                }
                self.projectiles.push(projectile);
            }

            burst.remaining -= 1;
            burst.timer += interval;
            if interval <= 0.0 && burst.timer <= 0.0 {
                burst.timer = 0.0;
            }
        }
        if burst.remaining > 0 {
            self.burst = Some(burst);
        }
    }

    fn update_projectiles(&mut self, dt: f32, ctx: &AbilityContext, hits: &mut Vec<Hit>) {
        let speed = self.stats.speed.value();
        let limit = if self.can_pierce {
            self.stats.max_collisions.value_rounded().max(1) as usize
        } else {
            1
        };
        let rect = ctx.camera.visible_rect();
        let mut projectiles = std::mem::take(&mut self.projectiles);

        projectiles.retain_mut(|p| {
            if self.seek_target {
                if let Some(target) = p.target.and_then(|id| ctx.enemies.iter().find(|e| e.id == id && e.is_alive())) {
                    p.vel = (target.pos - p.pos).normalize_or(p.vel.normalize_or_zero()) * speed;
                }
            }
            p.pos += p.vel * dt;

            if self.bounces_off_camera_bounds {
                if p.pos.x < rect.min.x && p.vel.x < 0.0 {
                    p.vel = reflect_velocity(p.vel, Vec2::X);
                } else if p.pos.x > rect.max.x && p.vel.x > 0.0 {
                    p.vel = reflect_velocity(p.vel, Vec2::NEG_X);
                }
                if p.pos.y < rect.min.y && p.vel.y < 0.0 {
                    p.vel = reflect_velocity(p.vel, Vec2::Y);
                } else if p.pos.y > rect.max.y && p.vel.y > 0.0 {
                    p.vel = reflect_velocity(p.vel, Vec2::NEG_Y);
                }
            }

            for enemy in ctx.enemies {
                if p.hit_ids.len() >= limit {
                    break;
                }
                if !self.targetable(enemy) || p.hit_ids.contains(&enemy.id) {
                    continue;
                }
                if circles_overlap(p.pos, PROJECTILE_RADIUS, enemy.pos, enemy.radius()) {
                    p.hit_ids.push(enemy.id);
                    hits.push(self.hit_on(enemy, ctx.player_pos));
                }
            }
            if p.hit_ids.len() >= limit {
                return false;
            }

            p.lifespan -= dt;
            if ctx.camera.in_view(p.pos, VIEW_MARGIN) {
                p.offscreen = 0.0;
            } else {
                p.offscreen += dt;
            }
            p.lifespan > 0.0 && p.offscreen < OFFSCREEN_DESTROY_TIME
        });

        self.projectiles = projectiles;
    }

    fn update_orbs(&mut self, dt: f32, clockwise: bool, ctx: &AbilityContext, hits: &mut Vec<Hit>) {
        let count = self.stats.amount.count();
        if self.orbs.len() != count {
            // Enemies already overlapping an orb are not hit again by the new ring
            let mut touching: Vec<u32> = self.orbs.iter().flat_map(|o| o.touching.iter().copied()).collect();
            touching.sort_unstable();
            touching.dedup();
            self.orbs = (0..count)
                .map(|_| Orb {
                    pos: ctx.player_pos,
                    touching: touching.clone(),
                })
                .collect();
        }

        self.orbit_angle = (self.orbit_angle + dt * self.stats.speed.value()) % 360.0;
        let spin = if clockwise { -self.orbit_angle } else { self.orbit_angle };
        let radius = self.stats.area_radius.value();
        let mut orbs = std::mem::take(&mut self.orbs);

        for (i, orb) in orbs.iter_mut().enumerate() {
            let theta = std::f32::consts::TAU * i as f32 / count as f32 + spin.to_radians();
            orb.pos = ctx.player_pos + polar_to_cartesian(radius, theta);

            let mut touching = Vec::new();
            for enemy in ctx.enemies.iter().filter(|e| self.targetable(e)) {
                if circles_overlap(orb.pos, PROJECTILE_RADIUS, enemy.pos, enemy.radius()) {
                    if !orb.touching.contains(&enemy.id) {
                        hits.push(self.hit_on(enemy, ctx.player_pos));
                    }
                    touching.push(enemy.id);
                }
            }
            orb.touching = touching;
        }

        self.orbs = orbs;
    }

    fn update_beam(&mut self, dt: f32, ctx: &AbilityContext, hits: &mut Vec<Hit>) {
        let Some(mut beam) = self.beam.take() else {
            return;
        };
        beam.remaining -= dt;
        if beam.remaining <= 0.0 {
            return;
        }
        beam.origin = ctx.player_pos;
        beam.length = (beam.length + BEAM_GROW_SPEED * dt).min(beam.max_length);

        let end = beam.end();
        for enemy in ctx.enemies {
            if !self.targetable(enemy) || beam.hit_ids.contains(&enemy.id) {
                continue;
            }
            if capsule_circle_overlap(beam.origin, end, BEAM_HALF_WIDTH, enemy.pos, enemy.radius()) {
                beam.hit_ids.push(enemy.id);
                hits.push(self.hit_on(enemy, ctx.player_pos));
            }
        }
        self.beam = Some(beam);
    }
}
