//! Score, XP and player level
//!
//! Kills and XP pickups feed one progress bar. Crossing the threshold raises
//! the level once and grows the next threshold geometrically.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tuning::ProgressionTuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTracker {
    score: u32,
    level: u32,
    level_progress: u32,
    level_threshold: u32,
    growth_factor: f32,
    score_per_kill: u32,
    carry_overflow: bool,
}

impl ProgressionTracker {
    pub fn new(tuning: &ProgressionTuning) -> Result<Self, ConfigError> {
        if tuning.level_threshold == 0 {
            return Err(ConfigError::ZeroLevelThreshold);
        }
        if !(tuning.growth_factor.is_finite() && tuning.growth_factor > 1.0) {
            return Err(ConfigError::InvalidGrowthFactor(tuning.growth_factor));
        }
        Ok(Self {
            score: 0,
            level: 1,
            level_progress: 0,
            level_threshold: tuning.level_threshold,
            growth_factor: tuning.growth_factor,
            score_per_kill: tuning.score_per_kill,
            carry_overflow: tuning.carry_overflow,
        })
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_progress(&self) -> u32 {
        self.level_progress
    }

    pub fn level_threshold(&self) -> u32 {
        self.level_threshold
    }

    /// Progress bar fill, 0..1
    pub fn progress_fraction(&self) -> f32 {
        self.level_progress as f32 / self.level_threshold as f32
    }

    /// A confirmed kill. Returns true if this raised the level.
    pub fn on_enemy_killed(&mut self) -> bool {
        self.add(self.score_per_kill)
    }

    /// Direct XP award. Returns true if this raised the level.
    pub fn on_gain_xp(&mut self, amount: u32) -> bool {
        self.add(amount)
    }

    fn add(&mut self, amount: u32) -> bool {
        self.score = self.score.saturating_add(amount);
        self.level_progress = self.level_progress.saturating_add(amount);
        if self.level_progress < self.level_threshold {
            return false;
        }

        let overflow = self.level_progress - self.level_threshold;
        self.level += 1;
        self.level_threshold = (self.level_threshold as f32 * self.growth_factor).ceil() as u32;
        // Overflow is dropped unless configured otherwise; one crossing per award
        self.level_progress = if self.carry_overflow {
            overflow.min(self.level_threshold.saturating_sub(1))
        } else {
            0
        };
        log::info!(
            "Level up! Level {} (next at {})",
            self.level,
            self.level_threshold
        );
        true
    }
}
