//! Swarm Survivor - arcade survival simulation core
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (stats, abilities, spawning, progression)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key/value storage backends
//! - `highscores`: Persisted best score

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, StorageError};
pub use highscores::HighScore;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Knockback applied by abilities lasts this long (seconds)
    pub const KNOCKBACK_DURATION: f32 = 0.05;
    /// Enemies spawn this many world units outside the visible rectangle
    pub const SPAWN_OFFSET: f32 = 1.0;

    /// Random spread applied to auto-aim shots (degrees, each side)
    pub const PROJECTILE_SPREAD_DEG: f32 = 5.0;
    /// Projectiles outside the view for this long are removed (seconds)
    pub const OFFSCREEN_DESTROY_TIME: f32 = 2.0;
    /// Projectiles count as in view within this margin of the viewport (fraction)
    pub const VIEW_MARGIN: f32 = 0.1;
    /// Collision radius of player-owned projectiles and orbs
    pub const PROJECTILE_RADIUS: f32 = 0.25;

    /// Beam collider growth speed (world units per second)
    pub const BEAM_GROW_SPEED: f32 = 50.0;
    /// Beam collider half-width
    pub const BEAM_HALF_WIDTH: f32 = 0.5;
    /// Lightning arc visible duration (seconds)
    pub const LIGHTNING_ARC_TIME: f32 = 0.1;

    /// Player collision radius
    pub const PLAYER_RADIUS: f32 = 0.5;
}

/// Move `current` toward `target` by at most `max_delta` without overshooting
#[inline]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Rotate a vector counter-clockwise by `degrees`
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Point at distance `r` and angle `theta` (radians) from the origin
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_towards_no_overshoot() {
        let p = move_towards(Vec2::ZERO, Vec2::new(1.0, 0.0), 5.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));

        let p = move_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
    }

    #[test]
    fn test_rotate_deg() {
        let v = rotate_deg(Vec2::X, 90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }
}
