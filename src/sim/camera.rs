//! Orthographic camera that follows the player
//!
//! Supplies the visible world rectangle used for off-screen spawning,
//! projectile bounce and off-screen culling.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SPAWN_OFFSET;

/// Axis-aligned world rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Screen side an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Right,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Right, Side::Left];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub pos: Vec2,
    /// Half the visible height in world units
    pub orthographic_size: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            orthographic_size: 10.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Visible world rectangle centered on the camera
    pub fn visible_rect(&self) -> Rect {
        let half = Vec2::new(self.orthographic_size * self.aspect, self.orthographic_size);
        Rect {
            min: self.pos - half,
            max: self.pos + half,
        }
    }

    /// World point to viewport coordinates (0..1 across the visible rectangle)
    pub fn viewport_point(&self, p: Vec2) -> Vec2 {
        let rect = self.visible_rect();
        Vec2::new(
            (p.x - rect.min.x) / rect.width(),
            (p.y - rect.min.y) / rect.height(),
        )
    }

    /// Inside the viewport, allowing `margin` (as a viewport fraction) on every side
    pub fn in_view(&self, p: Vec2, margin: f32) -> bool {
        let v = self.viewport_point(p);
        v.x > -margin && v.x < 1.0 + margin && v.y > -margin && v.y < 1.0 + margin
    }

    /// Point just outside a given side, at `t` (0..1) along that side
    pub fn point_off_side(&self, side: Side, t: f32) -> Vec2 {
        let rect = self.visible_rect();
        let along_x = rect.min.x + rect.width() * t;
        let along_y = rect.min.y + rect.height() * t;
        match side {
            Side::Top => Vec2::new(along_x, rect.max.y + SPAWN_OFFSET),
            Side::Bottom => Vec2::new(along_x, rect.min.y - SPAWN_OFFSET),
            Side::Right => Vec2::new(rect.max.x + SPAWN_OFFSET, along_y),
            Side::Left => Vec2::new(rect.min.x - SPAWN_OFFSET, along_y),
        }
    }

    /// Uniformly random side, uniformly random position along it
    pub fn random_position_off_screen<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let side = Side::ALL[rng.random_range(0..Side::ALL.len())];
        self.point_off_side(side, rng.random::<f32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_visible_rect_follows_position() {
        let camera = Camera {
            pos: Vec2::new(100.0, -50.0),
            orthographic_size: 5.0,
            aspect: 2.0,
        };
        let rect = camera.visible_rect();
        assert_eq!(rect.min, Vec2::new(90.0, -55.0));
        assert_eq!(rect.max, Vec2::new(110.0, -45.0));
    }

    #[test]
    fn test_off_screen_positions_are_outside_by_offset() {
        let camera = Camera {
            pos: Vec2::new(3.0, 4.0),
            ..Default::default()
        };
        let rect = camera.visible_rect();
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let p = camera.random_position_off_screen(&mut rng);
            assert!(!rect.contains(p));
            let dx = (p.x - rect.max.x).max(rect.min.x - p.x);
            let dy = (p.y - rect.max.y).max(rect.min.y - p.y);
            assert!((dx.max(dy) - SPAWN_OFFSET).abs() < 1e-3);
        }
    }

    #[test]
    fn test_in_view_margin() {
        let camera = Camera::default();
        assert!(camera.in_view(camera.pos, 0.0));
        let rect = camera.visible_rect();
        let just_out = Vec2::new(rect.max.x + rect.width() * 0.05, 0.0);
        assert!(!camera.in_view(just_out, 0.0));
        assert!(camera.in_view(just_out, 0.1));
    }
}
