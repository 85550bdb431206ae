//! Frame-driven timers
//!
//! Multi-frame behavior (cooldowns, invincibility windows, flash cycles,
//! knockback) is held as plain state advanced once per tick. Dropping the
//! value cancels it.

use serde::{Deserialize, Serialize};

/// Per-ability cooldown gate.
///
/// Each tick: while the timer is positive it counts down and the gate stays
/// closed; once it reaches zero the timer is re-armed from the current
/// cooldown value and the gate opens. The owner consumes the open gate with
/// [`Cooldown::take`], so an ability fires at most once per opening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    timer: f32,
    ready: bool,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting a full cooldown from now
    pub fn restart(&mut self, cooldown: f32) {
        self.timer = cooldown.max(0.0);
        self.ready = false;
    }

    /// Close the gate and drop any remaining time
    pub fn clear(&mut self) {
        self.timer = 0.0;
        self.ready = false;
    }

    /// Advance the countdown by `dt` using the current cooldown value
    pub fn check(&mut self, dt: f32, cooldown: f32) {
        if self.timer > 0.0 {
            self.timer -= dt;
            self.ready = false;
        } else {
            // Negative cooldowns (over-upgraded) clamp to every-tick firing
            self.timer = cooldown.max(0.0);
            self.ready = true;
        }
    }

    /// Consume the open gate. Returns true at most once per opening.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.ready, false)
    }

    /// `check` then `take` in one step
    pub fn tick(&mut self, dt: f32, cooldown: f32) -> bool {
        self.check(dt, cooldown);
        self.take()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn remaining(&self) -> f32 {
        self.timer.max(0.0)
    }
}

/// One-shot countdown. `advance` reports true on the tick it expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
        }
    }

    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

/// Evenly spaced steps over a total duration (e.g. a color flash cycle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSequence {
    steps: usize,
    step_duration: f32,
    current: usize,
    elapsed: f32,
}

impl StepSequence {
    pub fn new(steps: usize, total_duration: f32) -> Self {
        let step_duration = if steps == 0 {
            0.0
        } else {
            total_duration / steps as f32
        };
        Self {
            steps,
            step_duration,
            current: 0,
            elapsed: 0.0,
        }
    }

    /// Step index currently showing, or None once finished
    pub fn current(&self) -> Option<usize> {
        (self.current < self.steps).then_some(self.current)
    }

    /// Advance time; returns true once every step has played
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        while self.current < self.steps && self.elapsed >= self.step_duration {
            self.elapsed -= self.step_duration;
            self.current += 1;
        }
        self.current >= self.steps
    }
}
