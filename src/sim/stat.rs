//! Composable numeric stats
//!
//! A stat is `base * modifier + Σ additional`. The value is computed on every
//! read, so callers never observe a stale result after an upgrade.

use serde::{Deserialize, Serialize};

fn default_modifier() -> f32 {
    1.0
}

/// Anything that resolves to a final numeric value
pub trait Stat {
    fn value(&self) -> f32;
}

/// Floating-point stat (damage, radius, speed, cooldown, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatStat {
    base_value: f32,
    #[serde(default = "default_modifier")]
    modifier: f32,
    #[serde(default)]
    additional_modifiers: Vec<f32>,
}

impl FloatStat {
    pub fn new(base_value: f32) -> Self {
        Self {
            base_value,
            modifier: 1.0,
            additional_modifiers: Vec::new(),
        }
    }

    pub fn value(&self) -> f32 {
        self.base_value * self.modifier + self.additional_modifiers.iter().sum::<f32>()
    }

    pub fn base_value(&self) -> f32 {
        self.base_value
    }

    pub fn modifier(&self) -> f32 {
        self.modifier
    }

    pub fn set_base_value(&mut self, value: f32) {
        self.base_value = value;
    }

    pub fn increment_base_value(&mut self, amount: f32) {
        self.base_value += amount;
    }

    pub fn decrement_base_value(&mut self, amount: f32) {
        self.base_value -= amount;
    }

    pub fn set_modifier(&mut self, modifier: f32) {
        self.modifier = modifier;
    }

    /// Stack a percentage on top of the current multiplier (0.1 = +10%)
    pub fn add_modifier(&mut self, amount: f32) {
        self.modifier += amount;
    }

    pub fn add_additional_modifier(&mut self, amount: f32) {
        self.additional_modifiers.push(amount);
    }

    /// Remove one matching additive modifier. Returns false if none matched.
    pub fn remove_additional_modifier(&mut self, amount: f32) -> bool {
        match self.additional_modifiers.iter().position(|&m| m == amount) {
            Some(i) => {
                self.additional_modifiers.remove(i);
                true
            }
            None => false,
        }
    }
}

impl Stat for FloatStat {
    fn value(&self) -> f32 {
        FloatStat::value(self)
    }
}

/// Integer stat (projectile count, max collisions). Flat changes are whole
/// numbers; the final value is rounded when an integer is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntStat {
    base_value: i32,
    #[serde(default = "default_modifier")]
    modifier: f32,
    #[serde(default)]
    additional_modifiers: Vec<i32>,
}

impl IntStat {
    pub fn new(base_value: i32) -> Self {
        Self {
            base_value,
            modifier: 1.0,
            additional_modifiers: Vec::new(),
        }
    }

    pub fn value(&self) -> f32 {
        self.base_value as f32 * self.modifier
            + self.additional_modifiers.iter().sum::<i32>() as f32
    }

    /// Value rounded to the nearest whole number
    pub fn value_rounded(&self) -> i32 {
        self.value().round() as i32
    }

    /// Rounded value clamped at zero, for counts
    pub fn count(&self) -> usize {
        self.value_rounded().max(0) as usize
    }

    pub fn base_value(&self) -> i32 {
        self.base_value
    }

    pub fn modifier(&self) -> f32 {
        self.modifier
    }

    pub fn set_base_value(&mut self, value: i32) {
        self.base_value = value;
    }

    pub fn increment_base_value(&mut self, amount: i32) {
        self.base_value += amount;
    }

    pub fn decrement_base_value(&mut self, amount: i32) {
        self.base_value -= amount;
    }

    pub fn set_modifier(&mut self, modifier: f32) {
        self.modifier = modifier;
    }

    pub fn add_modifier(&mut self, amount: f32) {
        self.modifier += amount;
    }

    pub fn add_additional_modifier(&mut self, amount: i32) {
        self.additional_modifiers.push(amount);
    }

    pub fn remove_additional_modifier(&mut self, amount: i32) -> bool {
        match self.additional_modifiers.iter().position(|&m| m == amount) {
            Some(i) => {
                self.additional_modifiers.remove(i);
                true
            }
            None => false,
        }
    }
}

impl Stat for IntStat {
    fn value(&self) -> f32 {
        IntStat::value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_stat_formula() {
        let mut stat = FloatStat::new(10.0);
        assert_eq!(stat.value(), 10.0);

        stat.add_modifier(0.5);
        assert!((stat.value() - 15.0).abs() < 1e-5);

        stat.add_additional_modifier(2.0);
        assert!((stat.value() - 17.0).abs() < 1e-5);

        assert!(stat.remove_additional_modifier(2.0));
        assert!(!stat.remove_additional_modifier(2.0));
        assert!((stat.value() - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_value_is_never_stale() {
        let mut stat = FloatStat::new(6.0);
        let before = stat.value();
        stat.increment_base_value(-1.0);
        assert_ne!(before, stat.value());
        assert_eq!(stat.value(), 5.0);
    }

    #[test]
    fn test_negative_base_is_allowed() {
        let mut stat = FloatStat::new(1.0);
        stat.decrement_base_value(3.0);
        assert_eq!(stat.value(), -2.0);
    }

    #[test]
    fn test_int_stat_rounding() {
        let mut stat = IntStat::new(3);
        stat.add_modifier(0.5); // 4.5
        assert!((stat.value() - 4.5).abs() < 1e-5);
        assert_eq!(stat.value_rounded(), 5);

        stat.add_additional_modifier(1);
        assert_eq!(stat.value_rounded(), 6);

        stat.set_base_value(-4);
        stat.set_modifier(1.0);
        assert_eq!(stat.count(), 0);
    }

    #[test]
    fn test_stat_deserialize_defaults() {
        let stat: FloatStat = serde_json::from_str(r#"{"base_value": 2.5}"#).unwrap();
        assert_eq!(stat.modifier(), 1.0);
        assert_eq!(stat.value(), 2.5);
    }
}
