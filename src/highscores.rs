//! Persisted best score
//!
//! A single integer under [`HIGH_SCORE_KEY`], read when a session starts and
//! written when a finished run beats it.

use crate::error::StorageError;
use crate::persistence::KeyValueStore;

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "HighScore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    /// Read the stored best score (0 when nothing is stored)
    pub fn load(store: &impl KeyValueStore) -> Result<Self, StorageError> {
        let best = store
            .get_int(HIGH_SCORE_KEY)?
            .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);
        log::info!("Loaded high score {}", best);
        Ok(Self { best })
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record a finished run. Writes only when `score` beats the best;
    /// returns whether it did.
    pub fn submit(&mut self, score: u32, store: &mut impl KeyValueStore) -> Result<bool, StorageError> {
        if score <= self.best {
            return Ok(false);
        }
        store.set_int(HIGH_SCORE_KEY, i64::from(score))?;
        self.best = score;
        log::info!("New high score {}", score);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_empty_store_starts_at_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store).unwrap().best(), 0);
    }

    #[test]
    fn test_only_better_scores_are_written() {
        let mut store = MemoryStore::new();
        let mut high = HighScore::load(&store).unwrap();

        assert!(high.submit(120, &mut store).unwrap());
        assert_eq!(store.get_int(HIGH_SCORE_KEY).unwrap(), Some(120));

        assert!(!high.submit(80, &mut store).unwrap());
        assert!(!high.submit(120, &mut store).unwrap());
        assert_eq!(store.get_int(HIGH_SCORE_KEY).unwrap(), Some(120));

        let reloaded = HighScore::load(&store).unwrap();
        assert_eq!(reloaded.best(), 120);
    }
}
