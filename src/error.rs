//! Error types
//!
//! Only configuration and storage can fail. Simulation requests that would
//! break an invariant (upgrading a maxed ability, damaging a dead enemy) are
//! no-ops, not errors.

/// Invalid balance data, detected when a `Tuning` is loaded or validated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no enemy archetypes configured")]
    NoArchetypes,

    #[error("archetype '{id}' has invalid rarity {rarity} (must be finite and >= 0)")]
    InvalidRarity { id: String, rarity: f32 },

    #[error("total archetype rarity is zero; no archetype can ever be selected")]
    ZeroTotalRarity,

    #[error("archetype '{id}' has squad count 0")]
    EmptySquad { id: String },

    #[error("spawns per second must be > 0 (got {0})")]
    InvalidSpawnRate(f32),

    #[error("level threshold must be > 0")]
    ZeroLevelThreshold,

    #[error("threshold growth factor must be > 1 (got {0})")]
    InvalidGrowthFactor(f32),

    #[error("ability '{name}' has no collision tags and can never hit anything")]
    NoCollisionTags { name: String },

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reading or writing a key/value backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage data is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage backend unavailable")]
    Unavailable,
}
