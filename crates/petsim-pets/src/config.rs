//! Tunable parameters for pet stats and survival quests.
//!
//! Both structs deserialize from the `pets` and `quests` sections of
//! `petsim-config.yaml`; every field falls back to the defaults below.

use serde::Deserialize;

/// Upper bound of every stat.
pub const STAT_MAX: u32 = 100;

/// Configuration for pet stats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PetConfig {
    /// Value every stat starts at on adoption (default: 50).
    #[serde(default = "default_initial_stat")]
    pub initial_stat: u32,

    /// Amount removed from each stat per decay tick (default: 1).
    #[serde(default = "default_decay_per_tick")]
    pub decay_per_tick: u32,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            initial_stat: default_initial_stat(),
            decay_per_tick: default_decay_per_tick(),
        }
    }
}

/// Configuration for the quest generated on each adoption.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestConfig {
    /// Seconds the quest must run before completing (default: 20).
    #[serde(default = "default_target_seconds")]
    pub target_seconds: u32,

    /// Points credited on completion (default: 20). Zero means one point
    /// per target second.
    #[serde(default = "default_reward")]
    pub reward: u32,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            target_seconds: default_target_seconds(),
            reward: default_reward(),
        }
    }
}

const fn default_initial_stat() -> u32 {
    50
}

const fn default_decay_per_tick() -> u32 {
    1
}

const fn default_target_seconds() -> u32 {
    20
}

const fn default_reward() -> u32 {
    20
}
