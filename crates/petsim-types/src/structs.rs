//! Read-only snapshots handed to the presentation layer.
//!
//! Snapshots are copied out of the registry while its lock is held, so a
//! caller never sees a pet halfway through removal or a quest halfway
//! through completion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{PetStat, PetType};
use crate::ids::{PetId, QuestId};

/// Point-in-time view of one living pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSnapshot {
    /// The pet's identity.
    pub id: PetId,
    /// Name chosen at adoption.
    pub name: String,
    /// Kind of animal.
    pub pet_type: PetType,
    /// Current value of every stat, each in `0..=100`.
    pub stats: BTreeMap<PetStat, u32>,
}

impl PetSnapshot {
    /// Value of a single stat, or 0 if the stat is somehow missing.
    pub fn stat(&self, stat: PetStat) -> u32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }
}

/// Point-in-time view of one active survival quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSnapshot {
    /// The quest's identity.
    pub id: QuestId,
    /// Human-readable objective.
    pub description: String,
    /// Progress rendered as `"elapsed/target seconds"`.
    pub progress: String,
    /// Seconds counted so far.
    pub elapsed_seconds: u32,
    /// Seconds required for completion.
    pub target_seconds: u32,
    /// Points credited on completion.
    pub reward: u32,
}
