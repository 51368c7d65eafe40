//! The pet entity and its stat mechanics.
//!
//! Two mutations exist:
//!
//! - [`Pet::apply_item`] raises the item's affected stats by its potency,
//!   clamped to [`STAT_MAX`].
//! - [`Pet::decay_tick`] lowers every stat by the decay amount, floored at
//!   0, and stops at the first stat that reaches 0. That stat kills the pet.
//!
//! Both report each stat they wrote so the caller can emit one
//! notification per write. Neither performs I/O.

use std::collections::BTreeMap;

use petsim_types::{PetId, PetSnapshot, PetStat, PetType};

use crate::config::{PetConfig, STAT_MAX};
use crate::item::Item;

/// One stat write performed by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    /// The stat written.
    pub stat: PetStat,
    /// Its value after the write.
    pub value: u32,
}

/// Result of one decay tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecayTickResult {
    /// Stats written this tick, in processing order.
    pub changes: Vec<StatChange>,
    /// The stat that reached 0 this tick, if any. Set at most once in a
    /// pet's life because a dead pet is never ticked again.
    pub died_of: Option<PetStat>,
}

/// A pet and its current stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    id: PetId,
    name: String,
    pet_type: PetType,
    stats: BTreeMap<PetStat, u32>,
}

impl Pet {
    /// Create a pet with every stat at `config.initial_stat` (clamped to
    /// [`STAT_MAX`]).
    pub fn new(name: impl Into<String>, pet_type: PetType, config: &PetConfig) -> Self {
        let initial = config.initial_stat.min(STAT_MAX);
        Self {
            id: PetId::new(),
            name: name.into(),
            pet_type,
            stats: PetStat::ALL.iter().map(|&stat| (stat, initial)).collect(),
        }
    }

    /// The pet's identity.
    pub const fn id(&self) -> PetId {
        self.id
    }

    /// The pet's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pet's type.
    pub const fn pet_type(&self) -> PetType {
        self.pet_type
    }

    /// Current value of a stat.
    pub fn stat(&self, stat: PetStat) -> u32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    /// Whether any stat has reached 0.
    pub fn is_dead(&self) -> bool {
        self.stats.values().any(|&value| value == 0)
    }

    /// Use an item on this pet.
    ///
    /// Returns `None` and changes nothing if the item is not compatible
    /// with the pet's type. Otherwise every affected stat is raised by the
    /// item's potency, clamped to [`STAT_MAX`], and reported even when the
    /// clamp leaves it unchanged.
    pub fn apply_item(&mut self, item: &Item) -> Option<Vec<StatChange>> {
        if !item.is_compatible_with(self.pet_type) {
            return None;
        }

        let changes = item
            .affected_stats
            .iter()
            .map(|&stat| {
                let value = self.stat(stat).saturating_add(item.potency).min(STAT_MAX);
                self.stats.insert(stat, value);
                StatChange { stat, value }
            })
            .collect();
        Some(changes)
    }

    /// Apply one decay tick.
    ///
    /// Stats are lowered one at a time in [`PetStat`] order. As soon as one
    /// reaches 0 the tick ends: later stats keep their value and produce no
    /// change.
    pub fn decay_tick(&mut self, amount: u32) -> DecayTickResult {
        let mut changes = Vec::with_capacity(PetStat::ALL.len());

        for stat in PetStat::ALL {
            let value = self.stat(stat).saturating_sub(amount);
            self.stats.insert(stat, value);
            changes.push(StatChange { stat, value });

            if value == 0 {
                return DecayTickResult {
                    changes,
                    died_of: Some(stat),
                };
            }
        }

        DecayTickResult {
            changes,
            died_of: None,
        }
    }

    /// Copy the pet's current state.
    pub fn snapshot(&self) -> PetSnapshot {
        PetSnapshot {
            id: self.id,
            name: self.name.clone(),
            pet_type: self.pet_type,
            stats: self.stats.clone(),
        }
    }
}
