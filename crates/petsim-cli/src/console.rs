//! Observer that narrates the simulation on stdout.
//!
//! Deaths and quest completions are always printed. Stat changes are
//! frequent (three per pet every decay tick), so only every 20th change
//! per pet is echoed.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use petsim_core::SimObserver;
use petsim_types::{EventRecord, PetId, SimEvent};

/// Echo one stat change out of this many, per pet.
pub const STAT_ECHO_EVERY: u64 = 20;

/// Per-pet display state.
#[derive(Debug, Default)]
struct Tracked {
    name: String,
    stat_changes: u64,
}

/// Prints engine events for the player.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    pets: Mutex<BTreeMap<PetId, Tracked>>,
}

impl ConsoleObserver {
    /// Create an observer that knows no pets yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a pet's name for stat change messages.
    pub fn track(&self, pet_id: PetId, name: &str) {
        let mut pets = self.pets.lock().unwrap_or_else(PoisonError::into_inner);
        pets.entry(pet_id).or_default().name = name.to_owned();
    }

    /// The line to print for an event, if any.
    pub fn render(&self, event: &SimEvent) -> Option<String> {
        let mut pets = self.pets.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            SimEvent::StatChanged {
                pet_id,
                stat,
                value,
            } => {
                let tracked = pets.entry(*pet_id).or_default();
                tracked.stat_changes = tracked.stat_changes.saturating_add(1);
                if tracked.stat_changes.checked_rem(STAT_ECHO_EVERY) != Some(0) {
                    return None;
                }
                let name = if tracked.name.is_empty() {
                    pet_id.to_string()
                } else {
                    tracked.name.clone()
                };
                Some(format!("{name}'s {stat} is now {value}"))
            }
            SimEvent::PetDied { pet_id, name } => {
                let _ = pets.remove(pet_id);
                Some(format!("\n{name} has died!"))
            }
            SimEvent::QuestCompleted {
                description,
                reward,
                total_points,
                ..
            } => Some(format!(
                "\nQuest completed: {description}\nReward: {reward} points (total: {total_points})"
            )),
        }
    }
}

impl SimObserver for ConsoleObserver {
    fn on_event(&self, record: &EventRecord) {
        if let Some(line) = self.render(&record.event) {
            println!("{line}");
        }
    }
}
